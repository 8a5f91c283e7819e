use std::path::Path;

use crate::core::stroke::Stroke;
use crate::parsing::ParseError;
use crate::utils::validation::{check_stroke_limit, validate_strokes};

/// Parse a stroke list file: `[[[x1, y1], [x2, y2]], ...]`
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_strokes_file(path: &Path) -> Result<Vec<Stroke>, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_strokes_text(&content)
}

/// Parse stroke list text.
///
/// An empty list is accepted here; rejecting empty queries is up to the caller.
///
/// # Errors
///
/// Returns `ParseError::Json` for malformed JSON or strokes without points,
/// `ParseError::TooManyStrokes` if the limit is exceeded, or
/// `ParseError::InvalidFormat` for non-finite or out-of-range coordinates.
pub fn parse_strokes_text(text: &str) -> Result<Vec<Stroke>, ParseError> {
    let strokes: Vec<Stroke> = serde_json::from_str(text)?;

    if check_stroke_limit(strokes.len()).is_some() {
        return Err(ParseError::TooManyStrokes(strokes.len()));
    }
    validate_strokes(&strokes).map_err(|e| ParseError::InvalidFormat(e.to_string()))?;

    Ok(strokes)
}
