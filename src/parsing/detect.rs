use crate::core::feature::FeatureSequence;
use crate::parsing::features::parse_features_text;
use crate::parsing::strokes::parse_strokes_text;
use crate::parsing::ParseError;

/// Kinds of sketch input the tools accept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SketchFormat {
    /// Raw strokes: `[[[x1, y1], [x2, y2]], ...]`
    Strokes,
    /// Stored features: `[[token, x, y], ...]`
    Features,
}

impl SketchFormat {
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Strokes => "strokes",
            Self::Features => "features",
        }
    }

    /// Parse text already known to be in this format
    ///
    /// # Errors
    ///
    /// Returns the parse error of this format's parser.
    pub fn parse(self, text: &str) -> Result<FeatureSequence, ParseError> {
        match self {
            Self::Features => parse_features_text(text),
            Self::Strokes => Ok(FeatureSequence::from_strokes(&parse_strokes_text(text)?)),
        }
    }
}

/// Tell stroke lists and feature lists apart by the shape of their first element
///
/// # Errors
///
/// Returns `ParseError::Json` for malformed JSON, or `ParseError::InvalidFormat` if the
/// content is empty or matches neither shape.
pub fn detect_format(text: &str) -> Result<SketchFormat, ParseError> {
    let value: serde_json::Value = serde_json::from_str(text)?;

    let items = value
        .as_array()
        .ok_or_else(|| ParseError::InvalidFormat("Expected a JSON array".to_string()))?;
    let first = items
        .first()
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| ParseError::InvalidFormat("Expected a non-empty list of lists".to_string()))?;

    match first.first() {
        Some(serde_json::Value::String(_)) => Ok(SketchFormat::Features),
        Some(serde_json::Value::Array(_)) => Ok(SketchFormat::Strokes),
        _ => Err(ParseError::InvalidFormat(
            "Unable to detect sketch format".to_string(),
        )),
    }
}

/// Parse text in either format into a feature sequence
///
/// # Errors
///
/// Returns the detection or parse error of the detected format.
pub fn parse_sketch_text(text: &str) -> Result<FeatureSequence, ParseError> {
    detect_format(text)?.parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::DirectionCode;

    #[test]
    fn test_detect_strokes() {
        assert_eq!(
            detect_format("[[[0, 0], [1, 1]]]").unwrap(),
            SketchFormat::Strokes
        );
    }

    #[test]
    fn test_detect_features() {
        assert_eq!(
            detect_format(r#"[["r", 0, 0]]"#).unwrap(),
            SketchFormat::Features
        );
    }

    #[test]
    fn test_detect_rejects_other_shapes() {
        assert!(detect_format("{}").is_err());
        assert!(detect_format("[]").is_err());
        assert!(detect_format("[1, 2]").is_err());
        assert!(detect_format("[[1, 2]]").is_err());
    }

    #[test]
    fn test_parse_with_detected_format() {
        let text = r#"[["d", 1, 2], ["h", 0, 0]]"#;
        let format = detect_format(text).unwrap();
        assert_eq!(format, SketchFormat::Features);
        assert_eq!(format.parse(text).unwrap().len(), 2);

        // The other parser refuses the same text
        assert!(SketchFormat::Strokes.parse(text).is_err());
    }

    #[test]
    fn test_both_formats_agree() {
        let from_strokes = parse_sketch_text("[[[0, 0], [10, 0]], [[3, 3], [3, 3]]]").unwrap();
        let from_features = parse_sketch_text(r#"[["r", 0, 0], ["h", 3, 3]]"#).unwrap();
        assert_eq!(from_strokes, from_features);
        assert_eq!(from_strokes.as_slice()[0].code, DirectionCode::Right);
    }
}
