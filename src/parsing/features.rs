use std::path::Path;

use crate::core::feature::FeatureSequence;
use crate::parsing::ParseError;
use crate::utils::validation::{check_feature_limit, validate_features};

/// Parse a stored feature file: `[[token, x, y], ...]`
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_features_file(path: &Path) -> Result<FeatureSequence, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_features_text(&content)
}

/// Parse stored feature text
///
/// # Errors
///
/// Returns `ParseError::Json` for malformed JSON, unknown direction tokens, or
/// non-numeric coordinates, `ParseError::TooManyFeatures` if the limit is exceeded,
/// or `ParseError::InvalidFormat` if the list is empty or a coordinate is out of range.
pub fn parse_features_text(text: &str) -> Result<FeatureSequence, ParseError> {
    let features: FeatureSequence = serde_json::from_str(text)?;

    if check_feature_limit(features.len()).is_some() {
        return Err(ParseError::TooManyFeatures(features.len()));
    }

    if features.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No features found in file".to_string(),
        ));
    }
    validate_features(features.as_slice()).map_err(|e| ParseError::InvalidFormat(e.to_string()))?;

    Ok(features)
}

/// Render a feature sequence in stored format
///
/// # Errors
///
/// Returns `ParseError::Json` if a feature has no stored token.
pub fn features_to_json(features: &FeatureSequence) -> Result<String, ParseError> {
    Ok(serde_json::to_string(features)?)
}
