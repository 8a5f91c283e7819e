//! Centralized validation and helper functions.

use crate::core::feature::Feature;
use crate::core::stroke::Stroke;
use crate::core::types::EntryId;

/// Maximum number of strokes accepted in a single query (DOS protection)
pub const MAX_STROKES: usize = 10_000;

/// Maximum number of features in a single stored entry
pub const MAX_FEATURES: usize = 10_000;

/// Security-related constants for input validation
pub const MAX_IDENTIFIER_LENGTH: usize = 255;

/// Largest coordinate magnitude accepted in strokes and stored features.
///
/// Keeps the bounding-box height finite during normalization.
pub const MAX_COORDINATE: f64 = 1e9;

/// Check whether a query with `count` strokes exceeds the maximum allowed.
///
/// Returns an error message if it does, None if the count is acceptable.
#[must_use]
pub fn check_stroke_limit(count: usize) -> Option<String> {
    if count > MAX_STROKES {
        Some(format!(
            "Too many strokes: {count} exceeds maximum of {MAX_STROKES}"
        ))
    } else {
        None
    }
}

/// Check whether a stored entry with `count` features exceeds the maximum allowed.
#[must_use]
pub fn check_feature_limit(count: usize) -> Option<String> {
    if count > MAX_FEATURES {
        Some(format!(
            "Too many features: {count} exceeds maximum of {MAX_FEATURES}"
        ))
    } else {
        None
    }
}

/// Input validation error types
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Identifier too long: exceeds {MAX_IDENTIFIER_LENGTH} characters")]
    IdentifierTooLong,
    #[error("Invalid identifier: contains path separators or control characters")]
    InvalidIdentifier,
    #[error("Empty identifier provided")]
    EmptyIdentifier,
    #[error("Stroke {0} has a coordinate that is not finite or exceeds {MAX_COORDINATE:e}")]
    StrokeCoordinateOutOfRange(usize),
    #[error("Feature {0} has a coordinate that is not finite or exceeds {MAX_COORDINATE:e}")]
    FeatureCoordinateOutOfRange(usize),
}

/// Validate a corpus entry identifier.
///
/// Identifiers come from file names and are echoed back to clients, so they must not
/// contain path components or control characters.
///
/// # Errors
///
/// Returns `ValidationError::EmptyIdentifier` if the identifier is blank,
/// `ValidationError::IdentifierTooLong` if it exceeds the limit, or
/// `ValidationError::InvalidIdentifier` if it contains forbidden characters.
pub fn validate_entry_id(id: &str) -> Result<EntryId, ValidationError> {
    if id.trim().is_empty() {
        return Err(ValidationError::EmptyIdentifier);
    }

    if id.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ValidationError::IdentifierTooLong);
    }

    if id.contains("..") || id.contains('/') || id.contains('\\') {
        return Err(ValidationError::InvalidIdentifier);
    }

    if id.chars().any(char::is_control) {
        return Err(ValidationError::InvalidIdentifier);
    }

    Ok(EntryId::new(id))
}

/// Reject strokes with NaN, infinite, or out-of-range coordinates
///
/// # Errors
///
/// Returns `ValidationError::StrokeCoordinateOutOfRange` with the index of the first
/// bad stroke.
pub fn validate_strokes(strokes: &[Stroke]) -> Result<(), ValidationError> {
    match strokes
        .iter()
        .position(|s| !s.start.is_within(MAX_COORDINATE) || !s.end.is_within(MAX_COORDINATE))
    {
        Some(index) => Err(ValidationError::StrokeCoordinateOutOfRange(index)),
        None => Ok(()),
    }
}

/// Reject features whose anchors are NaN, infinite, or out of range
///
/// # Errors
///
/// Returns `ValidationError::FeatureCoordinateOutOfRange` with the index of the first
/// bad feature.
pub fn validate_features(features: &[Feature]) -> Result<(), ValidationError> {
    match features
        .iter()
        .position(|f| !f.anchor.is_within(MAX_COORDINATE))
    {
        Some(index) => Err(ValidationError::FeatureCoordinateOutOfRange(index)),
        None => Ok(()),
    }
}

/// Clamp a requested result count into `0..=max`
#[must_use]
pub fn clamp_result_limit(requested: usize, max: usize) -> usize {
    requested.min(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::stroke::Point;

    #[test]
    fn test_stroke_limit() {
        assert!(check_stroke_limit(0).is_none());
        assert!(check_stroke_limit(MAX_STROKES).is_none());
        assert!(check_stroke_limit(MAX_STROKES + 1).is_some());
    }

    #[test]
    fn test_feature_limit() {
        assert!(check_feature_limit(MAX_FEATURES).is_none());
        assert!(check_feature_limit(MAX_FEATURES + 1).is_some());
    }

    #[test]
    fn test_validate_entry_id() {
        assert_eq!(validate_entry_id("cat").unwrap(), EntryId::new("cat"));
        assert_eq!(
            validate_entry_id("animals_dog.v2").unwrap(),
            EntryId::new("animals_dog.v2")
        );
        assert_eq!(validate_entry_id(""), Err(ValidationError::EmptyIdentifier));
        assert_eq!(validate_entry_id("   "), Err(ValidationError::EmptyIdentifier));
        assert_eq!(
            validate_entry_id("../etc"),
            Err(ValidationError::InvalidIdentifier)
        );
        assert_eq!(
            validate_entry_id("a\0b"),
            Err(ValidationError::InvalidIdentifier)
        );
        assert_eq!(
            validate_entry_id(&"x".repeat(MAX_IDENTIFIER_LENGTH + 1)),
            Err(ValidationError::IdentifierTooLong)
        );
    }

    #[test]
    fn test_validate_strokes() {
        let good = Stroke::new(Point::new(0.0, 0.0), Point::new(1.0, 1.0));
        let bad = Stroke::new(Point::new(f64::NAN, 0.0), Point::new(1.0, 1.0));
        assert!(validate_strokes(&[good]).is_ok());
        assert_eq!(
            validate_strokes(&[good, bad]),
            Err(ValidationError::StrokeCoordinateOutOfRange(1))
        );

        let huge = Stroke::new(Point::new(0.0, 1e308), Point::new(1.0, 1e308));
        assert_eq!(
            validate_strokes(&[huge]),
            Err(ValidationError::StrokeCoordinateOutOfRange(0))
        );

        let edge = Stroke::new(
            Point::new(-MAX_COORDINATE, MAX_COORDINATE),
            Point::new(0.0, 0.0),
        );
        assert!(validate_strokes(&[edge]).is_ok());
    }

    #[test]
    fn test_validate_features() {
        use crate::core::types::DirectionCode;

        let good = Feature::new(DirectionCode::Right, 5.0, -5.0);
        let huge = Feature::new(DirectionCode::Right, 0.0, -1e308);
        let inf = Feature::new(DirectionCode::Dot, f64::INFINITY, 0.0);
        assert!(validate_features(&[good]).is_ok());
        assert_eq!(
            validate_features(&[good, huge]),
            Err(ValidationError::FeatureCoordinateOutOfRange(1))
        );
        assert_eq!(
            validate_features(&[inf]),
            Err(ValidationError::FeatureCoordinateOutOfRange(0))
        );
    }

    #[test]
    fn test_clamp_result_limit() {
        assert_eq!(clamp_result_limit(5, 50), 5);
        assert_eq!(clamp_result_limit(500, 50), 50);
        assert_eq!(clamp_result_limit(0, 50), 0);
    }
}
