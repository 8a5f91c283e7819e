use crate::core::feature::{Feature, FeatureSequence};
use crate::matching::MatchError;

/// Remap anchors into a translation- and height-invariant frame.
///
/// Anchors are shifted so the bounding box starts at the origin and scaled by
/// `1 / (height + 1)`. Width does not enter the scale, so horizontal proportions stay
/// tied to the vertical extent.
///
/// # Errors
///
/// Returns `MatchError::EmptySequence` if `features` is empty.
pub fn normalize(features: &FeatureSequence) -> Result<FeatureSequence, MatchError> {
    let first = features.iter().next().ok_or(MatchError::EmptySequence)?;

    let mut x_min = first.anchor.x;
    let mut y_min = first.anchor.y;
    let mut y_max = first.anchor.y;
    for f in features {
        x_min = x_min.min(f.anchor.x);
        y_min = y_min.min(f.anchor.y);
        y_max = y_max.max(f.anchor.y);
    }

    let z = 1.0 / (y_max - y_min + 1.0);

    Ok(features
        .iter()
        .map(|f| Feature::new(f.code, (f.anchor.x - x_min) * z, (f.anchor.y - y_min) * z))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::DirectionCode;

    #[test]
    fn test_single_feature_collapses_to_origin() {
        for (x, y) in [(0.0, 0.0), (123.0, -45.5), (-7.0, 9999.0)] {
            let seq = FeatureSequence::new(vec![Feature::new(DirectionCode::DiagB, x, y)]);
            let norm = normalize(&seq).unwrap();
            assert_eq!(norm.len(), 1);
            assert_eq!(norm.as_slice()[0].code, DirectionCode::DiagB);
            assert!(norm.as_slice()[0].anchor.x.abs() < 1e-12);
            assert!(norm.as_slice()[0].anchor.y.abs() < 1e-12);
        }
    }

    #[test]
    fn test_scale_uses_height_plus_one() {
        let seq = FeatureSequence::new(vec![
            Feature::new(DirectionCode::Dot, 10.0, 10.0),
            Feature::new(DirectionCode::Right, 30.0, 13.0),
        ]);
        let norm = normalize(&seq).unwrap();
        // height 3 -> z = 1/4
        let second = norm.as_slice()[1];
        assert!((second.anchor.x - 5.0).abs() < 1e-12);
        assert!((second.anchor.y - 0.75).abs() < 1e-12);
        assert_eq!(second.code, DirectionCode::Right);
    }

    #[test]
    fn test_translation_invariant() {
        let a = FeatureSequence::new(vec![
            Feature::new(DirectionCode::Dot, 0.0, 0.0),
            Feature::new(DirectionCode::Right, 4.0, 2.0),
        ]);
        let b = FeatureSequence::new(vec![
            Feature::new(DirectionCode::Dot, 100.0, -50.0),
            Feature::new(DirectionCode::Right, 104.0, -48.0),
        ]);
        assert_eq!(normalize(&a).unwrap(), normalize(&b).unwrap());
    }

    #[test]
    fn test_empty_sequence_is_error() {
        let result = normalize(&FeatureSequence::default());
        assert_eq!(result, Err(MatchError::EmptySequence));
    }
}
