use serde::{Deserialize, Serialize};

use crate::core::stroke::{Point, Stroke};
use crate::core::types::DirectionCode;

/// Reference angles in degrees, in tie-breaking order
const REFERENCE_ANGLES: [f64; 5] = [-90.0, -45.0, 0.0, 45.0, 90.0];

/// Code assigned to each entry of `REFERENCE_ANGLES`.
///
/// Not injective: -90/45 and -45/90 share a code. The stored corpus was built with
/// this table, so it is kept as is.
const ANGLE_CODES: [DirectionCode; 5] = [
    DirectionCode::DiagC,
    DirectionCode::DiagB,
    DirectionCode::Right,
    DirectionCode::DiagC,
    DirectionCode::DiagB,
];

/// A typed, positioned abstraction of one stroke.
///
/// Stored as the triple `[token, x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "FeatureTriple", into = "FeatureTriple")]
pub struct Feature {
    pub code: DirectionCode,
    pub anchor: Point,
}

#[derive(Serialize, Deserialize)]
struct FeatureTriple(DirectionCode, f64, f64);

impl From<FeatureTriple> for Feature {
    fn from(FeatureTriple(code, x, y): FeatureTriple) -> Self {
        Self::new(code, x, y)
    }
}

impl From<Feature> for FeatureTriple {
    fn from(f: Feature) -> Self {
        Self(f.code, f.anchor.x, f.anchor.y)
    }
}

impl Feature {
    #[must_use]
    pub const fn new(code: DirectionCode, x: f64, y: f64) -> Self {
        Self {
            code,
            anchor: Point::new(x, y),
        }
    }

    /// Classify a stroke by direction and anchor it at its start point
    #[must_use]
    pub fn from_stroke(stroke: &Stroke) -> Self {
        if stroke.is_degenerate() {
            return Self {
                code: DirectionCode::Dot,
                anchor: stroke.start,
            };
        }

        let dx = stroke.end.x - stroke.start.x;
        let dy = stroke.end.y - stroke.start.y;
        let angle = dy.atan2(dx).to_degrees();

        // Strict `<` keeps the first of equally close reference angles
        let mut best = 0;
        for (i, reference) in REFERENCE_ANGLES.iter().enumerate().skip(1) {
            if (angle - reference).abs() < (angle - REFERENCE_ANGLES[best]).abs() {
                best = i;
            }
        }

        Self {
            code: ANGLE_CODES[best],
            anchor: stroke.start,
        }
    }
}

/// Ordered features of one sketch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSequence {
    features: Vec<Feature>,
}

impl FeatureSequence {
    #[must_use]
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    /// Extract one feature per stroke, preserving stroke order
    #[must_use]
    pub fn from_strokes(strokes: &[Stroke]) -> Self {
        Self {
            features: strokes.iter().map(Feature::from_stroke).collect(),
        }
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Feature] {
        &self.features
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.features.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl From<Vec<Feature>> for FeatureSequence {
    fn from(features: Vec<Feature>) -> Self {
        Self::new(features)
    }
}

impl FromIterator<Feature> for FeatureSequence {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a FeatureSequence {
    type Item = &'a Feature;
    type IntoIter = std::slice::Iter<'a, Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}
