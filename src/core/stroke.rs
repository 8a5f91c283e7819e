use serde::{Deserialize, Serialize};

/// A 2D point in drawing coordinates, stored as `[x, y]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both coordinates finite and no larger than `bound` in magnitude
    #[must_use]
    pub fn is_within(&self, bound: f64) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.x.abs() <= bound && self.y.abs() <= bound
    }

    /// Euclidean distance to another point
    #[must_use]
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// One drawn line, reduced to its start and end points.
///
/// Serialized as `[[x1, y1], [x2, y2]]`. When deserializing, any polyline with at least
/// one point is accepted and only its first and last points are kept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "[Point; 2]")]
pub struct Stroke {
    pub start: Point,
    pub end: Point,
}

impl Stroke {
    #[must_use]
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Build a stroke from every point captured while drawing it
    #[must_use]
    pub fn from_polyline(points: &[Point]) -> Option<Self> {
        let start = *points.first()?;
        let end = *points.last()?;
        Some(Self { start, end })
    }

    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }
}

impl TryFrom<Vec<Point>> for Stroke {
    type Error = &'static str;

    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        Self::from_polyline(&points).ok_or("a stroke needs at least one point")
    }
}

impl From<Stroke> for [Point; 2] {
    fn from(s: Stroke) -> Self {
        [s.start, s.end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stroke_from_pair() {
        let stroke: Stroke = serde_json::from_str("[[1, 2], [3.5, 4]]").unwrap();
        assert_eq!(stroke.start, Point::new(1.0, 2.0));
        assert_eq!(stroke.end, Point::new(3.5, 4.0));
        assert!(!stroke.is_degenerate());
    }

    #[test]
    fn test_stroke_from_polyline_keeps_endpoints() {
        let stroke: Stroke = serde_json::from_str("[[0, 0], [5, 5], [9, 1], [10, 0]]").unwrap();
        assert_eq!(stroke.start, Point::new(0.0, 0.0));
        assert_eq!(stroke.end, Point::new(10.0, 0.0));
    }

    #[test]
    fn test_single_point_stroke_is_degenerate() {
        let stroke: Stroke = serde_json::from_str("[[7, 8]]").unwrap();
        assert!(stroke.is_degenerate());
    }

    #[test]
    fn test_empty_stroke_rejected() {
        assert!(serde_json::from_str::<Stroke>("[]").is_err());
        assert!(Stroke::from_polyline(&[]).is_none());
    }

    #[test]
    fn test_stroke_serializes_as_pair() {
        let stroke = Stroke::new(Point::new(1.0, 2.0), Point::new(3.0, 4.0));
        assert_eq!(
            serde_json::to_string(&stroke).unwrap(),
            "[[1.0,2.0],[3.0,4.0]]"
        );
    }
}
