use serde::Serialize;

use crate::core::feature::{Feature, FeatureSequence};

/// Added to a pair's cost when the two features have different direction codes
pub const WRONG_TYPE_PENALTY: f64 = 0.5;

/// Cost of a shorter-sequence slot left unassigned, and of each longer-sequence
/// feature that no slot uses
pub const MISSING_MATCH_PENALTY: f64 = 1.0;

/// Safely convert usize to f64 for penalty arithmetic
#[inline]
pub(crate) fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Cost of pairing two normalized features: anchor distance plus a type penalty
#[must_use]
pub fn pair_cost(a: &Feature, b: &Feature) -> f64 {
    let type_penalty = if a.code == b.code {
        0.0
    } else {
        WRONG_TYPE_PENALTY
    };
    a.anchor.distance(&b.anchor) + type_penalty
}

/// Dense `rows × cols` matrix of pair costs, row-major.
///
/// Rows index the shorter sequence, columns the longer one.
#[derive(Debug, Clone)]
pub struct CostMatrix {
    rows: usize,
    cols: usize,
    costs: Vec<f64>,
}

impl CostMatrix {
    #[must_use]
    pub fn build(rows: &FeatureSequence, cols: &FeatureSequence) -> Self {
        let costs = rows
            .iter()
            .flat_map(|r| cols.iter().map(move |c| pair_cost(r, c)))
            .collect();
        Self {
            rows: rows.len(),
            cols: cols.len(),
            costs,
        }
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.costs[row * self.cols + col]
    }

    #[must_use]
    pub fn row(&self, row: usize) -> &[f64] {
        &self.costs[row * self.cols..(row + 1) * self.cols]
    }

    /// For each row, the `n` lowest-cost column indices.
    ///
    /// The sort is stable, so equal costs keep the lower column first.
    #[must_use]
    pub fn nearest_neighbors(&self, n: usize) -> Vec<Vec<usize>> {
        (0..self.rows)
            .map(|r| {
                let row = self.row(r);
                let mut cols: Vec<usize> = (0..self.cols).collect();
                cols.sort_by(|&a, &b| row[a].total_cmp(&row[b]));
                cols.truncate(n);
                cols
            })
            .collect()
    }
}

/// Similarity of two sketches; lower is better, 0 is an exact match
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchScore {
    /// Total cost of the best assignment
    pub value: f64,

    /// Shorter-sequence slots paired with a longer-sequence feature
    pub assigned: usize,

    /// Shorter-sequence slots left unassigned after conflict resolution
    pub unassigned: usize,

    /// Longer-sequence features no slot uses
    pub unused: usize,

    /// True when the second argument was the shorter sequence and became the rows
    pub swapped: bool,
}

impl MatchScore {
    /// Score when the shorter side has no features at all
    #[must_use]
    pub fn empty(longer_len: usize, swapped: bool) -> Self {
        Self {
            value: count_to_f64(longer_len) * MISSING_MATCH_PENALTY,
            assigned: 0,
            unassigned: 0,
            unused: longer_len,
            swapped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::DirectionCode;

    #[test]
    fn test_pair_cost_same_code() {
        let a = Feature::new(DirectionCode::Right, 0.0, 0.0);
        let b = Feature::new(DirectionCode::Right, 3.0, 4.0);
        assert!((pair_cost(&a, &b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_pair_cost_wrong_type() {
        let a = Feature::new(DirectionCode::Right, 0.0, 0.0);
        let b = Feature::new(DirectionCode::Dot, 0.0, 0.0);
        assert!((pair_cost(&a, &b) - WRONG_TYPE_PENALTY).abs() < 1e-12);
        assert!((pair_cost(&a, &b) - pair_cost(&b, &a)).abs() < 1e-12);
    }

    #[test]
    fn test_cost_matrix_layout() {
        let rows = FeatureSequence::new(vec![Feature::new(DirectionCode::Dot, 0.0, 0.0)]);
        let cols = FeatureSequence::new(vec![
            Feature::new(DirectionCode::Dot, 0.0, 1.0),
            Feature::new(DirectionCode::Right, 0.0, 0.0),
        ]);
        let m = CostMatrix::build(&rows, &cols);
        assert_eq!(m.rows(), 1);
        assert_eq!(m.cols(), 2);
        assert!((m.get(0, 0) - 1.0).abs() < 1e-12);
        assert!((m.get(0, 1) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_nearest_neighbors_stable_ties() {
        let rows = FeatureSequence::new(vec![Feature::new(DirectionCode::Dot, 0.0, 0.0)]);
        let cols = FeatureSequence::new(vec![
            Feature::new(DirectionCode::Dot, 2.0, 0.0),
            Feature::new(DirectionCode::Dot, 1.0, 0.0),
            Feature::new(DirectionCode::Dot, -1.0, 0.0),
        ]);
        let m = CostMatrix::build(&rows, &cols);
        assert_eq!(m.nearest_neighbors(1), vec![vec![1]]);
        assert_eq!(m.nearest_neighbors(2), vec![vec![1, 2]]);
        assert_eq!(m.nearest_neighbors(10), vec![vec![1, 2, 0]]);
    }

    #[test]
    fn test_empty_score() {
        let score = MatchScore::empty(3, false);
        assert!((score.value - 3.0).abs() < 1e-12);
        assert_eq!(score.unused, 3);
        assert!((MatchScore::empty(0, false).value).abs() < 1e-12);
    }
}
