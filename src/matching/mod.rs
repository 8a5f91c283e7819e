//! Sketch matching engine and cost model.
//!
//! This module provides the core matching functionality:
//!
//! - [`normalize`](normalize::normalize): per-sketch coordinate normalization
//! - [`CostMatrix`](scoring::CostMatrix): pairwise feature costs
//! - [`AssignmentSearch`](assignment::AssignmentSearch): minimum-cost partial assignment
//! - [`Ranker`](engine::Ranker): scores a query against every corpus entry
//!
//! ## Matching Algorithm
//!
//! 1. **Swap**: the shorter sequence becomes the rows of the comparison
//! 2. **Normalize**: each side is shifted to its bounding-box origin and scaled by height
//! 3. **Cost**: anchor distance plus a fixed penalty for mismatched direction codes
//! 4. **Assign**: each row takes its nearest column; collisions unassign the earlier row
//! 5. **Score**: assigned costs plus a fixed penalty per unassigned row and unused column
//!
//! ## Example
//!
//! ```rust,no_run
//! use sketch_ranker::{CorpusIndex, MatchingConfig, Ranker};
//! use sketch_ranker::parsing::strokes::parse_strokes_text;
//! use std::path::Path;
//!
//! let corpus = CorpusIndex::load(Path::new("corpus/")).unwrap();
//! let strokes = parse_strokes_text("[[[0, 0], [10, 0]], [[5, 5], [5, 5]]]").unwrap();
//!
//! let ranker = Ranker::new(&corpus, MatchingConfig::default());
//! for m in ranker.rank_strokes(&strokes, 5).unwrap() {
//!     println!("{}: {:.3}", m.id, m.score.value);
//! }
//! ```

use thiserror::Error;

pub mod assignment;
pub mod engine;
pub mod normalize;
pub mod scoring;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("Cannot normalize an empty feature sequence")]
    EmptySequence,

    #[error("Query contains no strokes")]
    EmptyQuery,

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Assignment search exceeded its budget of {0} steps")]
    SearchBudgetExceeded(usize),
}
