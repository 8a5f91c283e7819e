//! # sketch-ranker
//!
//! A library for ranking hand-drawn line sketches against a corpus of reference sketches.
//!
//! A sketch is an ordered list of strokes. Each stroke is reduced to a direction code and
//! an anchor point, each sketch is normalized into its own frame, and two sketches are
//! compared by the cheapest partial pairing of their strokes. The corpus is ranked by that
//! cost, lowest first.
//!
//! ## Features
//!
//! - **Direction features**: strokes snap to one of a fixed set of reference angles
//! - **Scale normalization**: sketches are compared independent of position and height
//! - **Assignment search**: nearest-neighbor pairing with conflict resolution
//! - **Deterministic ranking**: stable ordering, optionally scored in parallel
//! - **Descriptions**: ranked entries carry descriptions from a lookup file
//!
//! ## Example
//!
//! ```rust,no_run
//! use sketch_ranker::{CorpusIndex, MatchingConfig, Ranker};
//! use sketch_ranker::parsing::strokes::parse_strokes_text;
//! use std::path::Path;
//!
//! // Load the reference corpus once at start-up
//! let corpus = CorpusIndex::load(Path::new("corpus/")).unwrap();
//!
//! // Parse a query drawing
//! let strokes = parse_strokes_text("[[[0, 0], [40, 0]], [[0, 0], [0, 40]]]").unwrap();
//!
//! // Find the five most similar entries
//! let ranker = Ranker::new(&corpus, MatchingConfig::default());
//! for m in ranker.rank_strokes(&strokes, 5).unwrap() {
//!     println!("{}: {:.3}", m.id, m.score.value);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: Corpus storage, snapshots, and descriptions
//! - [`core`]: Core data types for strokes and features
//! - [`matching`]: Normalization, cost model, assignment search, and ranking
//! - [`parsing`]: Parsers for stroke and feature files
//! - [`cli`]: Command-line interface implementation
//! - [`web`]: Web server for browser-based sketch lookup

pub mod catalog;
pub mod cli;
pub mod core;
pub mod matching;
pub mod parsing;
pub mod utils;
pub mod web;

// Re-export commonly used types for convenience
pub use crate::catalog::store::{CorpusEntry, CorpusIndex};
pub use crate::core::feature::{Feature, FeatureSequence};
pub use crate::core::stroke::{Point, Stroke};
pub use crate::core::types::*;
pub use crate::matching::engine::{MatchingConfig, RankedMatch, Ranker};
pub use crate::matching::scoring::MatchScore;
