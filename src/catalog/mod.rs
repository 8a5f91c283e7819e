//! Reference sketch corpus storage and indexing.
//!
//! The corpus holds one feature sequence per reference sketch, keyed by identifier and
//! kept in load order. It is built once at start-up and read-only afterwards.
//!
//! ## Sources
//!
//! - **Directory**: one `<id>.json` file per entry, each a list of `[token, x, y]`
//!   triples. Files load in name order.
//! - **Snapshot**: a gzip-compressed binary dump of a loaded corpus, written by
//!   `sketch-ranker corpus compile`.
//!
//! Descriptions come from a separate line-oriented text file (see [`descriptions`]).
//!
//! ## Example
//!
//! ```rust,no_run
//! use sketch_ranker::catalog::descriptions::DescriptionTable;
//! use sketch_ranker::CorpusIndex;
//! use std::path::Path;
//!
//! let mut corpus = CorpusIndex::load(Path::new("corpus/")).unwrap();
//! let table = DescriptionTable::load(Path::new("descriptions.txt")).unwrap();
//! corpus.attach_descriptions(&table);
//!
//! for entry in corpus.all_entries() {
//!     println!("{} ({} strokes)", entry.id, entry.features.len());
//! }
//! ```

pub mod descriptions;
pub mod store;
