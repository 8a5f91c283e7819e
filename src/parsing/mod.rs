//! Parsers for sketch input and stored reference features.
//!
//! This module provides parsers for:
//!
//! - **Stroke lists**: raw query input from the drawing front-end
//! - **Feature files**: one stored reference sketch per file
//! - **Format detection**: tells the two apart from their content
//!
//! ## Formats
//!
//! | Format   | Example                              |
//! |----------|--------------------------------------|
//! | Strokes  | `[[[0, 0], [10, 0]], [[5, 5], [5, 5]]]` |
//! | Features | `[["r", 0, 0], ["h", 5, 5]]`          |
//!
//! A stroke may carry more than two points (every captured pointer position); only the
//! first and last are kept.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sketch_ranker::parsing::detect::parse_sketch_text;
//!
//! let from_strokes = parse_sketch_text("[[[0, 0], [10, 0]]]").unwrap();
//! let from_features = parse_sketch_text("[[\"r\", 0, 0]]").unwrap();
//! assert_eq!(from_strokes, from_features);
//! ```

use thiserror::Error;

pub mod detect;
pub mod features;
pub mod strokes;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid sketch format: {0}")]
    InvalidFormat(String),

    #[error("Too many strokes: {0} exceeds maximum allowed")]
    TooManyStrokes(usize),

    #[error("Too many features: {0} exceeds maximum allowed")]
    TooManyFeatures(usize),
}
