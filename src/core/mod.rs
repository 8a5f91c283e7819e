//! Core data types for sketch matching.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`Point`](stroke::Point), [`Stroke`](stroke::Stroke): raw vector input from the drawing surface
//! - [`Feature`](feature::Feature), [`FeatureSequence`](feature::FeatureSequence): typed strokes
//! - [`EntryId`](types::EntryId), [`DirectionCode`](types::DirectionCode): identifiers and codes
//!
//! ## Direction Codes
//!
//! Each non-degenerate stroke is snapped to the nearest of five reference angles, which
//! map onto stored tokens as follows:
//!
//! | Angle | Code  | Token |
//! |-------|-------|-------|
//! | -90   | DiagC | d     |
//! | -45   | DiagB | u     |
//! | 0     | Right | r     |
//! | 45    | DiagC | d     |
//! | 90    | DiagB | u     |
//!
//! Degenerate strokes (a single point) become `Dot` (`h`).

pub mod feature;
pub mod stroke;
pub mod types;
