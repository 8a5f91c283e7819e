//! Web server for browser-based sketch lookup.
//!
//! This module provides an interactive web interface using Axum.
//! Users draw on a canvas and the page posts the strokes for ranking.
//!
//! ## Starting the Server
//!
//! ```text
//! # Start on default port 8080
//! sketch-ranker serve --corpus corpus/
//!
//! # Compiled snapshot, descriptions, custom port and auto-open browser
//! sketch-ranker serve --corpus corpus.bin --descriptions names.txt --port 3000 --open
//!
//! # Bind to all interfaces
//! sketch-ranker serve --corpus corpus/ --address 0.0.0.0
//! ```
//!
//! ## API Endpoints
//!
//! - `GET /` - Drawing page
//! - `POST /api/rank` - Rank a drawing: `{"strokes": [[[x1, y1], [x2, y2]], ...], "k": 5}`
//! - `GET /api/corpus` - List all entries in the corpus

pub mod server;
