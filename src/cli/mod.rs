//! Command-line interface for sketch-ranker.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **rank**: Rank a sketch against the reference corpus
//! - **compare**: Compare two sketches, or a sketch against a corpus entry
//! - **corpus**: List, show, or compile the reference corpus
//! - **serve**: Start the interactive web interface
//!
//! ## Usage
//!
//! ```text
//! # Rank a drawing against a corpus directory
//! sketch-ranker rank query.json --corpus corpus/
//!
//! # Pipe strokes from another tool
//! cat query.json | sketch-ranker rank - --corpus corpus/ -n 10
//!
//! # JSON output for scripting
//! sketch-ranker rank query.json --corpus corpus/ --format json
//!
//! # Compare against a known entry
//! sketch-ranker compare query.json house --entry --corpus corpus/
//!
//! # Start web UI
//! sketch-ranker serve --corpus corpus.bin --port 8080 --open
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::catalog::descriptions::DescriptionTable;
use crate::catalog::store::CorpusIndex;
use crate::matching::assignment::{DEFAULT_MAX_SEARCH_STEPS, N_NEIGHBORS};
use crate::matching::engine::MatchingConfig;

pub mod compare;
pub mod corpus;
pub mod rank;

#[derive(Parser)]
#[command(name = "sketch-ranker")]
#[command(version)]
#[command(about = "Rank hand-drawn sketches against a corpus of reference sketches")]
#[command(
    long_about = "sketch-ranker finds the reference sketches most similar to a drawing.\n\nA drawing is a list of line strokes. Each stroke is reduced to a direction code and an anchor point, and drawings are compared by the cheapest pairing of their strokes:\n- Position and scale are normalized per drawing\n- Mismatched stroke directions and unpaired strokes are penalized\n- Results are ranked lowest cost first"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank a sketch against the reference corpus
    Rank(rank::RankArgs),

    /// Compare two sketches
    Compare(compare::CompareArgs),

    /// Inspect or compile the reference corpus
    Corpus(corpus::CorpusArgs),

    /// Start the web server
    Serve(ServeArgs),
}

/// Where the reference corpus comes from
#[derive(clap::Args, Clone, Debug)]
pub struct CorpusSource {
    /// Corpus directory (one JSON file per entry) or compiled snapshot
    #[arg(long, required = true)]
    pub corpus: PathBuf,

    /// Description file: one "<id> <description>" per line
    #[arg(long)]
    pub descriptions: Option<PathBuf>,
}

impl CorpusSource {
    /// Load the corpus and attach descriptions
    ///
    /// # Errors
    ///
    /// Returns an error if the corpus or the description file cannot be loaded.
    pub fn load(&self) -> anyhow::Result<CorpusIndex> {
        let mut corpus = CorpusIndex::load(&self.corpus)?;

        if let Some(path) = &self.descriptions {
            let table = DescriptionTable::load(path)?;
            let attached = corpus.attach_descriptions(&table);
            info!(
                "Attached {attached} of {} descriptions from {}",
                table.len(),
                path.display()
            );
        }

        Ok(corpus)
    }
}

/// Assignment search tuning
#[derive(clap::Args, Clone, Debug)]
pub struct SearchArgs {
    /// Candidate strokes each query stroke may pair with
    #[arg(long, default_value_t = N_NEIGHBORS)]
    pub neighbors: usize,

    /// Abort a comparison after this many search steps
    #[arg(long, default_value_t = DEFAULT_MAX_SEARCH_STEPS)]
    pub max_search_steps: usize,

    /// Score corpus entries on a single thread
    #[arg(long)]
    pub sequential: bool,
}

impl SearchArgs {
    #[must_use]
    pub fn to_config(&self) -> MatchingConfig {
        MatchingConfig {
            neighbors: self.neighbors.max(1),
            max_search_steps: self.max_search_steps,
            parallel: !self.sequential,
        }
    }
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: String,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,

    /// Largest number of results a request may ask for
    #[arg(long, default_value = "50")]
    pub max_results: usize,

    #[command(flatten)]
    pub source: CorpusSource,

    #[command(flatten)]
    pub search: SearchArgs,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
