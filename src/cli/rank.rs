use std::path::{Path, PathBuf};

use clap::Args;
use tracing::debug;

use crate::cli::{CorpusSource, OutputFormat, SearchArgs};
use crate::core::feature::FeatureSequence;
use crate::matching::engine::{RankedMatch, Ranker};
use crate::parsing;

#[derive(Args)]
pub struct RankArgs {
    /// Query sketch: a stroke list or a feature list (JSON)
    /// Use '-' for stdin
    #[arg(required = true)]
    pub input: PathBuf,

    /// Number of matches to show
    #[arg(short = 'n', long, default_value = "5")]
    pub max_matches: usize,

    #[command(flatten)]
    pub source: CorpusSource,

    #[command(flatten)]
    pub search: SearchArgs,
}

/// Execute rank subcommand
///
/// # Errors
///
/// Returns an error if the query or corpus cannot be loaded, or ranking fails.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: RankArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let query = read_query(&args.input)?;

    if verbose {
        eprintln!("Parsed {} features from query", query.len());
    }

    let corpus = args.source.load()?;

    if verbose {
        eprintln!(
            "Loaded corpus with {} entries from {}",
            corpus.len(),
            args.source.corpus.display()
        );
    }

    if corpus.is_empty() {
        eprintln!("Warning: Corpus is empty, no sketches to rank against.");
        return Ok(());
    }

    let config = args.search.to_config();
    if verbose {
        eprintln!(
            "Search: {} neighbor(s), budget {} steps, {}",
            config.neighbors,
            config.max_search_steps,
            if config.parallel { "parallel" } else { "sequential" }
        );
    }

    let ranker = Ranker::new(&corpus, config);
    let matches = ranker.rank(&query, args.max_matches)?;

    if matches.is_empty() {
        eprintln!("No matches requested.");
        return Ok(());
    }

    match format {
        OutputFormat::Text => print_text_results(&matches, &query, verbose),
        OutputFormat::Json => print_json_results(&matches)?,
        OutputFormat::Tsv => print_tsv_results(&matches),
    }

    Ok(())
}

/// Read a query sketch from a file, or from stdin when the path is `-`
pub(crate) fn read_query(path: &Path) -> anyhow::Result<FeatureSequence> {
    use std::io::{self, Read};

    let text = if path.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(path)?
    };

    let format = parsing::detect::detect_format(&text)?;
    debug!("Query read as {}", format.display_name());

    Ok(format.parse(&text)?)
}

fn print_text_results(matches: &[RankedMatch], query: &FeatureSequence, verbose: bool) {
    for (i, m) in matches.iter().enumerate() {
        if i > 0 {
            println!("\n{}", "─".repeat(60));
        }

        println!("\n#{} {}", i + 1, m.id);
        if let Some(description) = &m.description {
            println!("   Description: {description}");
        }
        println!("   Score: {:.4}", m.score.value);

        if verbose {
            let query_strokes = query.len();
            // A swapped score has the reference as its rows
            let reference_strokes = if m.score.swapped {
                m.score.assigned + m.score.unassigned
            } else {
                m.score.assigned + m.score.unused
            };
            println!(
                "   Strokes: {query_strokes} in query, {reference_strokes} in reference → {} paired, {} unassigned, {} unused",
                m.score.assigned, m.score.unassigned, m.score.unused
            );
        }
    }

    println!();
}

fn print_json_results(matches: &[RankedMatch]) -> anyhow::Result<()> {
    let output: Vec<serde_json::Value> = matches
        .iter()
        .enumerate()
        .map(|(i, m)| {
            serde_json::json!({
                "rank": i + 1,
                "id": m.id.as_str(),
                "description": m.description,
                "score": m.score.value,
                "assigned": m.score.assigned,
                "unassigned": m.score.unassigned,
                "unused": m.score.unused,
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_results(matches: &[RankedMatch]) {
    println!("rank\tid\tscore\tassigned\tunassigned\tunused\tdescription");
    for (i, m) in matches.iter().enumerate() {
        println!(
            "{}\t{}\t{:.4}\t{}\t{}\t{}\t{}",
            i + 1,
            m.id,
            m.score.value,
            m.score.assigned,
            m.score.unassigned,
            m.score.unused,
            m.description.as_deref().unwrap_or("")
        );
    }
}
