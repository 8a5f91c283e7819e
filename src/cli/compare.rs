use std::path::PathBuf;

use clap::Args;

use crate::catalog::store::CorpusIndex;
use crate::cli::rank::read_query;
use crate::cli::{OutputFormat, SearchArgs};
use crate::core::feature::FeatureSequence;
use crate::core::types::EntryId;
use crate::matching::assignment::{AssignmentSearch, SearchOutcome};

#[derive(Args)]
pub struct CompareArgs {
    /// Query sketch: a stroke list or a feature list (JSON), or '-' for stdin
    #[arg(required = true)]
    pub query: PathBuf,

    /// Second sketch file, or entry ID from the corpus
    #[arg(required = true)]
    pub target: String,

    /// Treat the second argument as an entry ID from the corpus
    #[arg(long)]
    pub entry: bool,

    /// Corpus directory or snapshot (only used with --entry)
    #[arg(long)]
    pub corpus: Option<PathBuf>,

    #[command(flatten)]
    pub search: SearchArgs,
}

/// Execute compare subcommand
///
/// # Errors
///
/// Returns an error if either sketch cannot be loaded or the search runs out of budget.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: CompareArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let query = read_query(&args.query)?;

    if verbose {
        eprintln!("Query: {} features", query.len());
    }

    let target = if args.entry {
        let corpus_path = args
            .corpus
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("--corpus is required when using --entry"))?;
        let corpus = CorpusIndex::load(corpus_path)?;

        let id = EntryId::new(&args.target);
        corpus
            .get(&id)
            .map(|entry| entry.features.clone())
            .ok_or_else(|| anyhow::anyhow!("Entry '{}' not found in corpus", args.target))?
    } else {
        read_query(&PathBuf::from(&args.target))?
    };

    if verbose {
        eprintln!("Target: {} features", target.len());
    }

    let config = args.search.to_config();
    let search = AssignmentSearch::new(config.neighbors, config.max_search_steps);
    let outcome = search.compare(&query, &target)?;
    let pairs = query_target_pairs(&outcome);

    match format {
        OutputFormat::Text => print_text_comparison(&args, &query, &target, &outcome, &pairs),
        OutputFormat::Json => print_json_comparison(&args, &query, &target, &outcome, &pairs)?,
        OutputFormat::Tsv => print_tsv_comparison(&outcome),
    }

    Ok(())
}

/// Paired feature indices as `(query, target)`, in row order
fn query_target_pairs(outcome: &SearchOutcome) -> Vec<(usize, usize)> {
    outcome
        .assignment
        .slots
        .iter()
        .enumerate()
        .filter_map(|(row, slot)| slot.map(|col| (row, col)))
        .map(|(row, col)| {
            if outcome.score.swapped {
                (col, row)
            } else {
                (row, col)
            }
        })
        .collect()
}

fn print_text_comparison(
    args: &CompareArgs,
    query: &FeatureSequence,
    target: &FeatureSequence,
    outcome: &SearchOutcome,
    pairs: &[(usize, usize)],
) {
    let score = &outcome.score;

    println!("Comparison Results");
    println!("{}", "=".repeat(60));

    println!("\nQuery: {}", args.query.display());
    println!("  Features: {}", query.len());

    println!("\nTarget: {}", args.target);
    println!("  Features: {}", target.len());

    println!("\nScore: {:.4}", score.value);
    println!("  Paired: {}", score.assigned);
    println!("  Unassigned (shorter side): {}", score.unassigned);
    println!("  Unused (longer side): {}", score.unused);

    if !pairs.is_empty() {
        println!("\nPairing (query -> target, raw coordinates):");
        for &(q, t) in pairs {
            let a = &query.as_slice()[q];
            let b = &target.as_slice()[t];
            println!(
                "  {q:>3} {} ({:.1}, {:.1})  ->  {t:>3} {} ({:.1}, {:.1})",
                a.code, a.anchor.x, a.anchor.y, b.code, b.anchor.x, b.anchor.y
            );
        }
    }
}

fn print_json_comparison(
    args: &CompareArgs,
    query: &FeatureSequence,
    target: &FeatureSequence,
    outcome: &SearchOutcome,
    pairs: &[(usize, usize)],
) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "query": {
            "path": args.query.display().to_string(),
            "feature_count": query.len(),
        },
        "target": {
            "name": args.target,
            "feature_count": target.len(),
        },
        "score": outcome.score,
        "pairs": pairs
            .iter()
            .map(|&(q, t)| serde_json::json!({ "query": q, "target": t }))
            .collect::<Vec<_>>(),
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_comparison(outcome: &SearchOutcome) {
    let score = &outcome.score;
    println!("score\tassigned\tunassigned\tunused");
    println!(
        "{:.4}\t{}\t{}\t{}",
        score.value, score.assigned, score.unassigned, score.unused
    );
}
