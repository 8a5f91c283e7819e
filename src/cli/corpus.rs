use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};

use crate::catalog::store::ENTRY_EXTENSION;
use crate::cli::{CorpusSource, OutputFormat};
use crate::core::feature::FeatureSequence;
use crate::parsing::features::features_to_json;
use crate::parsing::strokes::parse_strokes_file;
use crate::utils::validation::validate_entry_id;

/// Features shown by `corpus show` before truncating
const SHOW_FEATURE_LIMIT: usize = 25;

#[derive(Args)]
pub struct CorpusArgs {
    #[command(subcommand)]
    pub command: CorpusCommands,
}

#[derive(Subcommand)]
pub enum CorpusCommands {
    /// List all entries in the corpus
    List {
        #[command(flatten)]
        source: CorpusSource,
    },

    /// Show the features of one entry
    Show {
        /// Entry ID
        #[arg(required = true)]
        id: String,

        #[command(flatten)]
        source: CorpusSource,

        /// Show all features
        #[arg(long)]
        all_features: bool,
    },

    /// Compile a corpus directory into a binary snapshot
    Compile {
        #[command(flatten)]
        source: CorpusSource,

        /// Output snapshot path
        #[arg(required = true)]
        output: PathBuf,

        /// Overwrite an existing snapshot
        #[arg(long)]
        force: bool,
    },

    /// Extract features from a stroke file and store them as a new entry
    Add {
        /// Stroke file (JSON list of strokes)
        #[arg(required = true)]
        strokes: PathBuf,

        /// Identifier of the new entry
        #[arg(required = true)]
        id: String,

        /// Corpus directory to write into
        #[arg(long, required = true)]
        dir: PathBuf,

        /// Overwrite an existing entry
        #[arg(long)]
        force: bool,
    },
}

/// Execute corpus subcommand
///
/// # Errors
///
/// Returns an error if the corpus cannot be loaded or written.
pub fn run(args: CorpusArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    match args.command {
        CorpusCommands::List { source } => run_list(&source, format, verbose),
        CorpusCommands::Show {
            id,
            source,
            all_features,
        } => run_show(&id, &source, all_features, format),
        CorpusCommands::Compile {
            source,
            output,
            force,
        } => run_compile(&source, &output, force, verbose),
        CorpusCommands::Add {
            strokes,
            id,
            dir,
            force,
        } => run_add(&strokes, &id, &dir, force, verbose),
    }
}

fn run_list(source: &CorpusSource, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let corpus = source.load()?;

    if verbose {
        eprintln!("Loaded corpus with {} entries", corpus.len());
    }

    match format {
        OutputFormat::Text => {
            println!("{:<30} {:>8}  Description", "ID", "Strokes");
            println!("{}", "-".repeat(80));
            for entry in corpus.all_entries() {
                println!(
                    "{:<30} {:>8}  {}",
                    entry.id,
                    entry.features.len(),
                    entry.description.as_deref().unwrap_or("-")
                );
            }
            println!("\nTotal: {} entries", corpus.len());
        }
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = corpus
                .all_entries()
                .map(|entry| {
                    serde_json::json!({
                        "id": entry.id.as_str(),
                        "description": entry.description,
                        "feature_count": entry.features.len(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("id\tfeature_count\tdescription");
            for entry in corpus.all_entries() {
                println!(
                    "{}\t{}\t{}",
                    entry.id,
                    entry.features.len(),
                    entry.description.as_deref().unwrap_or("")
                );
            }
        }
    }

    Ok(())
}

fn run_show(
    id: &str,
    source: &CorpusSource,
    all_features: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let corpus = source.load()?;

    let entry_id = crate::core::types::EntryId::new(id);
    let entry = corpus
        .get(&entry_id)
        .ok_or_else(|| anyhow::anyhow!("Entry '{}' not found", id))?;

    match format {
        OutputFormat::Text => {
            println!("Entry: {}\n", entry.id);
            if let Some(desc) = &entry.description {
                println!("Description: {desc}");
            }
            println!("Strokes: {}", entry.features.len());

            let shown = if all_features {
                entry.features.as_slice()
            } else {
                &entry.features.as_slice()[..entry.features.len().min(SHOW_FEATURE_LIMIT)]
            };

            println!("\n{:>5} {:<5} {:>10} {:>10}", "#", "Code", "X", "Y");
            println!("{}", "-".repeat(34));
            for (i, feature) in shown.iter().enumerate() {
                println!(
                    "{i:>5} {:<5} {:>10.2} {:>10.2}",
                    feature.code.to_string(),
                    feature.anchor.x,
                    feature.anchor.y
                );
            }

            if !all_features && entry.features.len() > SHOW_FEATURE_LIMIT {
                println!(
                    "\n... and {} more features (use --all-features to show all)",
                    entry.features.len() - SHOW_FEATURE_LIMIT
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(entry)?);
        }
        OutputFormat::Tsv => {
            println!("code\tx\ty");
            for feature in &entry.features {
                println!("{}\t{}\t{}", feature.code, feature.anchor.x, feature.anchor.y);
            }
        }
    }

    Ok(())
}

fn run_compile(
    source: &CorpusSource,
    output: &Path,
    force: bool,
    verbose: bool,
) -> anyhow::Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "Output file {} already exists. Use --force to overwrite.",
            output.display()
        );
    }

    let corpus = source.load()?;
    if corpus.is_empty() {
        anyhow::bail!("Corpus at {} has no entries", source.corpus.display());
    }

    corpus.write_snapshot(output)?;

    if verbose {
        let described = corpus
            .all_entries()
            .filter(|e| e.description.is_some())
            .count();
        eprintln!("{described} of {} entries have descriptions", corpus.len());
    }

    println!(
        "Compiled {} entries to {}",
        corpus.len(),
        output.display()
    );

    Ok(())
}

fn run_add(
    strokes_path: &Path,
    id: &str,
    dir: &Path,
    force: bool,
    verbose: bool,
) -> anyhow::Result<()> {
    let entry_id = validate_entry_id(id)?;

    let strokes = parse_strokes_file(strokes_path)?;
    let features = FeatureSequence::from_strokes(&strokes);
    if features.is_empty() {
        anyhow::bail!("{} contains no strokes", strokes_path.display());
    }

    if verbose {
        eprintln!("Extracted {} features from {}", features.len(), strokes_path.display());
    }

    let output = dir.join(format!("{entry_id}.{ENTRY_EXTENSION}"));
    if output.exists() && !force {
        anyhow::bail!(
            "Entry {} already exists. Use --force to overwrite.",
            output.display()
        );
    }

    std::fs::create_dir_all(dir)?;
    std::fs::write(&output, features_to_json(&features)?)?;

    println!(
        "Added {} ({} strokes) to {}",
        entry_id,
        features.len(),
        output.display()
    );

    Ok(())
}
