//! Recipe evaluation pipeline CLI
//!
//! # Usage
//!
//! ```bash
//! # Validate ground truth and check referenced images
//! recipe-eval prepare
//!
//! # Resolve prediction ingredients against the canonical registry
//! recipe-eval canonicalize
//!
//! # Resolve against per-entry (local) and dataset-wide (global) ontologies
//! recipe-eval normalize
//!
//! # Score predictions
//! recipe-eval evaluate --predictions outputs/predictions-canonicalized.json
//!
//! # Debug a single identifier
//! recipe-eval resolve "Red Peppers" --slugs bell-pepper,tomato
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use recipe_eval::canonicalization::{
    Canonicalizer, DecisionSummary, LayeredOntologies, OntologyIndex, OntologyTiers,
};
use recipe_eval::config::CanonicalizerConfig;
use recipe_eval::evaluation::aggregate_metrics;
use recipe_eval::io;

#[derive(Parser)]
#[command(name = "recipe-eval")]
#[command(version)]
#[command(about = "Ingredient canonicalization and scoring for machine-extracted recipes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Canonicalizer config (YAML); defaults to the command's preset
    #[arg(long, short, global = true, env = "RECIPE_EVAL_CONFIG")]
    config: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate ground truth and write the prepared dataset
    Prepare {
        #[arg(long, default_value = io::GROUND_TRUTH_PATH)]
        ground_truth: PathBuf,

        #[arg(long, default_value = io::IMAGES_DIR)]
        images_dir: PathBuf,

        #[arg(long, short, default_value = io::PREPARED_PATH)]
        output: PathBuf,
    },

    /// Resolve prediction ingredients against the canonical ingredient registry
    Canonicalize {
        #[arg(long, default_value = io::PREDICTIONS_PATH)]
        predictions: PathBuf,

        #[arg(long, default_value = io::CANONICAL_INGREDIENTS_PATH)]
        ingredients: PathBuf,

        #[arg(long, short, default_value = io::CANONICALIZED_PREDICTIONS_PATH)]
        output: PathBuf,

        #[arg(long, default_value = io::CANONICALIZATION_DECISIONS_PATH)]
        decisions: PathBuf,
    },

    /// Resolve prediction ingredients against ontologies built from ground truth
    Normalize {
        #[arg(long, default_value = io::PREDICTIONS_PATH)]
        predictions: PathBuf,

        #[arg(long, default_value = io::PREPARED_PATH)]
        prepared: PathBuf,

        #[arg(long, short, default_value = io::NORMALIZED_PREDICTIONS_PATH)]
        output: PathBuf,

        #[arg(long, default_value = io::NORMALIZATION_DECISIONS_PATH)]
        decisions: PathBuf,
    },

    /// Score predictions against the prepared ground truth
    Evaluate {
        #[arg(long, default_value = io::CANONICALIZED_PREDICTIONS_PATH)]
        predictions: PathBuf,

        #[arg(long, default_value = io::PREPARED_PATH)]
        prepared: PathBuf,

        #[arg(long, default_value = io::METRICS_PATH)]
        metrics: PathBuf,

        #[arg(long, default_value = io::PER_IMAGE_SCORES_PATH)]
        per_entry: PathBuf,
    },

    /// Resolve one identifier and print the decision as JSON
    Resolve {
        /// Raw ingredient identifier
        identifier: String,

        /// Comma-separated ontology slugs (instead of the registry file)
        #[arg(long, value_delimiter = ',')]
        slugs: Option<Vec<String>>,

        /// Comma-separated local slugs; resolves layered when given
        #[arg(long, value_delimiter = ',')]
        local: Option<Vec<String>>,

        #[arg(long, default_value = io::CANONICAL_INGREDIENTS_PATH)]
        ingredients: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>, fallback: CanonicalizerConfig) -> Result<CanonicalizerConfig> {
    match path {
        Some(path) => CanonicalizerConfig::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(fallback),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Prepare {
            ground_truth,
            images_dir,
            output,
        } => prepare(&ground_truth, &images_dir, &output),

        Commands::Canonicalize {
            predictions,
            ingredients,
            output,
            decisions,
        } => {
            let config = load_config(cli.config.as_deref(), CanonicalizerConfig::single_tier())?;
            canonicalize(config, &predictions, &ingredients, &output, &decisions)
        }

        Commands::Normalize {
            predictions,
            prepared,
            output,
            decisions,
        } => {
            let config = load_config(cli.config.as_deref(), CanonicalizerConfig::layered())?;
            normalize(config, &predictions, &prepared, &output, &decisions)
        }

        Commands::Evaluate {
            predictions,
            prepared,
            metrics,
            per_entry,
        } => evaluate(&predictions, &prepared, &metrics, &per_entry),

        Commands::Resolve {
            identifier,
            slugs,
            local,
            ingredients,
        } => {
            let fallback = if local.is_some() {
                CanonicalizerConfig::layered()
            } else {
                CanonicalizerConfig::single_tier()
            };
            let config = load_config(cli.config.as_deref(), fallback)?;
            resolve(config, &identifier, slugs, local, &ingredients)
        }
    }
}

fn prepare(ground_truth: &Path, images_dir: &Path, output: &Path) -> Result<()> {
    let dataset = io::load_ground_truth(ground_truth)?;
    tracing::info!(entries = dataset.entries.len(), "Validated ground truth");

    let available = io::list_image_files(images_dir)?;
    let missing = io::missing_images(&dataset, &available);
    if missing.is_empty() {
        tracing::info!(dir = %images_dir.display(), "All referenced images found");
    } else {
        tracing::warn!(count = missing.len(), "Referenced images not found locally");
        for image in &missing {
            tracing::warn!(image = %image, "Missing image");
        }
    }

    io::write_json(output, &dataset)?;
    println!("Prepared data written to {}", output.display());
    Ok(())
}

fn print_summary(summary: &DecisionSummary) {
    println!(
        "  Decisions: {} (exact {}, fuzzy {}, unresolved {})",
        summary.total, summary.exact, summary.fuzzy, summary.unresolved
    );
}

fn canonicalize(
    config: CanonicalizerConfig,
    predictions: &Path,
    ingredients: &Path,
    output: &Path,
    decisions: &Path,
) -> Result<()> {
    let predictions = io::load_predictions(predictions)?;
    let registry = io::load_canonical_ingredients(ingredients)?;

    let index = OntologyIndex::from_slugs(registry.slugs());
    tracing::info!(ingredients = index.len(), "Loaded canonical ingredient registry");
    tracing::debug!("{}", index.stats());

    let canonicalizer = Canonicalizer::new(config);
    let (rewritten, log) =
        canonicalizer.canonicalize_dataset(&predictions, |_| OntologyTiers::single(&index));

    io::write_json(output, &rewritten)?;
    io::write_json(decisions, &log)?;

    println!("Canonicalized {} entries -> {}", rewritten.entries.len(), output.display());
    print_summary(&DecisionSummary::from_decisions(log.decisions()));
    println!("Decisions written to {}", decisions.display());
    Ok(())
}

fn normalize(
    config: CanonicalizerConfig,
    predictions: &Path,
    prepared: &Path,
    output: &Path,
    decisions: &Path,
) -> Result<()> {
    let predictions = io::load_predictions(predictions)?;
    let prepared = io::load_ground_truth(prepared)?;

    let ontologies = LayeredOntologies::from_ground_truth(&prepared);
    let canonicalizer = Canonicalizer::new(config);
    let (rewritten, log) = canonicalizer
        .canonicalize_dataset(&predictions, |entry| ontologies.tiers_for(&entry.images));

    io::write_json(output, &rewritten)?;
    io::write_json(decisions, &log)?;

    println!("Normalized {} entries -> {}", rewritten.entries.len(), output.display());
    print_summary(&DecisionSummary::from_decisions(log.decisions()));
    println!("Decisions written to {}", decisions.display());
    Ok(())
}

fn evaluate(predictions: &Path, prepared: &Path, metrics_path: &Path, per_entry_path: &Path) -> Result<()> {
    let prepared = io::load_ground_truth(prepared)?;
    let predictions = io::load_predictions(predictions)?;
    tracing::info!(
        entries = prepared.entries.len(),
        predictions = predictions.entries.len(),
        "Evaluating"
    );

    let evaluation = aggregate_metrics(&predictions.entries, &prepared.entries)?;
    io::write_json(metrics_path, &evaluation.metrics)?;
    io::write_json(per_entry_path, &evaluation.per_entry)?;

    let metrics = &evaluation.metrics;
    let scalar = &metrics.by_category.scalar_fields;
    println!("\nResults ({} entries):", metrics.entry_count);
    println!("  Missing Predictions:     {}", evaluation.missing_count());
    println!("  Overall Score:           {:.3}", metrics.overall.score);
    println!(
        "  Ingredient Parsing F1:   {:.3}",
        metrics.by_category.ingredient_parsing.slugs.f1
    );
    println!("  Instructions F1:         {:.3}", metrics.by_category.instructions.f1);
    println!("  Cuisine Match:           {:.1}%", scalar.cuisine.accuracy * 100.0);
    println!("  Servings Match:          {:.1}%", scalar.servings.accuracy * 100.0);
    println!("\nMetrics written to {}", metrics_path.display());
    println!("Per-entry scores written to {}", per_entry_path.display());
    Ok(())
}

fn resolve(
    config: CanonicalizerConfig,
    identifier: &str,
    slugs: Option<Vec<String>>,
    local: Option<Vec<String>>,
    ingredients: &Path,
) -> Result<()> {
    let global = match slugs {
        Some(slugs) => OntologyIndex::from_slugs(slugs),
        None => OntologyIndex::from_slugs(io::load_canonical_ingredients(ingredients)?.slugs()),
    };
    let local = local.map(OntologyIndex::from_slugs);
    if global.is_empty() && local.as_ref().map_or(true, OntologyIndex::is_empty) {
        tracing::warn!("Ontology is empty; every identifier resolves to no-candidates");
    }
    let tiers = OntologyTiers::with_local(local.as_ref(), &global);

    let decision = Canonicalizer::new(config).resolve(identifier, &tiers);
    println!("{}", serde_json::to_string_pretty(&decision)?);
    Ok(())
}
