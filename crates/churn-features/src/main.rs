//! CLI entry point for the churn feature pipeline.

use anyhow::{Result, anyhow};
use churn_features::{
    ChurnPipeline, DatasetReport, PipelineResult, RegionLookup, ReportGenerator, write_features,
};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

/// Region asset bundled with the crate.
const DEFAULT_REGIONS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/state_to_region.json");

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Customer churn feature pipeline",
    long_about = "Turns raw listening-event logs (JSON lines) into per-user churn feature tables.\n\n\
                  Both datasets are cleaned and aggregated independently; outputs are written\n\
                  only after both succeeded.\n\n\
                  EXAMPLES:\n  \
                  churn-features --train data/train.json --test data/test.json\n\n  \
                  # Write outputs and a JSON run report to results/\n  \
                  churn-features --train train.json --test test.json -o results/ --emit-report"
)]
struct Args {
    /// Path to the train data file
    #[arg(long)]
    train: PathBuf,

    /// Path to the test data file
    #[arg(long)]
    test: PathBuf,

    /// Path to the state-to-region JSON asset
    #[arg(long, default_value = DEFAULT_REGIONS)]
    regions: PathBuf,

    /// Output directory for the processed files
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and final summary)
    #[arg(short, long)]
    quiet: bool,

    /// Write a JSON run report to the output directory
    #[arg(short = 'r', long)]
    emit_report: bool,
}

/// Initialize the tracing subscriber for logging.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet);

    // The region asset is static; without it nothing can run.
    let lookup = Arc::new(RegionLookup::load(&args.regions)?);

    let mut builder = ChurnPipeline::builder().region_lookup(Arc::clone(&lookup));
    if !args.quiet {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }
    let pipeline = builder.build()?;

    let datasets = [("train", &args.train), ("test", &args.test)];

    // Transform everything before writing anything.
    let mut results = Vec::with_capacity(datasets.len());
    for (name, input) in datasets {
        info!("Processing {} data...", name);
        let result = pipeline.process_file(input).map_err(|e| {
            error!("Failed to process {} data: {}", name, e);
            anyhow!("Failed to process {} data ({}): {}", name, input.display(), e)
        })?;
        results.push((name, input, result));
    }

    let mut reports = Vec::with_capacity(results.len());
    for (name, input, mut result) in results {
        let output_path = args.output.join(format!("processed_{}_data.json", name));
        write_features(&mut result.features, &output_path)?;
        print_summary(name, &output_path, &result);
        reports.push(DatasetReport::new(name, input, &output_path, result.summary));
    }
    info!("Prepared data saved successfully.");

    if args.emit_report {
        let report = ReportGenerator::build_run_report(
            &args.regions,
            lookup.len(),
            pipeline.config(),
            reports,
        );
        let report_path =
            ReportGenerator::new(&args.output).write_report_to_file(&report, "churn_features")?;
        info!("Report written to: {}", report_path.display());
    }

    Ok(())
}

/// Print a short human-readable summary of one dataset.
///
/// Uses `println!` so the summary is visible regardless of log level.
fn print_summary(name: &str, output_path: &Path, result: &PipelineResult) {
    let summary = &result.summary;
    let cleaning = &summary.cleaning;

    println!(
        "{}: {} events -> {} cleaned ({} without key, {} missing user info, {} duplicates) -> {} users",
        name,
        cleaning.rows_before,
        cleaning.rows_after,
        cleaning.rows_missing_key,
        cleaning.rows_missing_user_info,
        cleaning.rows_duplicate,
        summary.users
    );
    println!(
        "  churned: {} ({:.1}%), unmapped locations: {}, output: {}",
        summary.churned_users,
        summary.churn_rate() * 100.0,
        summary.unmapped_locations,
        output_path.display()
    );
}
