//! CLI entry point for the analysis pipeline.

use anyhow::{Context, Result};
use clap::Parser;
use tabreg_core::{Pipeline, PipelineError, ProgressEvent};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Tabular regression and profiling pipeline",
    long_about = "Loads a CSV or Excel file, removes fully-empty rows, fits an OLS model\n\
                  over the numeric columns (last numeric column is the target), and writes\n\
                  three HTML artifacts into the output directory:\n\n  \
                  <stem>_ols_summary.html   regression summary\n  \
                  <stem>_report.html        automated profiling report\n  \
                  <stem>_regression.html    one scatter/fit page per feature\n\n\
                  EXAMPLES:\n  \
                  # Analyze a CSV into ./outputs\n  \
                  tabreg -i measurements.csv\n\n  \
                  # Excel input, custom output directory, JSON result\n  \
                  tabreg -i sales.xlsx -o reports/ --json"
)]
struct Args {
    /// Path to the CSV or Excel file to analyze
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for the generated artifacts
    #[arg(short, long, default_value = "./outputs")]
    output: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Suppress progress output (only show errors and the final result)
    #[arg(short, long)]
    quiet: bool,

    /// Print the artifact paths as JSON on success
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level.clone()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if let Err(e) = run_cli(&args) {
        error!("{:#}", e);
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run_cli(args: &Args) -> Result<()> {
    let quiet = args.quiet;
    let mut builder = Pipeline::builder();
    if !quiet {
        builder = builder.on_progress(print_progress);
    }

    let artifacts = builder
        .build()
        .run(&args.input, &args.output)
        .map_err(annotate)
        .with_context(|| format!("analysis of {} failed", args.input.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&artifacts)?);
    } else {
        println!("Artifacts written for '{}':", artifacts.base_name);
        println!("  summary: {}", artifacts.summary_path.display());
        println!("  report:  {}", artifacts.report_path.display());
        println!("  plots:   {}", artifacts.plots_path.display());
    }

    Ok(())
}

fn print_progress(event: ProgressEvent) {
    eprintln!(
        "[{:>5.1}%] {:<18} {}",
        event.percent,
        event.stage.display_name(),
        event.message
    );
}

/// Attach a hint for the errors a user can fix by changing the input.
fn annotate(e: PipelineError) -> anyhow::Error {
    let hint = match &e {
        PipelineError::UnsupportedFormat { .. } => {
            Some("supported inputs are .csv, .xlsx and .xls")
        }
        PipelineError::InsufficientNumericColumns { .. } => {
            Some("regression needs at least two numeric columns (features + target)")
        }
        PipelineError::SingularDesignMatrix(_) => {
            Some("check for duplicate or constant feature columns and enough rows")
        }
        _ => None,
    };

    match hint {
        Some(hint) => anyhow::Error::new(e).context(hint),
        None => anyhow::Error::new(e),
    }
}
