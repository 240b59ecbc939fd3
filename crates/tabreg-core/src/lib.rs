//! Tabular Regression & Profiling Pipeline
//!
//! Loads a tabular file (CSV or Excel), removes fully-empty rows, fits an
//! ordinary-least-squares model over the numeric columns (last numeric
//! column is the target), and writes three self-contained HTML artifacts:
//! an OLS summary, an automated profiling report, and a multi-page
//! document of per-feature regression plots.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tabreg_core::run;
//!
//! let artifacts = run(
//!     "measurements.csv".as_ref(),
//!     "outputs".as_ref(),
//!     |event| println!("[{:>5.1}%] {}", event.percent, event.message),
//! )?;
//!
//! println!("Report:  {}", artifacts.report_path.display());
//! println!("Summary: {}", artifacts.summary_path.display());
//! println!("Plots:   {}", artifacts.plots_path.display());
//! ```
//!
//! # Column convention
//!
//! The feature/target split is positional: every numeric column except the
//! rightmost is a feature, the rightmost is the target. Place the dependent
//! variable as the last numeric column of the input.
//!
//! # Progress and cancellation
//!
//! Use the [`Pipeline`] builder for a progress reporter and a
//! [`CancellationToken`]; both are `Send + Sync`, so a GUI can run the
//! pipeline on a worker thread:
//!
//! ```rust,ignore
//! use tabreg_core::{Pipeline, CancellationToken, PipelineError};
//!
//! let token = CancellationToken::new();
//! let result = Pipeline::builder()
//!     .cancellation_token(token.clone())
//!     .on_progress(|event| println!("{}: {}", event.stage.display_name(), event.message))
//!     .build()
//!     .run("data.xlsx".as_ref(), "outputs".as_ref());
//!
//! match result {
//!     Ok(artifacts) => println!("Done: {}", artifacts.base_name),
//!     Err(PipelineError::Cancelled) => println!("Cancelled"),
//!     Err(e) => eprintln!("Failed: {}", e),
//! }
//! ```

pub mod artifacts;
pub mod cleaner;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod profiler;
pub mod regression;
pub mod selector;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use artifacts::{input_stem, ArtifactWriter};
pub use cleaner::DataCleaner;
pub use error::{PipelineError, Result, ResultExt};
pub use loader::{InputFormat, TableLoader};
pub use pipeline::{
    run, CancellationToken, ClosureProgressReporter, Pipeline, PipelineBuilder, PipelineStage,
    ProgressEvent, ProgressReporter,
};
pub use profiler::DataProfiler;
pub use regression::RegressionEngine;
pub use selector::ColumnSelector;
pub use types::{
    CategoricalSummary, CategoryCount, CoefficientEstimate, ColumnProfile, ColumnRoles,
    CorrelationMatrix, DatasetProfile, FittedModel, HistogramBin, NumericSummary, RunArtifacts,
};
