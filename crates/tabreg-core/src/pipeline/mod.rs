//! Pipeline orchestration.
//!
//! A run is a strict left-to-right sequence: load, clean, select columns,
//! fit, write the OLS summary, profile and write the report, then write
//! the per-feature plots. Any stage failure ends the run; artifacts
//! already written stay on disk. Cancellation is honored between stages.

pub mod progress;

pub use progress::{
    CancellationToken, ClosureProgressReporter, PipelineStage, ProgressEvent, ProgressReporter,
};

use crate::artifacts::{input_stem, ArtifactWriter};
use crate::cleaner::DataCleaner;
use crate::error::{PipelineError, Result};
use crate::profiler::DataProfiler;
use crate::regression::RegressionEngine;
use crate::selector::ColumnSelector;
use crate::types::RunArtifacts;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

/// The analysis pipeline.
///
/// Build one with [`Pipeline::builder()`], then call
/// [`run`](Pipeline::run) per input file. A pipeline holds no per-run
/// state and can be reused.
///
/// # Example
///
/// ```rust,ignore
/// use tabreg_core::{Pipeline, CancellationToken};
///
/// let token = CancellationToken::new();
/// let artifacts = Pipeline::builder()
///     .cancellation_token(token.clone())
///     .on_progress(|event| {
///         println!("[{:>5.1}%] {}", event.percent, event.message);
///     })
///     .build()
///     .run("measurements.csv".as_ref(), "outputs".as_ref())?;
///
/// println!("Report: {}", artifacts.report_path.display());
/// ```
pub struct Pipeline {
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    cancellation_token: CancellationToken,
    cleaner: DataCleaner,
}

// The pipeline is handed to worker threads by GUI front-ends.
static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Run the full analysis for one input file.
    ///
    /// On success all three artifacts exist under `output_dir` and the
    /// final progress event carries exactly 100 percent. On failure the
    /// originating error is returned and artifacts written before the
    /// failing stage remain on disk.
    pub fn run(&self, input: &Path, output_dir: &Path) -> Result<RunArtifacts> {
        match self.run_internal(input, output_dir) {
            Ok(artifacts) => {
                self.report(ProgressEvent::completed("Analysis complete"));
                Ok(artifacts)
            }
            Err(e) => {
                if e.is_cancelled() {
                    self.report(ProgressEvent::cancelled());
                } else {
                    self.report(ProgressEvent::failed(e.to_string()));
                }
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancellation_token.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        Ok(())
    }

    fn report(&self, event: ProgressEvent) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(event);
        }
    }

    fn run_internal(&self, input: &Path, output_dir: &Path) -> Result<RunArtifacts> {
        info!("Starting analysis of {:?}", input);

        self.check_cancelled()?;
        self.report(ProgressEvent::at(
            PipelineStage::Loading,
            0.0,
            format!("Loading {}", input.display()),
        ));
        let df = crate::loader::TableLoader::load(input)?;
        self.report(ProgressEvent::at(
            PipelineStage::Loading,
            1.0,
            format!("Loaded {} rows, {} columns", df.height(), df.width()),
        ));

        self.check_cancelled()?;
        self.report(ProgressEvent::at(
            PipelineStage::Cleaning,
            0.0,
            "Removing fully-empty rows",
        ));
        let cleaned = self.cleaner.drop_empty_rows(&df)?;
        self.report(ProgressEvent::at(
            PipelineStage::Cleaning,
            1.0,
            format!("{} rows retained", cleaned.height()),
        ));

        self.check_cancelled()?;
        self.report(ProgressEvent::at(
            PipelineStage::Selecting,
            0.0,
            "Classifying numeric columns",
        ));
        let roles = ColumnSelector::select(&cleaned)?;
        self.report(ProgressEvent::at(
            PipelineStage::Selecting,
            1.0,
            format!(
                "{} feature(s), target '{}'",
                roles.features.len(),
                roles.target
            ),
        ));

        self.check_cancelled()?;
        self.report(ProgressEvent::at(
            PipelineStage::Fitting,
            0.0,
            "Fitting OLS model",
        ));
        let model = RegressionEngine::fit(&cleaned, &roles)?;
        self.report(ProgressEvent::at(
            PipelineStage::Fitting,
            1.0,
            format!("Model fitted over {} observations", model.n_observations),
        ));

        let writer = ArtifactWriter::new(output_dir, input_stem(input));

        self.check_cancelled()?;
        self.report(ProgressEvent::at(
            PipelineStage::WritingSummary,
            0.0,
            "Writing OLS summary document",
        ));
        let summary_path = writer.write_summary(&model)?;
        self.report(ProgressEvent::at(
            PipelineStage::WritingSummary,
            1.0,
            "OLS summary written",
        ));

        self.check_cancelled()?;
        self.report(ProgressEvent::at(
            PipelineStage::Profiling,
            0.0,
            "Profiling dataset",
        ));
        let profile = DataProfiler::profile_dataset(&cleaned)?;
        let report_path = writer.write_report(&profile)?;
        self.report(ProgressEvent::at(
            PipelineStage::Profiling,
            1.0,
            "Profiling report written",
        ));

        self.check_cancelled()?;
        self.report(ProgressEvent::at(
            PipelineStage::WritingPlots,
            0.0,
            "Rendering regression plots",
        ));
        let plots_path = writer.write_plots(&cleaned, &roles, &model, |done, total| {
            self.report(ProgressEvent::with_items(
                PipelineStage::WritingPlots,
                done,
                total,
                format!("Rendered plot {}/{}", done, total),
            ));
        })?;

        Ok(RunArtifacts {
            base_name: writer.base_name().to_string(),
            report_path,
            summary_path,
            plots_path,
        })
    }
}

/// Run the analysis with a plain progress callback.
///
/// This is the function-style entry point for front-ends that do not need
/// cancellation or a custom reporter.
pub fn run<F>(input: &Path, output_dir: &Path, on_progress: F) -> Result<RunArtifacts>
where
    F: Fn(ProgressEvent) + Send + Sync + 'static,
{
    Pipeline::builder()
        .on_progress(on_progress)
        .build()
        .run(input, output_dir)
}

/// Builder for a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    cancellation_token: Option<CancellationToken>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set a custom progress reporter implementation.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// Convenience over [`progress_reporter`](Self::progress_reporter)
    /// for simple handlers.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressEvent) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Set a cancellation token checked between stages.
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Build the pipeline.
    pub fn build(self) -> Pipeline {
        Pipeline {
            progress_reporter: self.progress_reporter,
            cancellation_token: self.cancellation_token.unwrap_or_default(),
            cleaner: DataCleaner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_builder_default_has_no_reporter() {
        let pipeline = Pipeline::builder().build();
        assert!(pipeline.progress_reporter.is_none());
        assert!(!pipeline.cancellation_token.is_cancelled());
    }

    #[test]
    fn test_builder_with_progress_callback() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let pipeline = Pipeline::builder()
            .on_progress(move |_event| {
                call_count_clone.fetch_add(1, Ordering::SeqCst);
            })
            .build();

        pipeline.report(ProgressEvent::at(PipelineStage::Loading, 0.5, "test"));
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_check_cancelled() {
        let token = CancellationToken::new();
        let pipeline = Pipeline::builder()
            .cancellation_token(token.clone())
            .build();

        assert!(pipeline.check_cancelled().is_ok());

        token.cancel();
        let result = pipeline.check_cancelled();
        assert!(matches!(result.unwrap_err(), PipelineError::Cancelled));
    }

    #[test]
    fn test_cancelled_before_start_touches_nothing() {
        let token = CancellationToken::new();
        token.cancel();

        let dir = tempfile::tempdir().unwrap();
        let result = Pipeline::builder()
            .cancellation_token(token)
            .build()
            .run(Path::new("missing.csv"), dir.path());

        assert!(matches!(result.unwrap_err(), PipelineError::Cancelled));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
