//! Progress reporting and cancellation for pipeline runs.
//!
//! The orchestrator emits `(stage, percent)` events through a
//! [`ProgressReporter`]; callers must not assume a fixed number of events,
//! only that the percent is monotonically non-decreasing and that a run
//! terminates with exactly 100 on success or a `Failed`/`Cancelled` event.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Stages of the analysis pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Nothing started yet
    Idle,
    /// Reading the input file
    Loading,
    /// Dropping fully-empty rows
    Cleaning,
    /// Classifying columns and splitting features/target
    Selecting,
    /// Fitting the OLS model
    Fitting,
    /// Writing the OLS summary document
    WritingSummary,
    /// Profiling the cleaned dataset and writing the report
    Profiling,
    /// Rendering and writing the per-feature plot document
    WritingPlots,
    /// Run finished successfully
    Done,
    /// Run was cancelled between stages
    Cancelled,
    /// Run failed with an error
    Failed,
}

impl PipelineStage {
    /// Human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Loading => "Loading Input",
            Self::Cleaning => "Cleaning Rows",
            Self::Selecting => "Selecting Columns",
            Self::Fitting => "Fitting Model",
            Self::WritingSummary => "Writing Summary",
            Self::Profiling => "Profiling Dataset",
            Self::WritingPlots => "Writing Plots",
            Self::Done => "Done",
            Self::Cancelled => "Cancelled",
            Self::Failed => "Failed",
        }
    }

    /// Weight of this stage in percent points. The main stages sum to 100.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Idle => 0.0,
            Self::Loading => 10.0,
            Self::Cleaning => 5.0,
            Self::Selecting => 5.0,
            Self::Fitting => 25.0,
            Self::WritingSummary => 15.0,
            Self::Profiling => 20.0,
            Self::WritingPlots => 20.0,
            Self::Done => 0.0,
            Self::Cancelled => 0.0,
            Self::Failed => 0.0,
        }
    }

    /// Cumulative percent at the start of this stage.
    pub fn base_percent(&self) -> f32 {
        match self {
            Self::Idle => 0.0,
            Self::Loading => 0.0,
            Self::Cleaning => 10.0,
            Self::Selecting => 15.0,
            Self::Fitting => 20.0,
            Self::WritingSummary => 45.0,
            Self::Profiling => 60.0,
            Self::WritingPlots => 80.0,
            Self::Done => 100.0,
            Self::Cancelled => 0.0,
            Self::Failed => 0.0,
        }
    }
}

/// A single `(stage, percent)` progress event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Current pipeline stage
    pub stage: PipelineStage,

    /// Overall progress in [0, 100]
    pub percent: f32,

    /// Human-readable message describing current activity
    pub message: String,

    /// Items processed within the stage (for per-feature plot rendering)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_processed: Option<usize>,

    /// Total items within the stage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_total: Option<usize>,
}

impl ProgressEvent {
    /// Event at a fractional position within a stage.
    pub fn at(stage: PipelineStage, stage_fraction: f32, message: impl Into<String>) -> Self {
        let fraction = stage_fraction.clamp(0.0, 1.0);
        Self {
            stage,
            percent: (stage.base_percent() + stage.weight() * fraction).clamp(0.0, 100.0),
            message: message.into(),
            items_processed: None,
            items_total: None,
        }
    }

    /// Event with item counts for iterative stages.
    pub fn with_items(
        stage: PipelineStage,
        current: usize,
        total: usize,
        message: impl Into<String>,
    ) -> Self {
        let fraction = if total > 0 {
            current as f32 / total as f32
        } else {
            0.0
        };
        let mut event = Self::at(stage, fraction, message);
        event.items_processed = Some(current);
        event.items_total = Some(total);
        event
    }

    /// Terminal success event; percent is exactly 100.
    pub fn completed(message: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Done,
            percent: 100.0,
            message: message.into(),
            items_processed: None,
            items_total: None,
        }
    }

    /// Terminal cancellation event.
    pub fn cancelled() -> Self {
        Self {
            stage: PipelineStage::Cancelled,
            percent: 0.0,
            message: "Pipeline cancelled".to_string(),
            items_processed: None,
            items_total: None,
        }
    }

    /// Terminal failure event.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Failed,
            percent: 0.0,
            message: message.into(),
            items_processed: None,
            items_total: None,
        }
    }
}

/// Trait for receiving progress events during a pipeline run.
///
/// Implementations must be `Send + Sync` so a front-end can run the
/// pipeline on a worker thread while observing from elsewhere. Callbacks
/// may fire frequently (once per plotted feature); keep them cheap.
pub trait ProgressReporter: Send + Sync {
    /// Called for every progress event.
    fn report(&self, event: ProgressEvent);
}

/// [`ProgressReporter`] backed by a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    /// Creates a new closure-based progress reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn report(&self, event: ProgressEvent) {
        (self.callback)(event);
    }
}

/// Token for cancelling a running pipeline between stages.
///
/// Clones share state; call [`cancel()`](Self::cancel) from any thread.
/// The orchestrator checks the token at stage boundaries only, so a
/// stage that has started always runs to completion.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

// Cross-thread usage is part of the contract.
static_assertions::assert_impl_all!(CancellationToken: Send, Sync);
static_assertions::assert_impl_all!(ProgressEvent: Send, Sync);

impl CancellationToken {
    /// Creates a new cancellation token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation has been requested on this token or a clone.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Clear the flag so the token can be reused for another run.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_stage_weights_sum_to_hundred() {
        let stages = [
            PipelineStage::Loading,
            PipelineStage::Cleaning,
            PipelineStage::Selecting,
            PipelineStage::Fitting,
            PipelineStage::WritingSummary,
            PipelineStage::Profiling,
            PipelineStage::WritingPlots,
        ];
        let total: f32 = stages.iter().map(|s| s.weight()).sum();
        assert!((total - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_base_percent_is_cumulative() {
        let stages = [
            PipelineStage::Loading,
            PipelineStage::Cleaning,
            PipelineStage::Selecting,
            PipelineStage::Fitting,
            PipelineStage::WritingSummary,
            PipelineStage::Profiling,
            PipelineStage::WritingPlots,
        ];
        let mut cumulative = 0.0;
        for stage in stages {
            assert!((stage.base_percent() - cumulative).abs() < 0.01);
            cumulative += stage.weight();
        }
    }

    #[test]
    fn test_event_at_clamps_fraction() {
        let event = ProgressEvent::at(PipelineStage::Fitting, 2.0, "over");
        assert!(event.percent <= PipelineStage::Fitting.base_percent()
            + PipelineStage::Fitting.weight());

        let event = ProgressEvent::at(PipelineStage::Fitting, -1.0, "under");
        assert_eq!(event.percent, PipelineStage::Fitting.base_percent());
    }

    #[test]
    fn test_completed_is_exactly_hundred() {
        let event = ProgressEvent::completed("done");
        assert_eq!(event.stage, PipelineStage::Done);
        assert_eq!(event.percent, 100.0);
    }

    #[test]
    fn test_with_items() {
        let event = ProgressEvent::with_items(PipelineStage::WritingPlots, 1, 4, "page 1/4");
        assert_eq!(event.items_processed, Some(1));
        assert_eq!(event.items_total, Some(4));
        assert!((event.percent - 85.0).abs() < 0.01);
    }

    #[test]
    fn test_stage_serializes_snake_case() {
        let json = serde_json::to_string(&PipelineStage::WritingSummary).unwrap();
        assert_eq!(json, "\"writing_summary\"");
        let json = serde_json::to_string(&PipelineStage::WritingPlots).unwrap();
        assert_eq!(json, "\"writing_plots\"");
    }

    #[test]
    fn test_cancellation_token_clone_shares_state() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());

        token.cancel();
        assert!(clone.is_cancelled());

        token.reset();
        assert!(!clone.is_cancelled());
    }

    #[test]
    fn test_cancellation_across_threads() {
        let token = CancellationToken::new();
        let token_clone = token.clone();

        token.cancel();
        let handle = std::thread::spawn(move || token_clone.is_cancelled());
        assert!(handle.join().expect("thread should not panic"));
    }

    #[test]
    fn test_closure_progress_reporter() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let reporter = ClosureProgressReporter::new(move |_event| {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        });

        reporter.report(ProgressEvent::at(PipelineStage::Loading, 0.0, "start"));
        reporter.report(ProgressEvent::completed("done"));
        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }
}
