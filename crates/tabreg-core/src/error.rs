//! Error types for the analysis pipeline.
//!
//! Every stage failure maps to exactly one variant here; the orchestrator
//! propagates the first failure unchanged and runs no further stages.
//!
//! Errors are serializable as `{code, message}` so a front-end (GUI, IPC)
//! can dispatch on the code while displaying the message.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the analysis pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Pipeline was cancelled between stages.
    #[error("Pipeline cancelled")]
    Cancelled,

    /// Input extension is not one of the supported formats.
    #[error("Unsupported input format '.{extension}' (expected .csv, .xlsx or .xls)")]
    UnsupportedFormat { extension: String },

    /// Structurally degenerate table (e.g. zero columns).
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    /// Fewer than two numeric columns remain after cleaning.
    #[error("Insufficient numeric columns for regression: found {found}, need at least 2")]
    InsufficientNumericColumns { found: usize },

    /// No rows remain after cleaning.
    #[error("No rows remain after cleaning")]
    EmptyInput,

    /// The regression design matrix is not full rank.
    #[error("Singular design matrix: {0}")]
    SingularDesignMatrix(String),

    /// An output artifact could not be written.
    #[error("Failed to write '{}': {source}", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input unreadable (missing file, corrupt content, permissions).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PipelineError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code for front-end handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Cancelled => "CANCELLED",
            Self::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            Self::InvalidDataset(_) => "INVALID_DATASET",
            Self::InsufficientNumericColumns { .. } => "INSUFFICIENT_NUMERIC_COLUMNS",
            Self::EmptyInput => "EMPTY_INPUT",
            Self::SingularDesignMatrix(_) => "SINGULAR_DESIGN_MATRIX",
            Self::WriteFailure { .. } => "WRITE_FAILURE",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error represents a cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Serialize as `{code, message}` for IPC compatibility.
impl Serialize for PipelineError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PipelineError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PipelineError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(PipelineError::Cancelled.error_code(), "CANCELLED");
        assert_eq!(
            PipelineError::UnsupportedFormat {
                extension: "txt".to_string()
            }
            .error_code(),
            "UNSUPPORTED_FORMAT"
        );
        assert_eq!(
            PipelineError::InsufficientNumericColumns { found: 1 }.error_code(),
            "INSUFFICIENT_NUMERIC_COLUMNS"
        );
    }

    #[test]
    fn test_error_serialization() {
        let error = PipelineError::UnsupportedFormat {
            extension: "txt".to_string(),
        };
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("UNSUPPORTED_FORMAT"));
        assert!(json.contains(".txt"));
    }

    #[test]
    fn test_with_context_preserves_code() {
        let error = PipelineError::EmptyInput.with_context("While fitting model");
        assert!(error.to_string().contains("While fitting model"));
        assert_eq!(error.error_code(), "EMPTY_INPUT");
    }

    #[test]
    fn test_is_cancelled() {
        assert!(PipelineError::Cancelled.is_cancelled());
        assert!(!PipelineError::EmptyInput.is_cancelled());
    }
}
