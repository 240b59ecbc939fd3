//! Shared result types produced by the pipeline.
//!
//! Everything here is `Serialize`/`Deserialize` so front-ends can receive
//! results over IPC or persist them as JSON.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Role assignment for the columns of a cleaned dataset.
///
/// Derived by the column selector, never stored in the data itself.
/// `features` keeps the numeric columns' original left-to-right order;
/// `target` is always the rightmost numeric column. This is a positional
/// convention: callers must place their dependent variable as the last
/// numeric column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnRoles {
    /// All numeric columns except the last, in original order.
    pub features: Vec<String>,
    /// The last numeric column.
    pub target: String,
}

impl ColumnRoles {
    /// Total number of numeric columns (features + target).
    pub fn numeric_count(&self) -> usize {
        self.features.len() + 1
    }
}

/// One estimated term of a fitted model (intercept or feature).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoefficientEstimate {
    /// Term name: `"intercept"` or the feature column name.
    pub name: String,
    pub coefficient: f64,
    pub std_error: f64,
    pub t_value: f64,
    /// Two-sided p-value from Student's t.
    pub p_value: f64,
    /// 95% confidence bounds.
    pub ci_lower: f64,
    pub ci_upper: f64,
}

/// Result of an ordinary-least-squares fit.
///
/// Created once per pipeline run and consumed by both artifact writers.
/// `fitted` is aligned with `row_indices`: rows of the cleaned dataset
/// that had a missing value in any selected numeric column are excluded
/// from the fit and carry no fitted value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedModel {
    /// Name of the target column.
    pub target: String,
    /// Intercept first, then one estimate per feature in feature order.
    pub terms: Vec<CoefficientEstimate>,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    /// Residual standard error (square root of SSE / df).
    pub residual_std_error: f64,
    pub f_statistic: f64,
    pub f_pvalue: f64,
    /// Number of usable observations that entered the fit.
    pub n_observations: usize,
    /// Predicted target values, one per usable row.
    pub fitted: Vec<f64>,
    /// Indices into the cleaned dataset for each fitted value.
    pub row_indices: Vec<usize>,
}

impl FittedModel {
    /// Coefficients in design order (intercept first), as a plain vector.
    pub fn coefficients(&self) -> Vec<f64> {
        self.terms.iter().map(|t| t.coefficient).collect()
    }

    /// Predict the target for a single feature row (without intercept column).
    pub fn predict(&self, features: &[f64]) -> f64 {
        let mut value = self.terms[0].coefficient;
        for (term, x) in self.terms[1..].iter().zip(features) {
            value += term.coefficient * x;
        }
        value
    }
}

/// The pipeline's externally visible output: where the artifacts landed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunArtifacts {
    /// Input file stem the artifact names were derived from.
    pub base_name: String,
    /// Profiling report document.
    pub report_path: PathBuf,
    /// OLS summary document.
    pub summary_path: PathBuf,
    /// Multi-page regression plot document.
    pub plots_path: PathBuf,
}

// ============================================================================
// Profiling types
// ============================================================================

/// One bin of a histogram over a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// A category value with its frequency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCount {
    pub value: String,
    pub count: usize,
    pub percentage: f64,
}

/// Distribution summary for a numeric column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub histogram: Vec<HistogramBin>,
}

/// Distribution summary for a categorical/text column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalSummary {
    /// Number of distinct present values.
    pub cardinality: usize,
    /// Most frequent values, descending by count.
    pub top_values: Vec<CategoryCount>,
}

/// Profile of a single column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    /// Physical dtype as reported by the dataframe.
    pub dtype: String,
    /// Semantic type: "numeric", "text", "categorical", "temporal", "boolean".
    pub inferred_type: String,
    pub missing_count: usize,
    pub missing_percentage: f64,
    pub distinct_count: usize,
    pub sample_values: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categorical: Option<CategoricalSummary>,
}

/// Pairwise Pearson correlation over the numeric columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major, `columns.len()` x `columns.len()`, diagonal 1.0.
    pub values: Vec<Vec<f64>>,
}

/// Descriptive profile of a whole dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetProfile {
    /// (rows, columns)
    pub shape: (usize, usize),
    pub column_profiles: Vec<ColumnProfile>,
    pub total_missing_cells: usize,
    pub total_missing_percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlations: Option<CorrelationMatrix>,
}
