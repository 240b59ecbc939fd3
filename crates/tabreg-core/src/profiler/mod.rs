//! Dataset profiling for the automated report.
//!
//! This is a descriptive pass over the cleaned dataset, independent of the
//! regression step: per-column semantic types, missingness, cardinality and
//! distribution summaries, plus dataset-level missingness and the pairwise
//! Pearson correlation of the numeric columns.

mod statistics;
mod type_inference;

use crate::error::Result;
use crate::types::{ColumnProfile, CorrelationMatrix, DatasetProfile};
use crate::utils::{collect_sample_values, numeric_values};
use polars::prelude::*;
use tracing::{debug, info};

pub(crate) use statistics::{categorical_summary, numeric_summary};
pub(crate) use type_inference::infer_column_type;

/// Minimum paired observations for a correlation to be reported.
const MIN_CORRELATION_PAIRS: usize = 3;

/// Profiler producing the descriptive snapshot behind the report document.
pub struct DataProfiler;

impl DataProfiler {
    /// Profile an entire dataset.
    pub fn profile_dataset(df: &DataFrame) -> Result<DatasetProfile> {
        info!("Profiling dataset {:?}", (df.height(), df.width()));

        let mut column_profiles = Vec::with_capacity(df.width());
        for col_name in df.get_column_names() {
            column_profiles.push(Self::profile_column(df, col_name)?);
        }

        let total_cells = df.height().saturating_mul(df.width());
        let total_missing_cells: usize =
            column_profiles.iter().map(|col| col.missing_count).sum();
        let total_missing_percentage = if total_cells > 0 {
            (total_missing_cells as f64 / total_cells as f64) * 100.0
        } else {
            0.0
        };

        let correlations = Self::build_correlations(df, &column_profiles)?;

        Ok(DatasetProfile {
            shape: (df.height(), df.width()),
            column_profiles,
            total_missing_cells,
            total_missing_percentage,
            correlations,
        })
    }

    fn profile_column(df: &DataFrame, col_name: &str) -> Result<ColumnProfile> {
        let col = df.column(col_name)?;
        let series = col.as_materialized_series();
        let dtype = format!("{:?}", series.dtype());
        let distinct_count = series.n_unique()?;
        let missing_count = series.null_count();
        let missing_percentage = if df.height() > 0 {
            (missing_count as f64 / df.height() as f64) * 100.0
        } else {
            0.0
        };

        let sample_values = collect_sample_values(series, 5);
        let inferred_type = infer_column_type(series, distinct_count)?;

        debug!("  {}: {} (inferred: {})", col_name, dtype, inferred_type);

        let numeric = if inferred_type == "numeric" {
            numeric_summary(series)?
        } else {
            None
        };

        let categorical = if matches!(inferred_type.as_str(), "categorical" | "boolean" | "text") {
            categorical_summary(series)?
        } else {
            None
        };

        Ok(ColumnProfile {
            name: col_name.to_string(),
            dtype,
            inferred_type,
            missing_count,
            missing_percentage,
            distinct_count,
            sample_values,
            numeric,
            categorical,
        })
    }

    /// Pairwise Pearson correlation over the numeric columns, computed on
    /// pairwise-complete observations.
    fn build_correlations(
        df: &DataFrame,
        column_profiles: &[ColumnProfile],
    ) -> Result<Option<CorrelationMatrix>> {
        let numeric_columns: Vec<String> = column_profiles
            .iter()
            .filter(|col| col.inferred_type == "numeric")
            .map(|col| col.name.clone())
            .collect();

        if numeric_columns.len() < 2 {
            return Ok(None);
        }

        let mut series_values: Vec<Vec<Option<f64>>> = Vec::with_capacity(numeric_columns.len());
        for name in &numeric_columns {
            let series = df.column(name)?.as_materialized_series();
            series_values.push(numeric_values(series)?);
        }

        let size = numeric_columns.len();
        let mut values = vec![vec![0.0; size]; size];

        for i in 0..size {
            for j in i..size {
                if i == j {
                    values[i][j] = 1.0;
                    continue;
                }

                let mut x = Vec::new();
                let mut y = Vec::new();
                for (a, b) in series_values[i].iter().zip(series_values[j].iter()) {
                    if let (Some(a), Some(b)) = (a, b) {
                        x.push(*a);
                        y.push(*b);
                    }
                }

                if x.len() < MIN_CORRELATION_PAIRS {
                    continue;
                }

                let estimate = pearson(&x, &y);
                values[i][j] = estimate;
                values[j][i] = estimate;
            }
        }

        Ok(Some(CorrelationMatrix {
            columns: numeric_columns,
            values,
        }))
    }
}

/// Pearson product-moment correlation of two equally-long samples.
fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y.iter()) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x <= 0.0 || var_y <= 0.0 {
        return 0.0;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}
