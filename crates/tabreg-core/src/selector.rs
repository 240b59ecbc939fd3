//! Column role assignment: numeric detection and feature/target split.

use crate::error::{PipelineError, Result};
use crate::types::ColumnRoles;
use crate::utils::{is_numeric_string, series_dtype_category, DtypeCategory};
use polars::prelude::*;
use tracing::{debug, info};

/// Splits a cleaned dataset's numeric columns into features and a target.
///
/// The split is positional: all numeric columns except the rightmost become
/// features (in their original order), the rightmost numeric column becomes
/// the target. No semantic meaning is inferred; callers that care which
/// column is predicted must place it as the last numeric column.
pub struct ColumnSelector;

impl ColumnSelector {
    /// Classify columns and derive the feature/target assignment.
    ///
    /// Fails with `InsufficientNumericColumns` when fewer than two columns
    /// qualify as numeric.
    pub fn select(df: &DataFrame) -> Result<ColumnRoles> {
        let mut numeric: Vec<String> = Vec::new();

        for col in df.get_columns() {
            let series = col.as_materialized_series();
            if Self::is_numeric_column(series)? {
                numeric.push(series.name().to_string());
            }
        }

        debug!("Numeric columns: {:?}", numeric);

        if numeric.len() < 2 {
            return Err(PipelineError::InsufficientNumericColumns {
                found: numeric.len(),
            });
        }

        let target = numeric.pop().expect("at least two numeric columns");
        info!(
            "Selected {} feature column(s), target '{}'",
            numeric.len(),
            target
        );

        Ok(ColumnRoles {
            features: numeric,
            target,
        })
    }

    /// A column is numeric when its dtype is numeric, or when it is a text
    /// column whose present values all parse as numbers (at least one must
    /// be present).
    fn is_numeric_column(series: &Series) -> Result<bool> {
        match series_dtype_category(series) {
            DtypeCategory::Numeric => Ok(true),
            DtypeCategory::Text => {
                let casted = series.cast(&DataType::String)?;
                let chunked = casted.str()?;
                let mut present = 0usize;
                for value in chunked.into_iter().flatten() {
                    if !is_numeric_string(value) {
                        return Ok(false);
                    }
                    present += 1;
                }
                Ok(present > 0)
            }
            _ => Ok(false),
        }
    }
}
