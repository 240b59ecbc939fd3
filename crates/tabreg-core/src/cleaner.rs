//! Row cleaning: removal of fully-empty rows.

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use tracing::{debug, info};

/// Cleaner that drops rows in which every cell is missing.
///
/// Rows with any present value are retained unchanged; the input frame is
/// never mutated.
pub struct DataCleaner;

impl DataCleaner {
    /// Return a new DataFrame without the fully-null rows.
    ///
    /// Fails with `InvalidDataset` when the table has no columns.
    pub fn drop_empty_rows(&self, df: &DataFrame) -> Result<DataFrame> {
        if df.width() == 0 {
            return Err(PipelineError::InvalidDataset(
                "dataset has no columns".to_string(),
            ));
        }

        if df.height() == 0 {
            return Ok(df.clone());
        }

        info!("Dropping fully-empty rows...");

        // Accumulate per-row null counts across all columns.
        let mut null_counts = Series::new("nulls".into(), vec![0u32; df.height()]);
        for col in df.get_columns() {
            let series = col.as_materialized_series();
            let null_mask = series.is_null();
            if let Ok(null_int) = null_mask.cast(&DataType::UInt32)
                && let Ok(sum) = &null_counts + &null_int
            {
                null_counts = sum;
            }
        }

        // Keep a row iff at least one of its cells is present.
        let null_counts_f64 = null_counts.cast(&DataType::Float64)?;
        let null_fraction = &null_counts_f64 / df.width() as f64;
        let mask = null_fraction.lt(1.0)?;

        let cleaned = df.filter(&mask)?;
        let removed = df.height() - cleaned.height();
        if removed > 0 {
            debug!("Removed {} fully-empty rows", removed);
        } else {
            debug!("No fully-empty rows found");
        }

        Ok(cleaned)
    }
}
