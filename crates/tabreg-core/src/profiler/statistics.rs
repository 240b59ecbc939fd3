//! Per-column distribution summaries.

use crate::error::Result;
use crate::types::{CategoricalSummary, CategoryCount, HistogramBin, NumericSummary};
use crate::utils::{numeric_values, quantile_sorted};
use polars::prelude::*;
use std::collections::HashMap;

/// Number of histogram bins for numeric columns.
const HISTOGRAM_BINS: usize = 20;

/// Number of top categories reported per categorical column.
const TOP_VALUES: usize = 15;

/// Distribution summary of a numeric column, or `None` when no present
/// values remain.
pub fn numeric_summary(series: &Series) -> Result<Option<NumericSummary>> {
    let values: Vec<f64> = numeric_values(series)?
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .collect();
    if values.is_empty() {
        return Ok(None);
    }

    let mut sorted = values.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();

    let min = *sorted.first().expect("non-empty");
    let max = *sorted.last().expect("non-empty");
    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = if n > 1 {
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0)
    } else {
        0.0
    };

    Ok(Some(NumericSummary {
        min,
        max,
        mean,
        std_dev: variance.sqrt(),
        q1: quantile_sorted(&sorted, 0.25),
        median: quantile_sorted(&sorted, 0.5),
        q3: quantile_sorted(&sorted, 0.75),
        histogram: build_histogram(&sorted, HISTOGRAM_BINS),
    }))
}

/// Top values and cardinality of a categorical/text column, or `None` when
/// no present values remain.
pub fn categorical_summary(series: &Series) -> Result<Option<CategoricalSummary>> {
    let casted = series.cast(&DataType::String)?;
    let values: Vec<String> = casted
        .str()?
        .into_iter()
        .flatten()
        .map(|value| value.to_string())
        .collect();

    if values.is_empty() {
        return Ok(None);
    }

    let total = values.len() as f64;
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    let cardinality = counts.len();
    let mut entries: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(value, count)| CategoryCount {
            percentage: (count as f64 / total) * 100.0,
            value,
            count,
        })
        .collect();
    // Descending by count, ties broken by value for deterministic output.
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));

    Ok(Some(CategoricalSummary {
        cardinality,
        top_values: entries.into_iter().take(TOP_VALUES).collect(),
    }))
}

/// Equal-width histogram over an already-sorted sample.
pub fn build_histogram(sorted: &[f64], bins: usize) -> Vec<HistogramBin> {
    if sorted.is_empty() {
        return Vec::new();
    }

    let min = sorted.first().copied().unwrap_or(0.0);
    let max = sorted.last().copied().unwrap_or(min);
    if (max - min).abs() < f64::EPSILON {
        return vec![HistogramBin {
            start: min,
            end: max,
            count: sorted.len(),
        }];
    }

    let bin_count = bins.max(5);
    let width = (max - min) / bin_count as f64;
    let mut counts = vec![0usize; bin_count];

    for value in sorted {
        let mut index = ((value - min) / width) as usize;
        if index >= bin_count {
            index = bin_count - 1;
        }
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(idx, count)| HistogramBin {
            start: min + idx as f64 * width,
            end: min + (idx as f64 + 1.0) * width,
            count,
        })
        .collect()
}
