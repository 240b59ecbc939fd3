//! Semantic type inference for columns.
//!
//! The physical dtype decides most cases; string columns are refined by
//! inspecting their present values (all-numeric strings, date-looking
//! strings, low-cardinality categoricals).

use crate::error::Result;
use crate::utils::{is_numeric_string, series_dtype_category, DtypeCategory};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;

/// Date layouts commonly seen in exported tabular data.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d.%m.%Y", "%m/%d/%Y", "%d/%m/%Y"];
const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
];

/// Cardinality at or below which a text column is treated as categorical.
const CATEGORICAL_MAX_CARDINALITY: usize = 20;

/// Infer the semantic type of a column: `"numeric"`, `"temporal"`,
/// `"boolean"`, `"categorical"` or `"text"`.
pub fn infer_column_type(series: &Series, distinct_count: usize) -> Result<String> {
    match series_dtype_category(series) {
        DtypeCategory::Numeric => Ok("numeric".to_string()),
        DtypeCategory::Temporal => Ok("temporal".to_string()),
        DtypeCategory::Boolean => Ok("boolean".to_string()),
        DtypeCategory::Text => infer_text_column_type(series, distinct_count),
        DtypeCategory::Other => Ok("text".to_string()),
    }
}

fn infer_text_column_type(series: &Series, distinct_count: usize) -> Result<String> {
    let casted = series.cast(&DataType::String)?;
    let chunked = casted.str()?;

    let mut present = 0usize;
    let mut numeric = 0usize;
    let mut temporal = 0usize;

    for value in chunked.into_iter().flatten() {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            continue;
        }
        present += 1;
        if is_numeric_string(trimmed) {
            numeric += 1;
        } else if parses_as_date(trimmed) {
            temporal += 1;
        }
    }

    if present == 0 {
        return Ok("text".to_string());
    }
    if numeric == present {
        return Ok("numeric".to_string());
    }
    if temporal == present {
        return Ok("temporal".to_string());
    }
    if distinct_count <= CATEGORICAL_MAX_CARDINALITY {
        return Ok("categorical".to_string());
    }
    Ok("text".to_string())
}

fn parses_as_date(s: &str) -> bool {
    DATE_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(s, fmt).is_ok())
        || DATETIME_FORMATS
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(s, fmt).is_ok())
}
