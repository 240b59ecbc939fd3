//! Shared helpers: dtype classification and lenient numeric string parsing.

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Coarse category of a column's physical data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// Date or datetime types
    Temporal,
    /// Boolean type
    Boolean,
    /// String/text type
    Text,
    /// Other/unknown types
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a date/time type.
#[inline]
pub fn is_temporal_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time
    )
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if is_temporal_dtype(dtype) {
        DtypeCategory::Temporal
    } else if matches!(dtype, DataType::Boolean) {
        DtypeCategory::Boolean
    } else if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
        DtypeCategory::Text
    } else {
        DtypeCategory::Other
    }
}

/// Get the dtype category of a Series.
pub fn series_dtype_category(series: &Series) -> DtypeCategory {
    get_dtype_category(series.dtype())
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Characters commonly used in numeric formatting that should be stripped.
pub const NUMERIC_FORMAT_CHARS: [char; 6] = [',', '$', '%', '€', '£', ' '];

/// Clean a string for numeric parsing by removing formatting characters.
pub fn clean_numeric_string(s: &str) -> String {
    let mut result = s.trim().to_string();
    for c in NUMERIC_FORMAT_CHARS {
        result = result.replace(c, "");
    }
    result
}

/// Try to parse a string as a numeric value (f64).
///
/// Handles common formatting like currency symbols, percentages, and
/// thousands separators.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let cleaned = clean_numeric_string(s);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// Check if a string can be parsed as a numeric value.
pub fn is_numeric_string(s: &str) -> bool {
    parse_numeric_string(s).is_some()
}

// =============================================================================
// Series Extraction Utilities
// =============================================================================

/// Extract a column as `Option<f64>` values, preserving row alignment.
///
/// Numeric and boolean dtypes are cast directly; string columns go through
/// the lenient numeric parser, where unparseable present values become null.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    match series_dtype_category(series) {
        DtypeCategory::Numeric => {
            let casted = series.cast(&DataType::Float64)?;
            Ok(casted.f64()?.into_iter().collect())
        }
        DtypeCategory::Text => {
            let casted = series.cast(&DataType::String)?;
            Ok(casted
                .str()?
                .into_iter()
                .map(|opt| opt.and_then(parse_numeric_string))
                .collect())
        }
        _ => {
            let casted = series.cast(&DataType::Float64)?;
            Ok(casted.f64()?.into_iter().collect())
        }
    }
}

/// Collect the leading non-null values of a Series, rendered as strings.
pub fn collect_sample_values(series: &Series, max_samples: usize) -> Vec<String> {
    let non_null = series.drop_nulls();
    if non_null.is_empty() {
        return Vec::new();
    }

    let sample_size = std::cmp::min(max_samples, non_null.len());
    let mut samples = Vec::with_capacity(sample_size);

    for i in 0..sample_size {
        if let Ok(val) = non_null.get(i) {
            samples.push(format!("{}", val));
        }
    }

    samples
}

// =============================================================================
// Quantile Utilities
// =============================================================================

/// Linear-interpolation quantile over an already-sorted slice.
pub fn quantile_sorted(values: &[f64], quantile: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let pos = quantile.clamp(0.0, 1.0) * (values.len() as f64 - 1.0);
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        return values[lower];
    }
    let weight = pos - lower as f64;
    values[lower] + (values[upper] - values[lower]) * weight
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_is_temporal_dtype() {
        assert!(is_temporal_dtype(&DataType::Date));
        assert!(is_temporal_dtype(&DataType::Datetime(
            TimeUnit::Milliseconds,
            None
        )));
        assert!(!is_temporal_dtype(&DataType::String));
    }

    #[test]
    fn test_clean_numeric_string() {
        assert_eq!(clean_numeric_string("$1,234.56"), "1234.56");
        assert_eq!(clean_numeric_string("  42%  "), "42");
        assert_eq!(clean_numeric_string("€100"), "100");
        assert_eq!(clean_numeric_string("1 000"), "1000");
    }

    #[test]
    fn test_parse_numeric_string() {
        assert_eq!(parse_numeric_string("42"), Some(42.0));
        assert_eq!(parse_numeric_string("$1,234.56"), Some(1234.56));
        assert_eq!(parse_numeric_string("-100"), Some(-100.0));
        assert_eq!(parse_numeric_string(""), None);
        assert_eq!(parse_numeric_string("hello"), None);
    }

    #[test]
    fn test_dtype_category() {
        assert_eq!(get_dtype_category(&DataType::Int64), DtypeCategory::Numeric);
        assert_eq!(get_dtype_category(&DataType::Date), DtypeCategory::Temporal);
        assert_eq!(
            get_dtype_category(&DataType::Boolean),
            DtypeCategory::Boolean
        );
        assert_eq!(get_dtype_category(&DataType::String), DtypeCategory::Text);
    }

    #[test]
    fn test_numeric_values_from_strings() {
        let series = Series::new("s".into(), &[Some("1.5"), None, Some("x"), Some("$2,000")]);
        let values = numeric_values(&series).unwrap();
        assert_eq!(values, vec![Some(1.5), None, None, Some(2000.0)]);
    }

    #[test]
    fn test_numeric_values_preserves_alignment() {
        let series = Series::new("n".into(), &[Some(1.0), None, Some(3.0)]);
        let values = numeric_values(&series).unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values[1], None);
    }

    #[test]
    fn test_quantile_sorted() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(quantile_sorted(&values, 0.0), 1.0);
        assert_eq!(quantile_sorted(&values, 0.5), 3.0);
        assert_eq!(quantile_sorted(&values, 1.0), 5.0);
        assert_eq!(quantile_sorted(&values, 0.25), 2.0);
    }

    #[test]
    fn test_collect_sample_values() {
        let series = Series::new("test".into(), &[Some("a"), None, Some("b"), Some("c")]);
        let samples = collect_sample_values(&series, 5);
        assert_eq!(samples.len(), 3);
    }
}
