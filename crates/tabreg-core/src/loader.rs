//! Input loading: delimited text and spreadsheet files into a DataFrame.
//!
//! Format is decided by the file extension alone, before any I/O happens.
//! CSV goes through the polars reader with schema inference; spreadsheets
//! go through calamine, with per-column types inferred from cell contents.

use crate::error::{PipelineError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Delimited text (`.csv`)
    Csv,
    /// Excel workbook (`.xlsx`, `.xls`)
    Spreadsheet,
}

impl InputFormat {
    /// Determine the format from a path's extension (case-insensitive).
    ///
    /// Fails with `UnsupportedFormat` without touching the file system.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" | "xls" => Ok(Self::Spreadsheet),
            _ => Err(PipelineError::UnsupportedFormat { extension }),
        }
    }
}

/// Loader for tabular input files.
pub struct TableLoader;

impl TableLoader {
    /// Read a tabular file into a DataFrame, preserving column order.
    pub fn load(path: &Path) -> Result<DataFrame> {
        let format = InputFormat::from_path(path)?;

        // Surface missing/permission problems as a plain IO error rather
        // than a reader-specific one.
        std::fs::metadata(path)?;

        info!("Loading {:?} as {:?}", path, format);
        let df = match format {
            InputFormat::Csv => Self::read_csv(path)?,
            InputFormat::Spreadsheet => Self::read_spreadsheet(path)?,
        };
        debug!("Loaded shape: {:?}", (df.height(), df.width()));

        Ok(df)
    }

    fn read_csv(path: &Path) -> Result<DataFrame> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?;
        Ok(df)
    }

    fn read_spreadsheet(path: &Path) -> Result<DataFrame> {
        let mut workbook =
            open_workbook_auto(path).map_err(|e| PipelineError::Io(std::io::Error::other(e)))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| PipelineError::InvalidDataset("workbook has no worksheets".into()))?
            .map_err(|e| PipelineError::Io(std::io::Error::other(e)))?;

        let mut rows = range.rows();
        let Some(header_row) = rows.next() else {
            return Ok(DataFrame::empty());
        };

        let names: Vec<String> = header_row
            .iter()
            .enumerate()
            .map(|(i, cell)| Self::header_name(cell, i))
            .collect();

        let body: Vec<&[Data]> = rows.collect();

        let columns: Vec<Column> = names
            .iter()
            .enumerate()
            .map(|(col_idx, name)| {
                let cells: Vec<&Data> = body.iter().map(|row| &row[col_idx]).collect();
                Self::build_column(name, &cells)
            })
            .collect();

        Ok(DataFrame::new(columns)?)
    }

    fn header_name(cell: &Data, index: usize) -> String {
        let text = match cell {
            Data::String(s) => s.trim().to_string(),
            Data::Empty => String::new(),
            other => format!("{}", other),
        };
        if text.is_empty() {
            format!("column_{}", index + 1)
        } else {
            text
        }
    }

    /// Build a typed Series from one column of cells.
    ///
    /// All present cells numeric -> Float64; all present cells boolean ->
    /// Boolean; anything else (including date cells) -> String.
    fn build_column(name: &str, cells: &[&Data]) -> Column {
        let mut present = 0usize;
        let mut numeric = 0usize;
        let mut boolean = 0usize;

        for cell in cells {
            match cell {
                Data::Empty | Data::Error(_) => {}
                Data::Float(_) | Data::Int(_) => {
                    present += 1;
                    numeric += 1;
                }
                Data::Bool(_) => {
                    present += 1;
                    boolean += 1;
                }
                _ => present += 1,
            }
        }

        if present > 0 && numeric == present {
            let values: Vec<Option<f64>> = cells
                .iter()
                .map(|cell| match cell {
                    Data::Float(f) => Some(*f),
                    Data::Int(i) => Some(*i as f64),
                    _ => None,
                })
                .collect();
            return Series::new(name.into(), values).into_column();
        }

        if present > 0 && boolean == present {
            let values: Vec<Option<bool>> = cells
                .iter()
                .map(|cell| match cell {
                    Data::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect();
            return Series::new(name.into(), values).into_column();
        }

        let values: Vec<Option<String>> = cells.iter().map(|cell| Self::cell_text(cell)).collect();
        Series::new(name.into(), values).into_column()
    }

    fn cell_text(cell: &Data) -> Option<String> {
        match cell {
            Data::Empty | Data::Error(_) => None,
            Data::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Data::Float(f) => Some(format!("{}", f)),
            Data::Int(i) => Some(format!("{}", i)),
            Data::Bool(b) => Some(format!("{}", b)),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(naive) => Some(naive.format("%Y-%m-%d %H:%M:%S").to_string()),
                None => Some(format!("{}", dt.as_f64())),
            },
            Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            InputFormat::from_path(Path::new("data.csv")).unwrap(),
            InputFormat::Csv
        );
        assert_eq!(
            InputFormat::from_path(Path::new("data.XLSX")).unwrap(),
            InputFormat::Spreadsheet
        );
        assert_eq!(
            InputFormat::from_path(Path::new("data.xls")).unwrap(),
            InputFormat::Spreadsheet
        );
    }

    #[test]
    fn test_format_rejects_unknown_extension() {
        let err = InputFormat::from_path(Path::new("data.txt")).unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");

        let err = InputFormat::from_path(Path::new("no_extension")).unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
    }

    #[test]
    fn test_format_strips_only_final_extension() {
        // Multi-dot names dispatch on the final extension only.
        assert_eq!(
            InputFormat::from_path(Path::new("backup.2024.csv")).unwrap(),
            InputFormat::Csv
        );
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let path = PathBuf::from("/definitely/not/here.csv");
        let err = TableLoader::load(&path).unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }

    #[test]
    fn test_header_name_fallback() {
        assert_eq!(TableLoader::header_name(&Data::Empty, 0), "column_1");
        assert_eq!(
            TableLoader::header_name(&Data::String("  price ".to_string()), 3),
            "price"
        );
    }

    #[test]
    fn test_build_column_numeric() {
        let cells = [
            Data::Float(1.5),
            Data::Int(2),
            Data::Empty,
            Data::Float(4.0),
        ];
        let refs: Vec<&Data> = cells.iter().collect();
        let column = TableLoader::build_column("x", &refs);
        assert_eq!(column.dtype(), &DataType::Float64);
        assert_eq!(column.len(), 4);
        assert_eq!(column.as_materialized_series().null_count(), 1);
    }

    #[test]
    fn test_build_column_mixed_falls_back_to_text() {
        let cells = [Data::Float(1.0), Data::String("abc".to_string())];
        let refs: Vec<&Data> = cells.iter().collect();
        let column = TableLoader::build_column("mixed", &refs);
        assert_eq!(column.dtype(), &DataType::String);
    }
}
