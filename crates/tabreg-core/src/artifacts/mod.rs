//! Artifact generation: deterministic naming and document writing.
//!
//! All three artifacts are named from the input file's stem (only the final
//! extension is stripped) and written into the output directory. Writes go
//! through a temporary sibling file and a rename, so a failure mid-write
//! never leaves a partial file at an advertised path.

mod html;
mod plots;

use crate::error::{PipelineError, Result};
use crate::types::{ColumnRoles, DatasetProfile, FittedModel};
use crate::utils::numeric_values;
use html::PlotPage;
use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Derive the artifact base name from an input path.
///
/// Only the final extension is stripped: `data.v2.csv` -> `data.v2`.
pub fn input_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string())
}

/// Writer for the three output documents of a pipeline run.
pub struct ArtifactWriter {
    output_dir: PathBuf,
    base_name: String,
}

impl ArtifactWriter {
    pub fn new(output_dir: &Path, base_name: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            base_name: base_name.into(),
        }
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Path of the profiling report document.
    pub fn report_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_report.html", self.base_name))
    }

    /// Path of the OLS summary document.
    pub fn summary_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_ols_summary.html", self.base_name))
    }

    /// Path of the regression plot document.
    pub fn plots_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_regression.html", self.base_name))
    }

    /// Render and write the OLS summary document.
    pub fn write_summary(&self, model: &FittedModel) -> Result<PathBuf> {
        let document = html::render_summary(&self.base_name, model)?;
        let path = self.summary_path();
        self.write_document(&path, &document)?;
        Ok(path)
    }

    /// Render and write the profiling report document.
    pub fn write_report(&self, profile: &DatasetProfile) -> Result<PathBuf> {
        let document = html::render_report(&self.base_name, profile)?;
        let path = self.report_path();
        self.write_document(&path, &document)?;
        Ok(path)
    }

    /// Render and write the regression plot document, one page per feature.
    ///
    /// `on_page` is invoked after each rendered page with (done, total) so
    /// the orchestrator can forward intra-stage progress.
    pub fn write_plots<F>(
        &self,
        df: &DataFrame,
        roles: &ColumnRoles,
        model: &FittedModel,
        mut on_page: F,
    ) -> Result<PathBuf>
    where
        F: FnMut(usize, usize),
    {
        let target_values = numeric_values(df.column(&roles.target)?.as_materialized_series())?;
        let ys: Vec<f64> = model
            .row_indices
            .iter()
            .map(|&i| target_values[i].expect("usable row"))
            .collect();

        let total = roles.features.len();
        let mut pages = Vec::with_capacity(total);
        for (idx, feature) in roles.features.iter().enumerate() {
            let feature_values = numeric_values(df.column(feature)?.as_materialized_series())?;
            let xs: Vec<f64> = model
                .row_indices
                .iter()
                .map(|&i| feature_values[i].expect("usable row"))
                .collect();

            let svg = plots::render_feature_page(feature, &roles.target, &xs, &ys, model)?;
            pages.push(PlotPage {
                index: idx + 1,
                feature: feature.clone(),
                svg,
            });
            on_page(idx + 1, total);
        }

        let document = html::render_plots(&self.base_name, &roles.target, pages)?;
        let path = self.plots_path();
        self.write_document(&path, &document)?;
        Ok(path)
    }

    /// Write a document atomically: temp sibling first, then rename over
    /// the final path (existing artifacts are overwritten).
    fn write_document(&self, path: &Path, content: &str) -> Result<()> {
        fs::create_dir_all(&self.output_dir).map_err(|source| PipelineError::WriteFailure {
            path: self.output_dir.clone(),
            source,
        })?;

        let tmp_path = path.with_extension("html.tmp");
        fs::write(&tmp_path, content).map_err(|source| PipelineError::WriteFailure {
            path: path.to_path_buf(),
            source,
        })?;
        fs::rename(&tmp_path, path).map_err(|source| {
            let _ = fs::remove_file(&tmp_path);
            PipelineError::WriteFailure {
                path: path.to_path_buf(),
                source,
            }
        })?;

        info!("Artifact written: {}", path.display());
        Ok(())
    }
}
