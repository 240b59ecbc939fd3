//! Ordinary least squares fitting and regression diagnostics.
//!
//! The design matrix is `[1 | features]`; the coefficient vector is solved
//! by SVD so tall, nearly-collinear systems are handled robustly. Inference
//! (standard errors, t/p-values, the F-test) follows the standard OLS
//! formulas, with p-values taken from the Student's t and Fisher-Snedecor
//! distributions.

use crate::error::{PipelineError, Result};
use crate::types::{CoefficientEstimate, ColumnRoles, FittedModel};
use crate::utils::numeric_values;
use nalgebra::{DMatrix, DVector};
use polars::prelude::*;
use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};
use tracing::{debug, info};

/// Relative singular-value cutoff below which the design matrix is
/// considered rank deficient.
const RANK_TOLERANCE: f64 = 1e-10;

/// Fits an OLS model over the numeric columns selected for a dataset.
pub struct RegressionEngine;

impl RegressionEngine {
    /// Fit target ~ intercept + features over the usable rows.
    ///
    /// A row is usable when every selected numeric value in it is present
    /// and finite. Fails with `EmptyInput` when the cleaned dataset has no
    /// rows at all, and with `SingularDesignMatrix` when fewer usable rows
    /// than parameters remain or the design matrix is rank deficient.
    pub fn fit(df: &DataFrame, roles: &ColumnRoles) -> Result<FittedModel> {
        if df.height() == 0 {
            return Err(PipelineError::EmptyInput);
        }

        let mut feature_values: Vec<Vec<Option<f64>>> = Vec::with_capacity(roles.features.len());
        for name in &roles.features {
            let series = df.column(name)?.as_materialized_series();
            feature_values.push(numeric_values(series)?);
        }
        let target_values = numeric_values(df.column(&roles.target)?.as_materialized_series())?;

        let row_indices: Vec<usize> = (0..df.height())
            .filter(|&i| {
                target_values[i].is_some_and(f64::is_finite)
                    && feature_values
                        .iter()
                        .all(|col| col[i].is_some_and(f64::is_finite))
            })
            .collect();

        let n = row_indices.len();
        let n_features = roles.features.len();
        let n_params = n_features + 1;

        if n <= n_params {
            return Err(PipelineError::SingularDesignMatrix(format!(
                "{} usable rows for {} parameters",
                n, n_params
            )));
        }

        debug!("Fitting OLS over {} rows, {} features", n, n_features);

        // Design matrix with an implicit intercept column of ones.
        let x = DMatrix::from_fn(n, n_params, |i, j| {
            if j == 0 {
                1.0
            } else {
                feature_values[j - 1][row_indices[i]].expect("usable row")
            }
        });
        let y = DVector::from_fn(n, |i, _| target_values[row_indices[i]].expect("usable row"));

        let beta = Self::solve_least_squares(&x, &y)?;

        let fitted_vec = &x * &beta;
        let residuals = &y - &fitted_vec;
        let sse: f64 = residuals.iter().map(|r| r * r).sum();
        let y_mean = y.iter().sum::<f64>() / n as f64;
        let sst: f64 = y.iter().map(|v| (v - y_mean).powi(2)).sum();

        let r_squared = if sst > 0.0 { 1.0 - sse / sst } else { 1.0 };
        let df_resid = (n - n_params) as f64;
        let adj_r_squared = 1.0 - (1.0 - r_squared) * ((n - 1) as f64) / df_resid;
        let sigma_squared = sse / df_resid;

        // Covariance of the estimates: sigma^2 (X'X)^-1.
        let xtx = x.transpose() * &x;
        let xtx_inv = xtx.try_inverse().ok_or_else(|| {
            PipelineError::SingularDesignMatrix("X'X is not invertible".to_string())
        })?;

        let t_dist = StudentsT::new(0.0, 1.0, df_resid).map_err(|e| {
            PipelineError::SingularDesignMatrix(format!("degenerate residual df: {}", e))
        })?;
        let t_crit = t_dist.inverse_cdf(0.975);

        let mut terms = Vec::with_capacity(n_params);
        for j in 0..n_params {
            let name = if j == 0 {
                "intercept".to_string()
            } else {
                roles.features[j - 1].clone()
            };
            let coefficient = beta[j];
            let variance = (xtx_inv[(j, j)] * sigma_squared).max(0.0);
            let std_error = variance.sqrt();
            let t_value = if std_error > 0.0 {
                coefficient / std_error
            } else {
                f64::INFINITY
            };
            let p_value = if t_value.is_finite() {
                2.0 * (1.0 - t_dist.cdf(t_value.abs()))
            } else {
                0.0
            };
            terms.push(CoefficientEstimate {
                name,
                coefficient,
                std_error,
                t_value,
                p_value,
                ci_lower: coefficient - t_crit * std_error,
                ci_upper: coefficient + t_crit * std_error,
            });
        }

        let (f_statistic, f_pvalue) = if n_features > 0 && sse > 0.0 {
            let f = ((sst - sse) / n_features as f64) / (sse / df_resid);
            let p = FisherSnedecor::new(n_features as f64, df_resid)
                .map(|dist| 1.0 - dist.cdf(f))
                .unwrap_or(f64::NAN);
            (f, p)
        } else {
            (f64::INFINITY, 0.0)
        };

        info!(
            "OLS fit complete: R^2 = {:.4}, {} observations",
            r_squared, n
        );

        Ok(FittedModel {
            target: roles.target.clone(),
            terms,
            r_squared,
            adj_r_squared,
            residual_std_error: sigma_squared.sqrt(),
            f_statistic,
            f_pvalue,
            n_observations: n,
            fitted: fitted_vec.iter().copied().collect(),
            row_indices,
        })
    }

    /// Solve the least-squares problem via SVD, rejecting rank-deficient
    /// systems.
    fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<DVector<f64>> {
        let svd = x.clone().svd(true, true);

        let max_sv = svd
            .singular_values
            .iter()
            .cloned()
            .fold(0.0_f64, f64::max);
        let rank = svd
            .singular_values
            .iter()
            .filter(|&&sv| sv > RANK_TOLERANCE * max_sv)
            .count();
        if max_sv == 0.0 || rank < x.ncols() {
            return Err(PipelineError::SingularDesignMatrix(format!(
                "rank {} for {} columns",
                rank,
                x.ncols()
            )));
        }

        let beta = svd.solve(y, RANK_TOLERANCE).map_err(|reason| {
            PipelineError::SingularDesignMatrix(format!("SVD solve failed: {}", reason))
        })?;

        if beta.iter().any(|v| !v.is_finite()) {
            return Err(PipelineError::SingularDesignMatrix(
                "non-finite coefficients".to_string(),
            ));
        }

        Ok(beta)
    }
}

// ============================================================================
// Textual summary rendering
// ============================================================================

impl FittedModel {
    /// Render the model as a fixed-width summary table in the style of
    /// standard OLS reports.
    pub fn summary_text(&self) -> String {
        let name_width = self
            .terms
            .iter()
            .map(|t| t.name.len())
            .max()
            .unwrap_or(9)
            .max(9)
            + 2;
        let table_width = name_width + 10 + 11 + 11 + 11 + 12 + 12;
        let rule = "=".repeat(table_width);
        let thin_rule = "-".repeat(table_width);

        let mut out = String::new();
        let title = "OLS Regression Results";
        out.push_str(&format!("{:^width$}\n", title, width = table_width));
        out.push_str(&rule);
        out.push('\n');

        let left = [
            format!("Dep. Variable: {}", self.target),
            "Model: OLS".to_string(),
            format!("No. Observations: {}", self.n_observations),
            format!(
                "Df Residuals: {}",
                self.n_observations.saturating_sub(self.terms.len())
            ),
            format!("Df Model: {}", self.terms.len().saturating_sub(1)),
        ];
        let right = [
            format!("R-squared: {:.4}", self.r_squared),
            format!("Adj. R-squared: {:.4}", self.adj_r_squared),
            format!("F-statistic: {}", format_stat(self.f_statistic)),
            format!("Prob (F-statistic): {}", format_pvalue(self.f_pvalue)),
            format!("Residual Std. Error: {:.4}", self.residual_std_error),
        ];
        let half = table_width / 2;
        for (l, r) in left.iter().zip(right.iter()) {
            out.push_str(&format!(
                "{:<lw$}{:>rw$}\n",
                l,
                r,
                lw = half,
                rw = table_width - half
            ));
        }

        out.push_str(&rule);
        out.push('\n');
        out.push_str(&format!(
            "{:<nw$}{:>10}{:>11}{:>11}{:>11}{:>12}{:>12}\n",
            "",
            "coef",
            "std err",
            "t",
            "P>|t|",
            "[0.025",
            "0.975]",
            nw = name_width
        ));
        out.push_str(&thin_rule);
        out.push('\n');

        for term in &self.terms {
            out.push_str(&format!(
                "{:<nw$}{:>10.4}{:>11.4}{:>11.3}{:>11.3}{:>12.4}{:>12.4}\n",
                term.name,
                term.coefficient,
                term.std_error,
                term.t_value,
                term.p_value,
                term.ci_lower,
                term.ci_upper,
                nw = name_width
            ));
        }

        out.push_str(&rule);
        out.push('\n');
        out
    }
}

fn format_stat(value: f64) -> String {
    if !value.is_finite() {
        "inf".to_string()
    } else if value.abs() >= 1e5 {
        format!("{:.3e}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn format_pvalue(value: f64) -> String {
    if !value.is_finite() {
        "nan".to_string()
    } else if value != 0.0 && value < 1e-3 {
        format!("{:.2e}", value)
    } else {
        format!("{:.3}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(features: &[&str], target: &str) -> ColumnRoles {
        ColumnRoles {
            features: features.iter().map(|s| s.to_string()).collect(),
            target: target.to_string(),
        }
    }

    fn frame(columns: Vec<(&str, Vec<Option<f64>>)>) -> DataFrame {
        let cols = columns
            .into_iter()
            .map(|(name, values)| Series::new(name.into(), values).into_column())
            .collect();
        DataFrame::new(cols).unwrap()
    }

    #[test]
    fn test_recovers_known_line() {
        // y = 1 + 2x with small noise-free data
        let x: Vec<Option<f64>> = (1..=10).map(|v| Some(v as f64)).collect();
        let y: Vec<Option<f64>> = (1..=10).map(|v| Some(1.0 + 2.0 * v as f64)).collect();
        let df = frame(vec![("x", x), ("y", y)]);

        let model = RegressionEngine::fit(&df, &roles(&["x"], "y")).unwrap();

        assert_eq!(model.terms.len(), 2);
        assert!((model.terms[0].coefficient - 1.0).abs() < 1e-8);
        assert!((model.terms[1].coefficient - 2.0).abs() < 1e-8);
        assert!(model.r_squared > 0.999_999);
        assert_eq!(model.fitted.len(), 10);
        assert!(model.fitted.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_two_features_shapes() {
        let x1: Vec<Option<f64>> = (0..20).map(|v| Some(v as f64)).collect();
        let x2: Vec<Option<f64>> = (0..20).map(|v| Some((v * v) as f64)).collect();
        let y: Vec<Option<f64>> = (0..20)
            .map(|v| Some(3.0 + 0.5 * v as f64 - 0.25 * (v * v) as f64))
            .collect();
        let df = frame(vec![("x1", x1), ("x2", x2), ("y", y)]);

        let model = RegressionEngine::fit(&df, &roles(&["x1", "x2"], "y")).unwrap();

        // n features + intercept coefficients, one fitted value per row
        assert_eq!(model.terms.len(), 3);
        assert_eq!(model.fitted.len(), 20);
        assert!((model.terms[0].coefficient - 3.0).abs() < 1e-6);
        assert!((model.terms[1].coefficient - 0.5).abs() < 1e-6);
        assert!((model.terms[2].coefficient + 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_significant_slope_has_small_p_value() {
        let x: Vec<Option<f64>> = (1..=10).map(|v| Some(v as f64)).collect();
        let y: Vec<Option<f64>> = vec![
            Some(2.1),
            Some(4.0),
            Some(5.9),
            Some(8.1),
            Some(10.0),
            Some(11.9),
            Some(14.1),
            Some(16.0),
            Some(17.9),
            Some(20.1),
        ];
        let df = frame(vec![("x", x), ("y", y)]);

        let model = RegressionEngine::fit(&df, &roles(&["x"], "y")).unwrap();
        let slope = &model.terms[1];

        assert!(slope.p_value < 0.05);
        assert!(slope.ci_lower < slope.coefficient && slope.coefficient < slope.ci_upper);
        assert!(model.f_pvalue < 0.05);
    }

    #[test]
    fn test_duplicate_feature_is_singular() {
        let x: Vec<Option<f64>> = (1..=10).map(|v| Some(v as f64)).collect();
        let df = frame(vec![("a", x.clone()), ("b", x.clone()), ("y", x)]);

        let err = RegressionEngine::fit(&df, &roles(&["a", "b"], "y")).unwrap_err();
        assert_eq!(err.error_code(), "SINGULAR_DESIGN_MATRIX");
    }

    #[test]
    fn test_empty_frame_is_empty_input() {
        let df = frame(vec![("x", vec![]), ("y", vec![])]);
        let err = RegressionEngine::fit(&df, &roles(&["x"], "y")).unwrap_err();
        assert_eq!(err.error_code(), "EMPTY_INPUT");
    }

    #[test]
    fn test_too_few_usable_rows_is_singular() {
        let df = frame(vec![
            ("x", vec![Some(1.0), Some(2.0), None]),
            ("y", vec![Some(1.0), None, Some(3.0)]),
        ]);
        let err = RegressionEngine::fit(&df, &roles(&["x"], "y")).unwrap_err();
        assert_eq!(err.error_code(), "SINGULAR_DESIGN_MATRIX");
    }

    #[test]
    fn test_rows_with_missing_cells_are_excluded() {
        let mut x: Vec<Option<f64>> = (1..=10).map(|v| Some(v as f64)).collect();
        let mut y: Vec<Option<f64>> = (1..=10).map(|v| Some(2.0 * v as f64)).collect();
        x[3] = None;
        y[7] = None;
        let df = frame(vec![("x", x), ("y", y)]);

        let model = RegressionEngine::fit(&df, &roles(&["x"], "y")).unwrap();
        assert_eq!(model.n_observations, 8);
        assert_eq!(model.fitted.len(), 8);
        assert!(!model.row_indices.contains(&3));
        assert!(!model.row_indices.contains(&7));
    }

    #[test]
    fn test_summary_text_contains_terms_and_stats() {
        let x: Vec<Option<f64>> = (1..=10).map(|v| Some(v as f64)).collect();
        let y: Vec<Option<f64>> = (1..=10).map(|v| Some(1.0 + 2.0 * v as f64)).collect();
        let df = frame(vec![("x", x), ("y", y)]);

        let model = RegressionEngine::fit(&df, &roles(&["x"], "y")).unwrap();
        let text = model.summary_text();

        assert!(text.contains("OLS Regression Results"));
        assert!(text.contains("intercept"));
        assert!(text.contains("x"));
        assert!(text.contains("R-squared"));
        assert!(text.contains("F-statistic"));
    }

    #[test]
    fn test_predict_matches_fitted() {
        let x: Vec<Option<f64>> = (1..=12).map(|v| Some(v as f64 * 1.5)).collect();
        let y: Vec<Option<f64>> = (1..=12).map(|v| Some(4.0 - 0.5 * (v as f64 * 1.5))).collect();
        let df = frame(vec![("x", x.clone()), ("y", y)]);

        let model = RegressionEngine::fit(&df, &roles(&["x"], "y")).unwrap();
        for (pos, &row) in model.row_indices.iter().enumerate() {
            let predicted = model.predict(&[x[row].unwrap()]);
            assert!((predicted - model.fitted[pos]).abs() < 1e-8);
        }
    }
}
