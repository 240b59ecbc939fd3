//! HTML document rendering for the three output artifacts.
//!
//! All documents are self-contained (inline CSS, inline SVG) and contain no
//! run-varying content such as timestamps, so identical inputs produce
//! byte-identical documents.

use crate::error::{PipelineError, Result};
use crate::types::{DatasetProfile, FittedModel};
use handlebars::Handlebars;
use serde::Serialize;

const BASE_CSS: &str = r#"
body { font-family: -apple-system, "Segoe UI", Roboto, sans-serif; margin: 0;
       background: #f4f5f7; color: #1f2430; }
main { max-width: 960px; margin: 0 auto; padding: 24px; }
h1 { font-size: 1.6rem; margin-bottom: 4px; }
h2 { font-size: 1.2rem; border-bottom: 2px solid #d6dae1; padding-bottom: 4px; }
.page { background: #fff; border: 1px solid #d6dae1; border-radius: 8px;
        padding: 20px; margin-bottom: 24px; }
table { border-collapse: collapse; width: 100%; margin: 8px 0; }
th, td { border: 1px solid #d6dae1; padding: 6px 10px; text-align: right;
         font-size: 0.9rem; }
th { background: #eef0f4; }
td.name, th.name { text-align: left; }
pre.summary { font-family: "SF Mono", Consolas, monospace; font-size: 0.85rem;
              overflow-x: auto; background: #f8f9fb; padding: 12px;
              border: 1px solid #d6dae1; border-radius: 6px; }
.bar { background: #4878d0; height: 12px; display: inline-block; }
.bar-row { display: flex; align-items: center; gap: 8px; font-size: 0.8rem; }
.bar-label { width: 180px; text-align: right; color: #5a6372;
             font-variant-numeric: tabular-nums; }
.muted { color: #5a6372; font-size: 0.85rem; }
.badge { display: inline-block; background: #eef0f4; border-radius: 10px;
         padding: 2px 10px; font-size: 0.8rem; margin-right: 6px; }
figure { margin: 0; text-align: center; }
"#;

const REPORT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{title}}</title>
<style>{{{css}}}</style>
</head>
<body>
<main>
<div class="page">
  <h1>{{title}}</h1>
  <p class="muted">Automated profiling report</p>
  <span class="badge">{{rows}} rows</span>
  <span class="badge">{{columns}} columns</span>
  <span class="badge">{{missing_cells}} missing cells ({{missing_percentage}}%)</span>
</div>
{{#each column_sections}}
<div class="page">
  <h2>{{name}}</h2>
  <p class="muted">{{inferred_type}} &middot; dtype {{dtype}} &middot;
     {{distinct_count}} distinct &middot; {{missing_count}} missing
     ({{missing_percentage}}%)</p>
{{#if numeric}}
  <table>
    <tr><th>min</th><th>q1</th><th>median</th><th>mean</th><th>q3</th>
        <th>max</th><th>std dev</th></tr>
    <tr><td>{{numeric.min}}</td><td>{{numeric.q1}}</td>
        <td>{{numeric.median}}</td><td>{{numeric.mean}}</td>
        <td>{{numeric.q3}}</td><td>{{numeric.max}}</td>
        <td>{{numeric.std_dev}}</td></tr>
  </table>
  {{#each numeric.histogram}}
  <div class="bar-row"><span class="bar-label">{{label}}</span>
    <span class="bar" style="width: {{width_percentage}}%"></span>
    <span>{{count}}</span></div>
  {{/each}}
{{/if}}
{{#if categorical}}
  <p class="muted">{{categorical.cardinality}} distinct values; most frequent:</p>
  <table>
    <tr><th class="name">value</th><th>count</th><th>share</th></tr>
    {{#each categorical.top_values}}
    <tr><td class="name">{{value}}</td><td>{{count}}</td>
        <td>{{percentage}}%</td></tr>
    {{/each}}
  </table>
{{/if}}
</div>
{{/each}}
{{#if correlation}}
<div class="page">
  <h2>Pearson correlation (numeric columns)</h2>
  <table>
    <tr><th class="name"></th>
    {{#each correlation.columns}}<th>{{this}}</th>{{/each}}</tr>
    {{#each correlation.rows}}
    <tr><td class="name">{{name}}</td>
    {{#each cells}}<td>{{this}}</td>{{/each}}</tr>
    {{/each}}
  </table>
</div>
{{/if}}
</main>
</body>
</html>
"#;

const SUMMARY_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{title}}</title>
<style>{{{css}}}</style>
</head>
<body>
<main>
<div class="page">
  <h1>{{title}}</h1>
  <p class="muted">Ordinary least squares &middot; target: {{target}}</p>
  <span class="badge">R&sup2; {{r_squared}}</span>
  <span class="badge">adj. R&sup2; {{adj_r_squared}}</span>
  <span class="badge">F {{f_statistic}} (p {{f_pvalue}})</span>
  <span class="badge">{{n_observations}} observations</span>
  <pre class="summary">{{summary_text}}</pre>
</div>
</main>
</body>
</html>
"#;

const PLOTS_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{title}}</title>
<style>{{{css}}}</style>
</head>
<body>
<main>
<div class="page">
  <h1>{{title}}</h1>
  <p class="muted">One page per feature, in feature order &middot;
     target: {{target}}</p>
</div>
{{#each pages}}
<div class="page">
  <h2>{{index}}. {{feature}}</h2>
  <figure>{{{svg}}}</figure>
</div>
{{/each}}
</main>
</body>
</html>
"#;

// ============================================================================
// Template contexts (numbers pre-formatted for stable rendering)
// ============================================================================

#[derive(Serialize)]
struct ReportContext {
    title: String,
    css: &'static str,
    rows: usize,
    columns: usize,
    missing_cells: usize,
    missing_percentage: String,
    column_sections: Vec<ColumnSection>,
    correlation: Option<CorrelationSection>,
}

#[derive(Serialize)]
struct ColumnSection {
    name: String,
    dtype: String,
    inferred_type: String,
    distinct_count: usize,
    missing_count: usize,
    missing_percentage: String,
    numeric: Option<NumericSection>,
    categorical: Option<CategoricalSection>,
}

#[derive(Serialize)]
struct NumericSection {
    min: String,
    q1: String,
    median: String,
    mean: String,
    q3: String,
    max: String,
    std_dev: String,
    histogram: Vec<HistogramBar>,
}

#[derive(Serialize)]
struct HistogramBar {
    label: String,
    count: usize,
    width_percentage: String,
}

#[derive(Serialize)]
struct CategoricalSection {
    cardinality: usize,
    top_values: Vec<TopValue>,
}

#[derive(Serialize)]
struct TopValue {
    value: String,
    count: usize,
    percentage: String,
}

#[derive(Serialize)]
struct CorrelationSection {
    columns: Vec<String>,
    rows: Vec<CorrelationRow>,
}

#[derive(Serialize)]
struct CorrelationRow {
    name: String,
    cells: Vec<String>,
}

#[derive(Serialize)]
struct SummaryContext {
    title: String,
    css: &'static str,
    target: String,
    r_squared: String,
    adj_r_squared: String,
    f_statistic: String,
    f_pvalue: String,
    n_observations: usize,
    summary_text: String,
}

#[derive(Serialize)]
struct PlotsContext {
    title: String,
    css: &'static str,
    target: String,
    pages: Vec<PlotPage>,
}

#[derive(Serialize)]
pub(crate) struct PlotPage {
    pub index: usize,
    pub feature: String,
    pub svg: String,
}

// ============================================================================
// Rendering
// ============================================================================

fn engine() -> Result<Handlebars<'static>> {
    let mut handlebars = Handlebars::new();
    handlebars
        .register_template_string("report", REPORT_TEMPLATE)
        .map_err(template_error)?;
    handlebars
        .register_template_string("summary", SUMMARY_TEMPLATE)
        .map_err(template_error)?;
    handlebars
        .register_template_string("plots", PLOTS_TEMPLATE)
        .map_err(template_error)?;
    Ok(handlebars)
}

fn template_error<E: std::fmt::Display>(err: E) -> PipelineError {
    PipelineError::Io(std::io::Error::other(format!(
        "template rendering failed: {}",
        err
    )))
}

fn fmt(value: f64) -> String {
    if !value.is_finite() {
        return format!("{}", value);
    }
    if value != 0.0 && value.abs() < 1e-3 {
        format!("{:.3e}", value)
    } else {
        format!("{:.3}", value)
    }
}

/// Render the profiling report document.
pub fn render_report(base_name: &str, profile: &DatasetProfile) -> Result<String> {
    let column_sections = profile
        .column_profiles
        .iter()
        .map(|col| {
            let numeric = col.numeric.as_ref().map(|n| {
                let max_count = n.histogram.iter().map(|b| b.count).max().unwrap_or(1).max(1);
                NumericSection {
                    min: fmt(n.min),
                    q1: fmt(n.q1),
                    median: fmt(n.median),
                    mean: fmt(n.mean),
                    q3: fmt(n.q3),
                    max: fmt(n.max),
                    std_dev: fmt(n.std_dev),
                    histogram: n
                        .histogram
                        .iter()
                        .map(|bin| HistogramBar {
                            label: format!("{} - {}", fmt(bin.start), fmt(bin.end)),
                            count: bin.count,
                            width_percentage: format!(
                                "{:.1}",
                                (bin.count as f64 / max_count as f64) * 100.0
                            ),
                        })
                        .collect(),
                }
            });
            let categorical = col.categorical.as_ref().map(|c| CategoricalSection {
                cardinality: c.cardinality,
                top_values: c
                    .top_values
                    .iter()
                    .map(|t| TopValue {
                        value: t.value.clone(),
                        count: t.count,
                        percentage: format!("{:.1}", t.percentage),
                    })
                    .collect(),
            });

            ColumnSection {
                name: col.name.clone(),
                dtype: col.dtype.clone(),
                inferred_type: col.inferred_type.clone(),
                distinct_count: col.distinct_count,
                missing_count: col.missing_count,
                missing_percentage: format!("{:.1}", col.missing_percentage),
                numeric,
                categorical,
            }
        })
        .collect();

    let correlation = profile.correlations.as_ref().map(|corr| CorrelationSection {
        columns: corr.columns.clone(),
        rows: corr
            .columns
            .iter()
            .zip(corr.values.iter())
            .map(|(name, row)| CorrelationRow {
                name: name.clone(),
                cells: row.iter().map(|v| format!("{:.3}", v)).collect(),
            })
            .collect(),
    });

    let context = ReportContext {
        title: format!("Data Report: {}", base_name),
        css: BASE_CSS,
        rows: profile.shape.0,
        columns: profile.shape.1,
        missing_cells: profile.total_missing_cells,
        missing_percentage: format!("{:.1}", profile.total_missing_percentage),
        column_sections,
        correlation,
    };

    engine()?.render("report", &context).map_err(template_error)
}

/// Render the OLS summary document.
pub fn render_summary(base_name: &str, model: &FittedModel) -> Result<String> {
    let context = SummaryContext {
        title: format!("OLS Summary: {}", base_name),
        css: BASE_CSS,
        target: model.target.clone(),
        r_squared: fmt(model.r_squared),
        adj_r_squared: fmt(model.adj_r_squared),
        f_statistic: fmt(model.f_statistic),
        f_pvalue: fmt(model.f_pvalue),
        n_observations: model.n_observations,
        summary_text: model.summary_text(),
    };

    engine()?.render("summary", &context).map_err(template_error)
}

/// Render the multi-page regression plot document.
pub fn render_plots(base_name: &str, target: &str, pages: Vec<PlotPage>) -> Result<String> {
    let context = PlotsContext {
        title: format!("Regression Plots: {}", base_name),
        css: BASE_CSS,
        target: target.to_string(),
        pages,
    };

    engine()?.render("plots", &context).map_err(template_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColumnProfile, NumericSummary};

    fn minimal_profile() -> DatasetProfile {
        DatasetProfile {
            shape: (3, 1),
            column_profiles: vec![ColumnProfile {
                name: "x".to_string(),
                dtype: "Float64".to_string(),
                inferred_type: "numeric".to_string(),
                missing_count: 0,
                missing_percentage: 0.0,
                distinct_count: 3,
                sample_values: vec!["1.0".to_string()],
                numeric: Some(NumericSummary {
                    min: 1.0,
                    max: 3.0,
                    mean: 2.0,
                    std_dev: 1.0,
                    q1: 1.5,
                    median: 2.0,
                    q3: 2.5,
                    histogram: vec![],
                }),
                categorical: None,
            }],
            total_missing_cells: 0,
            total_missing_percentage: 0.0,
            correlations: None,
        }
    }

    #[test]
    fn test_report_is_self_contained_html() {
        let html = render_report("demo", &minimal_profile()).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<style>"));
        assert!(html.contains("Data Report: demo"));
        assert!(html.contains("numeric"));
        assert!(!html.contains("http://"));
        assert!(!html.contains("https://"));
    }

    #[test]
    fn test_report_is_deterministic() {
        let profile = minimal_profile();
        let first = render_report("demo", &profile).unwrap();
        let second = render_report("demo", &profile).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_plots_document_has_one_section_per_page() {
        let pages = vec![
            PlotPage {
                index: 1,
                feature: "alpha".to_string(),
                svg: "<svg>1</svg>".to_string(),
            },
            PlotPage {
                index: 2,
                feature: "beta".to_string(),
                svg: "<svg>2</svg>".to_string(),
            },
        ];
        let html = render_plots("demo", "y", pages).unwrap();

        assert_eq!(html.matches("<figure>").count(), 2);
        assert!(html.contains("1. alpha"));
        assert!(html.contains("2. beta"));
        // SVG must be inlined unescaped
        assert!(html.contains("<svg>1</svg>"));
    }

    #[test]
    fn test_fmt_small_values_use_scientific() {
        assert_eq!(fmt(0.0000001), "1.000e-7");
        assert_eq!(fmt(1.5), "1.500");
        assert_eq!(fmt(0.0), "0.000");
    }
}
