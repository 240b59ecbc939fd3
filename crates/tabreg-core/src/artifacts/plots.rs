//! Per-feature regression chart rendering (SVG).

use crate::error::{PipelineError, Result};
use crate::types::FittedModel;
use plotters::prelude::*;

/// Chart dimensions in pixels.
const CHART_SIZE: (u32, u32) = (800, 560);

/// One scatter-plus-fit page for a single feature.
///
/// Points are the observed (feature, target) pairs over the usable rows;
/// the overlay is the full multi-feature fitted value at each row, drawn
/// against this feature (sorted by feature value so the polyline reads as
/// a curve).
pub fn render_feature_page(
    feature: &str,
    target: &str,
    xs: &[f64],
    ys: &[f64],
    model: &FittedModel,
) -> Result<String> {
    debug_assert_eq!(xs.len(), ys.len());
    debug_assert_eq!(xs.len(), model.fitted.len());

    let (x_min, x_max) = padded_range(xs);
    let (y_min, y_max) = padded_range_pair(ys, &model.fitted);

    let mut fitted_line: Vec<(f64, f64)> = xs
        .iter()
        .zip(model.fitted.iter())
        .map(|(&x, &f)| (x, f))
        .collect();
    fitted_line.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("Regression for {}", feature),
                ("sans-serif", 24).into_font(),
            )
            .margin(16)
            .x_label_area_size(44)
            .y_label_area_size(56)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(render_error)?;

        chart
            .configure_mesh()
            .x_desc(feature)
            .y_desc(target)
            .draw()
            .map_err(render_error)?;

        chart
            .draw_series(
                xs.iter()
                    .zip(ys.iter())
                    .map(|(&x, &y)| Circle::new((x, y), 3, BLUE.filled())),
            )
            .map_err(render_error)?
            .label("Observed")
            .legend(|(x, y)| Circle::new((x + 10, y), 3, BLUE.filled()));

        chart
            .draw_series(LineSeries::new(fitted_line, RED.stroke_width(2)))
            .map_err(render_error)?
            .label("Fitted")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK)
            .draw()
            .map_err(render_error)?;

        root.present().map_err(render_error)?;
    }

    Ok(svg)
}

fn render_error<E: std::fmt::Display>(err: E) -> PipelineError {
    PipelineError::Io(std::io::Error::other(format!(
        "chart rendering failed: {}",
        err
    )))
}

fn padded_range(values: &[f64]) -> (f64, f64) {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    pad(min, max)
}

fn padded_range_pair(a: &[f64], b: &[f64]) -> (f64, f64) {
    let min = a
        .iter()
        .chain(b.iter())
        .cloned()
        .fold(f64::INFINITY, f64::min);
    let max = a
        .iter()
        .chain(b.iter())
        .cloned()
        .fold(f64::NEG_INFINITY, f64::max);
    pad(min, max)
}

fn pad(min: f64, max: f64) -> (f64, f64) {
    let span = max - min;
    let margin = if span > 0.0 { span * 0.05 } else { 0.5 };
    (min - margin, max + margin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CoefficientEstimate;

    fn model(fitted: Vec<f64>) -> FittedModel {
        let row_indices = (0..fitted.len()).collect();
        FittedModel {
            target: "y".to_string(),
            terms: vec![CoefficientEstimate {
                name: "intercept".to_string(),
                coefficient: 0.0,
                std_error: 0.0,
                t_value: 0.0,
                p_value: 1.0,
                ci_lower: 0.0,
                ci_upper: 0.0,
            }],
            r_squared: 0.0,
            adj_r_squared: 0.0,
            residual_std_error: 0.0,
            f_statistic: 0.0,
            f_pvalue: 1.0,
            n_observations: fitted.len(),
            fitted,
            row_indices,
        }
    }

    #[test]
    fn test_render_produces_svg_with_labels() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [2.0, 4.1, 5.9, 8.0];
        let svg =
            render_feature_page("speed", "distance", &xs, &ys, &model(vec![2.0, 4.0, 6.0, 8.0]))
                .unwrap();

        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
        assert!(svg.contains("speed"));
        assert!(svg.contains("distance"));
        assert!(svg.contains("Regression for speed"));
    }

    #[test]
    fn test_render_handles_constant_feature_range() {
        let xs = [2.0, 2.0, 2.0];
        let ys = [1.0, 2.0, 3.0];
        let svg = render_feature_page("x", "y", &xs, &ys, &model(vec![1.0, 2.0, 3.0])).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn test_padded_range() {
        assert_eq!(pad(0.0, 10.0), (-0.5, 10.5));
        let (lo, hi) = pad(3.0, 3.0);
        assert!(lo < 3.0 && hi > 3.0);
    }
}
