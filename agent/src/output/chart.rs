//! Utilization chart
//!
//! Plots both metrics against time as a scatter of the measured points with a
//! LOESS curve through each series, rendered to SVG.

use anyhow::{Context, Result};
use helicorder_shared::types::profile::{Record, UtilizationMetric};
use plotters::prelude::*;
use std::path::Path;
use tracing::info;

/// Fraction of the points used for each local fit
pub const LOESS_SPAN: f64 = 0.75;

/// Number of evaluation points along each smoothed curve
const SMOOTH_STEPS: usize = 100;

const CHART_SIZE: (u32, u32) = (1024, 640);

/// One metric's points and its smoothed curve
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub metric: UtilizationMetric,

    /// Measured (time, value) pairs in time order
    pub points: Vec<(f64, f64)>,

    pub smoothed: Vec<(f64, f64)>,
}

/// Locally weighted linear regression evaluated at `at`.
///
/// Each fit uses the nearest `ceil(span * n)` points weighted with the
/// tricube kernel. Returns `None` for an empty input.
pub fn loess(points: &[(f64, f64)], at: f64, span: f64) -> Option<f64> {
    if points.is_empty() {
        return None;
    }

    let n = points.len();
    let q = ((span * n as f64).ceil() as usize).clamp(1, n);

    let mut distances: Vec<f64> = points.iter().map(|&(x, _)| (x - at).abs()).collect();
    distances.sort_by(f64::total_cmp);
    let bandwidth = distances[q - 1];

    let mut weights: Vec<f64> = points
        .iter()
        .map(|&(x, _)| tricube((x - at).abs(), bandwidth))
        .collect();

    // Every neighbour sits exactly on the bandwidth edge
    if weights.iter().sum::<f64>() <= 0.0 {
        weights = points
            .iter()
            .map(|&(x, _)| if (x - at).abs() <= bandwidth { 1.0 } else { 0.0 })
            .collect();
    }

    let total: f64 = weights.iter().sum();
    let mean_x = weighted_sum(points, &weights, |x, _| x) / total;
    let mean_y = weighted_sum(points, &weights, |_, y| y) / total;

    let sxx = weighted_sum(points, &weights, |x, _| (x - mean_x).powi(2));
    let sxy = weighted_sum(points, &weights, |x, y| (x - mean_x) * (y - mean_y));

    if sxx <= f64::EPSILON * mean_x.abs().max(1.0) {
        return Some(mean_y);
    }

    Some(mean_y + sxy / sxx * (at - mean_x))
}

fn tricube(distance: f64, bandwidth: f64) -> f64 {
    if bandwidth <= 0.0 {
        return if distance == 0.0 { 1.0 } else { 0.0 };
    }
    let u = distance / bandwidth;
    if u >= 1.0 {
        0.0
    } else {
        (1.0 - u.powi(3)).powi(3)
    }
}

fn weighted_sum(points: &[(f64, f64)], weights: &[f64], f: impl Fn(f64, f64) -> f64) -> f64 {
    points
        .iter()
        .zip(weights)
        .map(|(&(x, y), &w)| w * f(x, y))
        .sum()
}

/// Split the record into one series per metric, dropping absent values
pub fn build_series(record: &Record) -> Vec<Series> {
    let observations = record.long_form();

    UtilizationMetric::ALL
        .iter()
        .filter_map(|&metric| {
            let points: Vec<(f64, f64)> = observations
                .iter()
                .filter(|o| o.metric == metric)
                .map(|o| (o.time_s, o.value))
                .collect();
            if points.is_empty() {
                return None;
            }
            let smoothed = smooth(&points);
            Some(Series {
                metric,
                points,
                smoothed,
            })
        })
        .collect()
}

fn smooth(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let (lo, hi) = time_bounds(points);
    if points.len() < 2 || hi <= lo {
        return points.to_vec();
    }

    let step = (hi - lo) / (SMOOTH_STEPS - 1) as f64;
    (0..SMOOTH_STEPS)
        .filter_map(|i| {
            let x = lo + step * i as f64;
            loess(points, x, LOESS_SPAN).map(|y| (x, y))
        })
        .collect()
}

fn time_bounds(points: &[(f64, f64)]) -> (f64, f64) {
    points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(x, _)| {
        (lo.min(x), hi.max(x))
    })
}

fn series_color(metric: UtilizationMetric) -> RGBColor {
    match metric {
        UtilizationMetric::Memory => RGBColor(0xf8, 0x76, 0x6d),
        UtilizationMetric::Sm => RGBColor(0x00, 0xbf, 0xc4),
    }
}

fn chart_error<E: std::fmt::Display>(err: E) -> anyhow::Error {
    anyhow::anyhow!("{}", err)
}

/// Render the chart to an SVG file.
///
/// Fails if the record holds no metric values at all.
pub fn render_chart(record: &Record, output_path: &Path) -> Result<()> {
    info!("Rendering utilization chart: {}", output_path.display());

    let series = build_series(record);
    if series.is_empty() {
        anyhow::bail!("No utilization values to plot");
    }

    let all_points: Vec<(f64, f64)> = series.iter().flat_map(|s| s.points.clone()).collect();
    let (mut x_lo, mut x_hi) = time_bounds(&all_points);
    if x_hi <= x_lo {
        let pad = x_lo.abs().max(1e-6) * 0.05;
        x_lo -= pad;
        x_hi += pad;
    }
    let y_hi = series
        .iter()
        .flat_map(|s| s.points.iter().chain(&s.smoothed))
        .map(|&(_, y)| y)
        .fold(100.0_f64, f64::max);
    let y_lo = series
        .iter()
        .flat_map(|s| s.smoothed.iter())
        .map(|&(_, y)| y)
        .fold(0.0_f64, f64::min);

    let root = SVGBackend::new(output_path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("GPU utilization", ("sans-serif", 24))
        .margin(16)
        .x_label_area_size(48)
        .y_label_area_size(56)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc("Utilization (%)")
        .draw()
        .map_err(chart_error)?;

    for s in &series {
        let color = series_color(s.metric);

        chart
            .draw_series(
                s.points
                    .iter()
                    .map(|&point| Circle::new(point, 3, color.filled())),
            )
            .map_err(chart_error)?;

        chart
            .draw_series(LineSeries::new(s.smoothed.iter().copied(), color.stroke_width(2)))
            .map_err(chart_error)?
            .label(s.metric.to_string())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(chart_error)?;

    root.present()
        .map_err(chart_error)
        .with_context(|| format!("Failed to write chart file: {}", output_path.display()))?;

    info!("Chart written to {}", output_path.display());

    Ok(())
}
