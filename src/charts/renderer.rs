//! Chart Renderer Module
//! Renders report charts to PNG files with plotters.
//!
//! Chart kinds:
//! 1. Trajectory: phase plot of a candidate solution, optional baseline overlay
//! 2. Convergence: log-log error curves against step size, optional roundoff floors
//! 3. Profile: surrogate input and response against sample index
//! 4. Difference: per-component solution differences against row index

use std::path::Path;

use ndarray::{Array1, Array2, Axis};
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use thiserror::Error;
use tracing::debug;

use crate::stats::{UNIT_ROUNDOFF_F32, UNIT_ROUNDOFF_F64};

const CHART_SIZE: (u32, u32) = (800, 600);

// cycled when a difference table has more components than colors
const COMPONENT_PALETTE: [RGBColor; 4] = [RED, BLUE, GREEN, MAGENTA];

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("failed to render chart: {0}")]
    Render(String),
}

type DrawResult = Result<(), Box<dyn std::error::Error>>;

fn solid(color: &RGBColor) -> ShapeStyle {
    ShapeStyle {
        color: color.mix(1.0),
        filled: false,
        stroke_width: 1,
    }
}

pub struct ChartRenderer;

impl ChartRenderer {
    /// Phase plot of the candidate solution, drawn solid blue. When a
    /// baseline table is supplied it is overlaid as a dashed red curve.
    pub fn trajectory_chart(
        path: &Path,
        candidate: &Array2<f64>,
        baseline: Option<&Array2<f64>>,
    ) -> Result<(), ChartError> {
        let points = Self::phase_points(candidate);
        let overlay = baseline.map(Self::phase_points).unwrap_or_default();
        let (x_desc, y_desc) = if candidate.ncols() >= 2 {
            ("component 0", "component 1")
        } else {
            ("step", "value")
        };

        Self::draw_trajectory(path, &points, &overlay, x_desc, y_desc)
            .map_err(|e| ChartError::Render(e.to_string()))?;
        debug!(path = %path.display(), "trajectory chart written");
        Ok(())
    }

    /// Log-log error curves against step size. Mixed precision is drawn
    /// as a dotted red curve with circle markers, full precision as a
    /// dotted blue curve. Points that cannot sit on a log axis are
    /// skipped; when none survive the chart still renders its frame.
    /// With `eps_lines` the f32 and f64 unit-roundoff floors are added
    /// as dashed horizontal lines.
    pub fn convergence_chart(
        path: &Path,
        dt: &[f64],
        mixed: &[f64],
        full: &[f64],
        eps_lines: bool,
    ) -> Result<(), ChartError> {
        Self::draw_convergence(path, dt, mixed, full, eps_lines)
            .map_err(|e| ChartError::Render(e.to_string()))?;
        debug!(path = %path.display(), "convergence chart written");
        Ok(())
    }

    /// Surrogate input and response, each against its own sample index.
    pub fn profile_chart(
        path: &Path,
        input: &Array1<f64>,
        output: &Array1<f64>,
    ) -> Result<(), ChartError> {
        let input_pts = Self::indexed_points(input);
        let output_pts = Self::indexed_points(output);
        Self::draw_profile(path, &input_pts, &output_pts)
            .map_err(|e| ChartError::Render(e.to_string()))?;
        debug!(path = %path.display(), "profile chart written");
        Ok(())
    }

    /// Pointwise differences between two solutions, one colored series
    /// per state component, drawn against row index.
    pub fn difference_chart(path: &Path, diff: &Array2<f64>) -> Result<(), ChartError> {
        Self::draw_differences(path, diff).map_err(|e| ChartError::Render(e.to_string()))?;
        debug!(path = %path.display(), "difference chart written");
        Ok(())
    }

    fn draw_trajectory(
        path: &Path,
        candidate: &[(f64, f64)],
        baseline: &[(f64, f64)],
        x_desc: &str,
        y_desc: &str,
    ) -> DrawResult {
        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let all = candidate.iter().chain(baseline.iter());
        let (x_lo, x_hi) = Self::padded_range(all.clone().map(|p| p.0));
        let (y_lo, y_hi) = Self::padded_range(all.map(|p| p.1));

        let mut chart = ChartBuilder::on(&root)
            .caption("Solution Trajectory", ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(55)
            .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

        chart.configure_mesh().x_desc(x_desc).y_desc(y_desc).draw()?;

        chart
            .draw_series(LineSeries::new(candidate.iter().copied(), &BLUE))?
            .label("candidate")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

        if !baseline.is_empty() {
            chart
                .draw_series(DashedLineSeries::new(
                    baseline.iter().copied(),
                    6,
                    4,
                    solid(&RED),
                ))?
                .label("baseline")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .border_style(BLACK)
                .background_style(WHITE.mix(0.8))
                .draw()?;
        }

        root.present()?;
        Ok(())
    }

    fn draw_convergence(
        path: &Path,
        dt: &[f64],
        mixed: &[f64],
        full: &[f64],
        eps_lines: bool,
    ) -> DrawResult {
        let mixed_pts = Self::log_points(dt, mixed);
        let full_pts = Self::log_points(dt, full);

        // the x axis spans the whole step series, not just surviving points
        let (x_lo, x_hi) = Self::log_range(dt.iter().copied())
            .ok_or("no positive step sizes to place on a log axis")?;

        let mut ys: Vec<f64> = mixed_pts
            .iter()
            .chain(full_pts.iter())
            .map(|p| p.1)
            .collect();
        if eps_lines {
            ys.push(UNIT_ROUNDOFF_F32);
            ys.push(UNIT_ROUNDOFF_F64);
        }
        let (y_lo, y_hi) = Self::error_axis_range(&ys);

        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("L2 Errors: Mixed vs. Full Precision", ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(45)
            .y_label_area_size(65)
            .build_cartesian_2d((x_lo..x_hi).log_scale(), (y_lo..y_hi).log_scale())?;

        chart
            .configure_mesh()
            .x_desc("\u{0394}t")
            .y_desc("L2 error")
            .draw()?;

        if !mixed_pts.is_empty() {
            chart
                .draw_series(DashedLineSeries::new(
                    mixed_pts.iter().copied(),
                    2,
                    4,
                    solid(&RED),
                ))?
                .label("mixed precision")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));
            chart.draw_series(
                mixed_pts
                    .iter()
                    .map(|(x, y)| Circle::new((*x, *y), 4, RED.filled())),
            )?;
        }

        if !full_pts.is_empty() {
            chart
                .draw_series(DashedLineSeries::new(
                    full_pts.iter().copied(),
                    2,
                    4,
                    solid(&BLUE),
                ))?
                .label("full precision")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));
        }

        if eps_lines {
            let f32_floor = [(x_lo, UNIT_ROUNDOFF_F32), (x_hi, UNIT_ROUNDOFF_F32)];
            chart
                .draw_series(DashedLineSeries::new(
                    f32_floor.iter().copied(),
                    8,
                    6,
                    solid(&RED),
                ))?
                .label("f32 unit roundoff")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

            let f64_floor = [(x_lo, UNIT_ROUNDOFF_F64), (x_hi, UNIT_ROUNDOFF_F64)];
            chart
                .draw_series(DashedLineSeries::new(
                    f64_floor.iter().copied(),
                    8,
                    6,
                    solid(&BLUE),
                ))?
                .label("f64 unit roundoff")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));
        }

        if !mixed_pts.is_empty() || !full_pts.is_empty() || eps_lines {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .border_style(BLACK)
                .background_style(WHITE.mix(0.8))
                .draw()?;
        }

        root.present()?;
        Ok(())
    }

    fn draw_profile(
        path: &Path,
        input: &[(f64, f64)],
        output: &[(f64, f64)],
    ) -> DrawResult {
        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let all = input.iter().chain(output.iter());
        let (x_lo, x_hi) = Self::padded_range(all.clone().map(|p| p.0));
        let (y_lo, y_hi) = Self::padded_range(all.map(|p| p.1));

        let mut chart = ChartBuilder::on(&root)
            .caption("Surrogate Response", ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(55)
            .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

        chart
            .configure_mesh()
            .x_desc("sample index")
            .y_desc("value")
            .draw()?;

        chart
            .draw_series(LineSeries::new(input.iter().copied(), &BLUE))?
            .label("input")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

        chart
            .draw_series(LineSeries::new(output.iter().copied(), &RED))?
            .label("response")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .border_style(BLACK)
            .background_style(WHITE.mix(0.8))
            .draw()?;

        root.present()?;
        Ok(())
    }

    fn draw_differences(path: &Path, diff: &Array2<f64>) -> DrawResult {
        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let (x_lo, x_hi) = Self::padded_range((0..diff.nrows()).map(|i| i as f64));
        let (y_lo, y_hi) = Self::padded_range(diff.iter().copied());

        let mut chart = ChartBuilder::on(&root)
            .caption("Pointwise Differences", ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(55)
            .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

        chart
            .configure_mesh()
            .x_desc("step")
            .y_desc("difference")
            .draw()?;

        for (j, column) in diff.columns().into_iter().enumerate() {
            let color = COMPONENT_PALETTE[j % COMPONENT_PALETTE.len()];
            chart
                .draw_series(LineSeries::new(
                    column.iter().enumerate().map(|(i, v)| (i as f64, *v)),
                    &color,
                ))?
                .label(format!("component {j}"))
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .border_style(BLACK)
            .background_style(WHITE.mix(0.8))
            .draw()?;

        root.present()?;
        Ok(())
    }

    /// First two columns as (x, y) pairs. Single-column tables fall back
    /// to value against row index.
    fn phase_points(table: &Array2<f64>) -> Vec<(f64, f64)> {
        if table.ncols() >= 2 {
            table
                .axis_iter(Axis(0))
                .map(|row| (row[0], row[1]))
                .collect()
        } else {
            table
                .column(0)
                .iter()
                .enumerate()
                .map(|(i, v)| (i as f64, *v))
                .collect()
        }
    }

    fn indexed_points(values: &Array1<f64>) -> Vec<(f64, f64)> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (i as f64, *v))
            .collect()
    }

    /// Axis range with 15% padding on each side. Degenerate inputs get a
    /// unit-wide window so the chart never collapses.
    fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in values {
            if v.is_finite() {
                min = min.min(v);
                max = max.max(v);
            }
        }
        if !min.is_finite() || !max.is_finite() {
            return (0.0, 1.0);
        }
        if min == max {
            return (min - 0.5, max + 0.5);
        }
        let pad = (max - min) * 0.15;
        (min - pad, max + pad)
    }

    /// Log-axis range spanning the positive finite values, padded by a
    /// factor of two on each side. None when nothing can be plotted.
    fn log_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
        let mut lo = f64::INFINITY;
        let mut hi = 0.0_f64;
        for v in values {
            if v > 0.0 && v.is_finite() {
                lo = lo.min(v);
                hi = hi.max(v);
            }
        }
        if !lo.is_finite() || hi <= 0.0 {
            return None;
        }
        Some((lo / 2.0, hi * 2.0))
    }

    /// Vertical span for the error axis. When no value survives the log
    /// filter (identical solutions leave only zero errors) the span falls
    /// back to f64 unit roundoff up to one.
    fn error_axis_range(ys: &[f64]) -> (f64, f64) {
        Self::log_range(ys.iter().copied()).unwrap_or((UNIT_ROUNDOFF_F64, 1.0))
    }

    /// Pair step sizes with error values, keeping only points a log-log
    /// chart can place.
    fn log_points(dt: &[f64], errors: &[f64]) -> Vec<(f64, f64)> {
        dt.iter()
            .zip(errors.iter())
            .filter(|(d, e)| **d > 0.0 && **e > 0.0 && d.is_finite() && e.is_finite())
            .map(|(d, e)| (*d, *e))
            .collect()
    }
}
