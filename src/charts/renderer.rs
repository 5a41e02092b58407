//! Static Chart Renderer
//! Renders prepared chart data to a PNG image with plotters, for saving the
//! current chart to disk.

use super::data::{BoxSummary, ChartData, HistogramData, PieData, XYSeries};
use super::plotter::PALETTE;
use image::{ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::error::Error;
use std::io::Cursor;
use thiserror::Error;

const SERIES: RGBColor = RGBColor(52, 152, 219);
const FONT: &str = "sans-serif";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to draw chart: {0}")]
    Draw(String),
    #[error("Failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),
    #[error("Image buffer size mismatch")]
    Buffer,
    #[error("Image size {width}x{height} is too large")]
    Size { width: u32, height: u32 },
}

type DrawResult = Result<(), Box<dyn Error>>;

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render the chart at `width`×`height` and return PNG bytes.
    pub fn render_png(chart: &ChartData, width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
        let mut buffer = vec![0u8; Self::buffer_len(width, height)?];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            Self::draw(&root, chart).map_err(|e| RenderError::Draw(e.to_string()))?;
        }

        let img = RgbImage::from_raw(width, height, buffer).ok_or(RenderError::Buffer)?;
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    /// Bytes of an RGB buffer, computed without wrapping.
    fn buffer_len(width: u32, height: u32) -> Result<usize, RenderError> {
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|px| px.checked_mul(3))
            .ok_or(RenderError::Size { width, height })
    }

    fn draw(root: &DrawingArea<BitMapBackend, Shift>, chart: &ChartData) -> DrawResult {
        root.fill(&WHITE)?;
        let title = chart.kind().label();
        match chart {
            ChartData::Line(series) => Self::draw_xy(root, title, series, XyStyle::Line)?,
            ChartData::Bar(series) => Self::draw_xy(root, title, series, XyStyle::Bar)?,
            ChartData::Area(series) => Self::draw_xy(root, title, series, XyStyle::Area)?,
            ChartData::Scatter(series) => Self::draw_xy(root, title, series, XyStyle::Scatter)?,
            ChartData::Histogram(hist) => Self::draw_histogram(root, title, hist)?,
            ChartData::BoxPlot(summary) => Self::draw_box(root, title, summary)?,
            ChartData::Pie(pie) => Self::draw_pie(root, title, pie)?,
        }
        root.present()?;
        Ok(())
    }

    fn draw_xy(
        root: &DrawingArea<BitMapBackend, Shift>,
        title: &str,
        series: &XYSeries,
        style: XyStyle,
    ) -> DrawResult {
        // Ticks count too: an area label may sit on a row without a point
        let xs = series.points.iter().map(|p| p[0]).chain(series.ticks.iter().map(|t| t.0));
        let (x_min, x_max) = Self::axis_range(xs, false);
        let floor_at_zero = matches!(style, XyStyle::Bar | XyStyle::Area);
        let (y_min, y_max) = Self::axis_range(series.points.iter().map(|p| p[1]), floor_at_zero);

        let has_ticks = !series.ticks.is_empty();
        // Area labels are turned a quarter so every row fits
        let rotated = matches!(style, XyStyle::Area);
        let x_label_area = if rotated { 110 } else { 50 };

        let mut chart = ChartBuilder::on(root)
            .caption(title, (FONT, 22))
            .margin(15)
            .x_label_area_size(x_label_area)
            .y_label_area_size(60)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

        let hide_x = |_: &f64| String::new();
        let mut mesh = chart.configure_mesh();
        mesh.x_desc(series.x_label.as_str())
            .y_desc(series.y_label.as_str())
            .y_labels(10);
        if has_ticks {
            mesh.x_label_formatter(&hide_x);
        }
        mesh.draw()?;

        match style {
            XyStyle::Line => {
                chart.draw_series(LineSeries::new(
                    series.points.iter().map(|p| (p[0], p[1])),
                    SERIES.stroke_width(2),
                ))?;
            }
            XyStyle::Bar => {
                let half = Self::bar_half_width(&series.points);
                chart.draw_series(series.points.iter().map(|p| {
                    Rectangle::new([(p[0] - half, 0.0), (p[0] + half, p[1])], SERIES.filled())
                }))?;
            }
            XyStyle::Area => {
                let points = series.points.iter().map(|p| (p[0], p[1]));
                chart.draw_series(
                    AreaSeries::new(points, 0.0, SERIES.mix(0.5)).border_style(SERIES),
                )?;
            }
            XyStyle::Scatter => {
                chart.draw_series(
                    series
                        .points
                        .iter()
                        .map(|p| Circle::new((p[0], p[1]), 3, SERIES.mix(0.8).filled())),
                )?;
            }
        }

        if has_ticks {
            let transform = if rotated {
                FontTransform::Rotate90
            } else {
                FontTransform::None
            };
            let label_style = (FONT, 12)
                .into_font()
                .transform(transform)
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Top));
            for (pos, label) in &series.ticks {
                let (px, py) = chart.backend_coord(&(*pos, y_min));
                root.draw(&Text::new(label.clone(), (px, py + 6), label_style.clone()))?;
            }
        }

        Ok(())
    }

    fn draw_histogram(
        root: &DrawingArea<BitMapBackend, Shift>,
        title: &str,
        hist: &HistogramData,
    ) -> DrawResult {
        let x_min = hist.edges.first().copied().unwrap_or(0.0);
        let x_max = hist.edges.last().copied().unwrap_or(1.0);
        let top = hist.counts.iter().copied().max().unwrap_or(0) as f64;

        let mut chart = ChartBuilder::on(root)
            .caption(title, (FONT, 22))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(x_min..x_max, 0.0..(top * 1.1).max(1.0))?;

        chart
            .configure_mesh()
            .x_desc(hist.column.as_str())
            .y_desc("Frequency")
            .draw()?;

        for (i, &count) in hist.counts.iter().enumerate() {
            let corners = [(hist.edges[i], 0.0), (hist.edges[i + 1], count as f64)];
            chart.draw_series(std::iter::once(Rectangle::new(corners, SERIES.filled())))?;
            chart.draw_series(std::iter::once(Rectangle::new(corners, BLACK.stroke_width(1))))?;
        }

        Ok(())
    }

    fn draw_box(
        root: &DrawingArea<BitMapBackend, Shift>,
        title: &str,
        summary: &BoxSummary,
    ) -> DrawResult {
        let values = summary
            .outliers
            .iter()
            .copied()
            .chain([summary.whisker_low, summary.whisker_high]);
        let (y_min, y_max) = Self::axis_range(values, false);

        let mut chart = ChartBuilder::on(root)
            .caption(title, (FONT, 22))
            .margin(15)
            .x_label_area_size(30)
            .y_label_area_size(60)
            .build_cartesian_2d(-1.0..1.0, y_min..y_max)?;

        let hide_x = |_: &f64| String::new();
        chart
            .configure_mesh()
            .y_desc(summary.column.as_str())
            .x_label_formatter(&hide_x)
            .disable_x_mesh()
            .draw()?;

        let half = 0.25;
        let cap = 0.12;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(-half, summary.q1), (half, summary.q3)],
            SERIES.mix(0.3).filled(),
        )))?;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(-half, summary.q1), (half, summary.q3)],
            SERIES.stroke_width(2),
        )))?;

        let segments = [
            [(-half, summary.median), (half, summary.median)],
            [(0.0, summary.whisker_low), (0.0, summary.q1)],
            [(0.0, summary.q3), (0.0, summary.whisker_high)],
            [(-cap, summary.whisker_low), (cap, summary.whisker_low)],
            [(-cap, summary.whisker_high), (cap, summary.whisker_high)],
        ];
        chart.draw_series(
            segments
                .iter()
                .map(|seg| PathElement::new(seg.to_vec(), SERIES.stroke_width(2))),
        )?;
        chart.draw_series(
            summary
                .outliers
                .iter()
                .map(|&v| Circle::new((0.0, v), 4, BLACK.stroke_width(1))),
        )?;

        Ok(())
    }

    fn draw_pie(
        root: &DrawingArea<BitMapBackend, Shift>,
        title: &str,
        pie: &PieData,
    ) -> DrawResult {
        let titled = root.titled(title, (FONT, 22))?;
        let (width, height) = titled.dim_in_pixel();
        let center = (width as i32 / 2, height as i32 / 2);
        let radius = (width.min(height) as f64) * 0.35;

        let order = Self::pie_order(pie.slices.len());
        let sizes: Vec<f64> = order.iter().map(|&i| pie.slices[i].value).collect();
        let labels: Vec<String> = order.iter().map(|&i| pie.slices[i].label.clone()).collect();
        let colors: Vec<RGBColor> = order
            .iter()
            .map(|&i| {
                let c = PALETTE[i % PALETTE.len()];
                RGBColor(c.r(), c.g(), c.b())
            })
            .collect();

        let mut chart = Pie::new(&center, &radius, &sizes, &colors, &labels);
        // Ends at 12 o'clock, so the first slice sits just counter-clockwise of it
        chart.start_angle(-90.0);
        chart.label_style((FONT, 16).into_font().color(&BLACK));
        chart.percentages((FONT, 14).into_font().color(&WHITE));
        titled.draw(&chart)?;

        Ok(())
    }

    /// Padded [min, max] of the values; optionally stretched to include zero.
    pub fn axis_range(values: impl Iterator<Item = f64>, include_zero: bool) -> (f64, f64) {
        let (mut min, mut max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if !min.is_finite() || !max.is_finite() {
            return (0.0, 1.0);
        }
        if include_zero {
            min = min.min(0.0);
            max = max.max(0.0);
        }
        let range = max - min;
        let padding = if range < 1e-9 { 0.5 } else { range * 0.05 };
        (min - padding, max + padding)
    }

    /// plotters lays slices clockwise; feeding them reversed gives the
    /// counter-clockwise order the interactive pie uses.
    fn pie_order(slices: usize) -> Vec<usize> {
        (0..slices).rev().collect()
    }

    fn bar_half_width(points: &[[f64; 2]]) -> f64 {
        let mut xs: Vec<f64> = points.iter().map(|p| p[0]).collect();
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        xs.dedup();
        let gap = xs
            .windows(2)
            .map(|w| w[1] - w[0])
            .fold(f64::INFINITY, f64::min);
        if gap.is_finite() {
            gap * 0.4
        } else {
            0.4
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum XyStyle {
    Line,
    Bar,
    Area,
    Scatter,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_range_pads_values() {
        let (lo, hi) = StaticChartRenderer::axis_range([2.0, 12.0].into_iter(), false);
        assert!((lo - 1.5).abs() < 1e-9);
        assert!((hi - 12.5).abs() < 1e-9);
    }

    #[test]
    fn axis_range_can_include_zero() {
        let (lo, hi) = StaticChartRenderer::axis_range([5.0, 15.0].into_iter(), true);
        assert!(lo < 0.0);
        assert!(hi > 15.0);
    }

    #[test]
    fn degenerate_axis_range_is_widened() {
        assert_eq!(
            StaticChartRenderer::axis_range([3.0].into_iter(), false),
            (2.5, 3.5)
        );
        assert_eq!(
            StaticChartRenderer::axis_range(std::iter::empty(), false),
            (0.0, 1.0)
        );
    }

    #[test]
    fn oversized_image_is_refused() {
        let chart = ChartData::Pie(PieData {
            category_column: "shop".into(),
            value_column: "units".into(),
            slices: Vec::new(),
        });
        let err = StaticChartRenderer::render_png(&chart, u32::MAX, u32::MAX).unwrap_err();
        assert!(matches!(
            err,
            RenderError::Size {
                width: u32::MAX,
                height: u32::MAX
            }
        ));
        assert_eq!(StaticChartRenderer::buffer_len(4, 2).unwrap(), 24);
    }

    #[test]
    fn pie_slices_are_fed_in_reverse() {
        assert_eq!(StaticChartRenderer::pie_order(3), vec![2, 1, 0]);
        assert!(StaticChartRenderer::pie_order(0).is_empty());
    }

    #[test]
    fn bar_half_width_uses_spacing() {
        let half = StaticChartRenderer::bar_half_width(&[[0.0, 1.0], [1.0, 2.0], [3.0, 1.0]]);
        assert!((half - 0.4).abs() < 1e-9);
    }
}
