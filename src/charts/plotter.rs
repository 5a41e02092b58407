//! Chart Plotter Module
//! Draws prepared chart data interactively using egui_plot.

use super::data::{BoxSummary, ChartData, HistogramData, PieData, XYSeries};
use egui::{Align2, Color32, FontId, Pos2, RichText, Stroke};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Line, Plot, PlotPoint, PlotPoints, Points,
    Polygon, Text,
};
use std::f64::consts::{FRAC_PI_2, TAU};
use std::sync::Arc;

/// Main series color
pub const SERIES_COLOR: Color32 = Color32::from_rgb(52, 152, 219); // Blue

/// Slice colors for pie charts
pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(52, 152, 219),  // Blue
    Color32::from_rgb(231, 76, 60),   // Red
    Color32::from_rgb(46, 204, 113),  // Green
    Color32::from_rgb(155, 89, 182),  // Purple
    Color32::from_rgb(243, 156, 18),  // Orange
    Color32::from_rgb(26, 188, 156),  // Teal
    Color32::from_rgb(233, 30, 99),   // Pink
    Color32::from_rgb(0, 188, 212),   // Cyan
    Color32::from_rgb(121, 85, 72),   // Brown
    Color32::from_rgb(96, 125, 139),  // Blue Grey
];

const PLOT_HEIGHT: f32 = 380.0;
/// Vertical room reserved under the area chart for its rotated labels
const ROTATED_LABEL_SPACE: f32 = 70.0;
/// Segments used to approximate a full circle
const PIE_SEGMENTS: usize = 120;

/// Creates interactive charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Draw any prepared chart.
    pub fn draw(ui: &mut egui::Ui, chart: &ChartData) {
        ui.label(RichText::new(chart.kind().label()).size(14.0).strong());
        match chart {
            ChartData::Line(series) => Self::draw_line_chart(ui, series),
            ChartData::Bar(series) => Self::draw_bar_chart(ui, series),
            ChartData::Area(series) => Self::draw_area_chart(ui, series),
            ChartData::Scatter(series) => Self::draw_scatter_chart(ui, series),
            ChartData::Histogram(hist) => Self::draw_histogram(ui, hist),
            ChartData::BoxPlot(summary) => Self::draw_box_plot(ui, summary),
            ChartData::Pie(pie) => Self::draw_pie_chart(ui, pie),
        }
    }

    /// Base plot with axis labels; category ticks replace numbers when present.
    fn xy_plot(id: &str, series: &XYSeries) -> Plot<'static> {
        let plot = Plot::new(id.to_string())
            .height(PLOT_HEIGHT)
            .allow_scroll(false)
            .x_axis_label(series.x_label.clone())
            .y_axis_label(series.y_label.clone());

        if series.ticks.is_empty() {
            return plot;
        }

        let series = series.clone();
        plot.x_axis_formatter(move |mark, _range| {
            series
                .tick_label(mark.value)
                .map(str::to_string)
                .unwrap_or_default()
        })
    }

    fn draw_line_chart(ui: &mut egui::Ui, series: &XYSeries) {
        Self::xy_plot("line_chart", series).show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(series.points.clone()))
                    .color(SERIES_COLOR)
                    .width(1.5)
                    .name(&series.y_label),
            );
        });
    }

    fn draw_bar_chart(ui: &mut egui::Ui, series: &XYSeries) {
        // One bar per row; width follows the tightest spacing of the x values
        let width = Self::bar_width(&series.points);
        let bars: Vec<Bar> = series
            .points
            .iter()
            .map(|&[x, y]| Bar::new(x, y).width(width).fill(SERIES_COLOR))
            .collect();

        Self::xy_plot("bar_chart", series).show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(SERIES_COLOR).name(&series.y_label));
        });
    }

    /// 80% of the smallest gap between distinct x positions.
    fn bar_width(points: &[[f64; 2]]) -> f64 {
        let mut xs: Vec<f64> = points.iter().map(|p| p[0]).collect();
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        xs.dedup();
        xs.windows(2)
            .map(|w| w[1] - w[0])
            .fold(None, |acc: Option<f64>, gap| {
                Some(acc.map_or(gap, |a| a.min(gap)))
            })
            .map(|gap| gap * 0.8)
            .unwrap_or(0.8)
    }

    /// Filled area with every row label drawn at 45 degrees under the plot.
    fn draw_area_chart(ui: &mut egui::Ui, series: &XYSeries) {
        let response = Plot::new("area_chart")
            .height(PLOT_HEIGHT)
            .allow_scroll(false)
            .y_axis_label(series.y_label.clone())
            .x_axis_formatter(|_mark, _range| String::new())
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(PlotPoints::from(series.points.clone()))
                        .color(SERIES_COLOR)
                        .fill(0.0_f32)
                        .name(&series.y_label),
                );
            });

        let (label_rect, _) = ui.allocate_exact_size(
            egui::vec2(ui.available_width(), ROTATED_LABEL_SPACE),
            egui::Sense::hover(),
        );
        let painter = ui.painter_at(label_rect);
        let font = FontId::proportional(11.0);
        let color = ui.visuals().text_color();
        let plot_rect = response.response.rect;

        for (pos, label) in &series.ticks {
            let screen = response
                .transform
                .position_from_point(&PlotPoint::new(*pos, 0.0));
            if screen.x < plot_rect.left() || screen.x > plot_rect.right() {
                continue;
            }
            let galley = painter.layout_no_wrap(label.clone(), font.clone(), color);
            let anchor = Pos2::new(screen.x, label_rect.top() + 4.0);
            painter.add(
                egui::epaint::TextShape::new(anchor, Arc::clone(&galley), color)
                    .with_angle(std::f32::consts::FRAC_PI_4),
            );
        }

        ui.label(RichText::new(&series.x_label).size(12.0));
    }

    fn draw_scatter_chart(ui: &mut egui::Ui, series: &XYSeries) {
        Self::xy_plot("scatter_chart", series).show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(PlotPoints::from(series.points.clone()))
                    .radius(3.0)
                    .color(SERIES_COLOR.gamma_multiply(0.8))
                    .name(&series.y_label),
            );
        });
    }

    fn draw_histogram(ui: &mut egui::Ui, hist: &HistogramData) {
        let bars: Vec<Bar> = hist
            .counts
            .iter()
            .enumerate()
            .map(|(i, &count)| {
                let left = hist.edges[i];
                let right = hist.edges[i + 1];
                Bar::new((left + right) / 2.0, count as f64)
                    .width(right - left)
                    .fill(SERIES_COLOR)
                    .stroke(Stroke::new(1.0, Color32::BLACK))
            })
            .collect();

        Plot::new("histogram")
            .height(PLOT_HEIGHT)
            .allow_scroll(false)
            .x_axis_label(hist.column.clone())
            .y_axis_label("Frequency")
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).name(&hist.column));
            });
    }

    fn draw_box_plot(ui: &mut egui::Ui, summary: &BoxSummary) {
        let elem = BoxElem::new(
            0.0,
            BoxSpread::new(
                summary.whisker_low,
                summary.q1,
                summary.median,
                summary.q3,
                summary.whisker_high,
            ),
        )
        .box_width(0.5)
        .fill(SERIES_COLOR.gamma_multiply(0.3))
        .stroke(Stroke::new(1.5, SERIES_COLOR));

        let outliers: PlotPoints = summary.outliers.iter().map(|&v| [0.0, v]).collect();

        Plot::new("box_plot")
            .height(PLOT_HEIGHT)
            .allow_scroll(false)
            .y_axis_label(summary.column.clone())
            .include_x(-1.0)
            .include_x(1.0)
            .x_axis_formatter(|_mark, _range| String::new())
            .show(ui, |plot_ui| {
                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(&summary.column));
                plot_ui.points(
                    Points::new(outliers)
                        .radius(3.0)
                        .filled(false)
                        .color(Color32::BLACK),
                );
            });
    }

    /// Pie as filled polygons, starting at 12 o'clock and running counter-clockwise.
    fn draw_pie_chart(ui: &mut egui::Ui, pie: &PieData) {
        let fractions = pie.fractions();
        let percents = pie.percent_labels();

        Plot::new("pie_chart")
            .height(PLOT_HEIGHT)
            .data_aspect(1.0)
            .show_axes(false)
            .show_grid(false)
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .include_x(-1.4)
            .include_x(1.4)
            .include_y(-1.3)
            .include_y(1.3)
            .show(ui, |plot_ui| {
                let mut start = FRAC_PI_2;
                for (i, (slice, fraction)) in pie.slices.iter().zip(&fractions).enumerate() {
                    let sweep = fraction * TAU;
                    let color = PALETTE[i % PALETTE.len()];

                    for piece in Self::wedge_pieces(start, sweep) {
                        plot_ui.polygon(
                            Polygon::new(PlotPoints::from(piece))
                                .fill_color(color)
                                .stroke(Stroke::new(1.0, color))
                                .name(&slice.label),
                        );
                    }

                    let mid = start + sweep / 2.0;
                    plot_ui.text(
                        Text::new(
                            PlotPoint::new(1.15 * mid.cos(), 1.15 * mid.sin()),
                            RichText::new(&slice.label).size(12.0),
                        )
                        .anchor(Align2::CENTER_CENTER),
                    );
                    plot_ui.text(
                        Text::new(
                            PlotPoint::new(0.6 * mid.cos(), 0.6 * mid.sin()),
                            RichText::new(&percents[i]).size(11.0).color(Color32::WHITE),
                        )
                        .anchor(Align2::CENTER_CENTER),
                    );

                    start += sweep;
                }
            });
    }

    /// A wedge split into convex pieces of at most a quarter turn
    /// (polygon fill only handles convex shapes).
    pub fn wedge_pieces(start: f64, sweep: f64) -> Vec<Vec<[f64; 2]>> {
        let pieces = (sweep / FRAC_PI_2).ceil().max(1.0) as usize;
        let step = sweep / pieces as f64;
        (0..pieces)
            .map(|i| Self::wedge_points(start + step * i as f64, step))
            .collect()
    }

    /// Outline of a unit-circle wedge: center, then the arc.
    fn wedge_points(start: f64, sweep: f64) -> Vec<[f64; 2]> {
        let steps = ((sweep / TAU) * PIE_SEGMENTS as f64).ceil().max(1.0) as usize;
        let mut points = Vec::with_capacity(steps + 2);
        points.push([0.0, 0.0]);
        for s in 0..=steps {
            let angle = start + sweep * s as f64 / steps as f64;
            points.push([angle.cos(), angle.sin()]);
        }
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_width_tracks_tightest_gap() {
        let points = [[0.0, 1.0], [2.0, 1.0], [2.5, 3.0]];
        assert!((ChartPlotter::bar_width(&points) - 0.4).abs() < 1e-9);
        assert_eq!(ChartPlotter::bar_width(&[[3.0, 1.0]]), 0.8);
    }

    #[test]
    fn wedge_starts_at_center_and_follows_arc() {
        let points = ChartPlotter::wedge_points(0.0, FRAC_PI_2);
        assert_eq!(points[0], [0.0, 0.0]);
        let first = points[1];
        let last = points[points.len() - 1];
        assert!((first[0] - 1.0).abs() < 1e-9 && first[1].abs() < 1e-9);
        assert!(last[0].abs() < 1e-9 && (last[1] - 1.0).abs() < 1e-9);
        assert_eq!(points.len(), PIE_SEGMENTS / 4 + 2);
    }

    #[test]
    fn large_wedges_are_split_into_convex_pieces() {
        assert_eq!(ChartPlotter::wedge_pieces(0.0, 0.3).len(), 1);
        assert_eq!(ChartPlotter::wedge_pieces(0.0, TAU * 0.7).len(), 3);
        assert_eq!(ChartPlotter::wedge_pieces(0.0, TAU).len(), 4);
    }
}
