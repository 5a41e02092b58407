//! Charts module - chart selection, data preparation and rendering

mod data;
mod plotter;
mod renderer;
mod spec;

pub use data::{BoxSummary, ChartData, HistogramData, PieData, PieSlice, XYSeries};
pub use plotter::ChartPlotter;
pub use renderer::{RenderError, StaticChartRenderer};
pub use spec::{ChartInputError, ChartKind, ChartSpec, HistogramBins, CHART_INPUT_MESSAGE};
