//! Chart Specification
//! Chart kinds, the user's axis selections, and the errors raised when a
//! selection does not fit the chosen kind.

use crate::data::Dataset;
use thiserror::Error;

/// Message shown for every chart input problem, whatever the cause.
pub const CHART_INPUT_MESSAGE: &str = "Please select appropriate fields for this chart.";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartInputError {
    #[error("no column selected for {0}")]
    MissingSelection(&'static str),
    #[error("unknown column '{0}'")]
    UnknownColumn(String),
    #[error("column '{0}' is not numeric")]
    NotNumeric(String),
    #[error("column '{0}' is not categorical")]
    NotCategorical(String),
    #[error("no data points to plot")]
    NoData,
    #[error("values cannot be plotted: {0}")]
    InvalidValues(String),
}

impl ChartInputError {
    /// Text for the user. Causes are deliberately not distinguished.
    pub fn user_message(&self) -> &'static str {
        CHART_INPUT_MESSAGE
    }
}

/// The seven supported chart kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChartKind {
    #[default]
    Line,
    Bar,
    Area,
    Scatter,
    Histogram,
    BoxPlot,
    Pie,
}

impl ChartKind {
    pub const ALL: [ChartKind; 7] = [
        ChartKind::Line,
        ChartKind::Bar,
        ChartKind::Area,
        ChartKind::Scatter,
        ChartKind::Histogram,
        ChartKind::BoxPlot,
        ChartKind::Pie,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ChartKind::Line => "Line Chart",
            ChartKind::Bar => "Bar Chart",
            ChartKind::Area => "Area Chart",
            ChartKind::Scatter => "Scatter Plot",
            ChartKind::Histogram => "Histogram",
            ChartKind::BoxPlot => "Box Plot",
            ChartKind::Pie => "Pie Chart",
        }
    }

    /// Whether the kind takes an X / grouping column at all.
    pub fn uses_x(&self) -> bool {
        !matches!(self, ChartKind::Histogram | ChartKind::BoxPlot)
    }

    /// Label for the X / grouping selector.
    pub fn x_label(&self) -> &'static str {
        match self {
            ChartKind::Scatter => "X-axis (Numeric)",
            ChartKind::Pie => "Category Column",
            _ => "X-axis",
        }
    }

    /// Label for the Y / value selector.
    pub fn y_label(&self) -> &'static str {
        match self {
            ChartKind::Line | ChartKind::Bar | ChartKind::Area | ChartKind::Scatter => {
                "Y-axis (Numeric)"
            }
            ChartKind::Histogram | ChartKind::BoxPlot => "Numeric Column",
            ChartKind::Pie => "Value Column (Numeric)",
        }
    }

    /// Columns offered for the X / grouping input.
    pub fn x_candidates(&self, dataset: &Dataset) -> Vec<String> {
        match self {
            ChartKind::Line | ChartKind::Bar | ChartKind::Area => dataset.column_names(),
            ChartKind::Scatter => dataset.numeric_columns(),
            ChartKind::Pie => dataset.categorical_columns(),
            ChartKind::Histogram | ChartKind::BoxPlot => Vec::new(),
        }
    }

    /// Columns offered for the Y / value input. Always numeric.
    pub fn y_candidates(&self, dataset: &Dataset) -> Vec<String> {
        dataset.numeric_columns()
    }
}

/// Histogram bin count, always within `MIN..=MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistogramBins(usize);

impl HistogramBins {
    pub const MIN: usize = 5;
    pub const MAX: usize = 50;
    pub const DEFAULT: usize = 20;

    pub fn new(bins: usize) -> Self {
        Self(bins.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for HistogramBins {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

/// Current chart kind plus column selections. Lives for one rendering pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartSpec {
    pub kind: ChartKind,
    /// X axis (Line/Bar/Area/Scatter) or grouping key (Pie).
    pub x: Option<String>,
    /// Y axis, or the single numeric column of Histogram/Box Plot, or the Pie value column.
    pub y: Option<String>,
    pub bins: HistogramBins,
}

impl ChartSpec {
    /// Spec for `kind` with the first offered column preselected for each input.
    pub fn with_defaults(kind: ChartKind, dataset: &Dataset) -> Self {
        Self {
            kind,
            x: kind.x_candidates(dataset).into_iter().next(),
            y: kind.y_candidates(dataset).into_iter().next(),
            bins: HistogramBins::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataLoader;

    fn sample() -> Dataset {
        DataLoader::default()
            .load_csv_bytes(b"region,sales,cost\nnorth,10,4\nsouth,20,5\n")
            .unwrap()
    }

    #[test]
    fn bins_are_clamped() {
        assert_eq!(HistogramBins::new(0).get(), 5);
        assert_eq!(HistogramBins::new(4).get(), 5);
        assert_eq!(HistogramBins::new(17).get(), 17);
        assert_eq!(HistogramBins::new(51).get(), 50);
        assert_eq!(HistogramBins::new(usize::MAX).get(), 50);
        assert_eq!(HistogramBins::default().get(), 20);
    }

    #[test]
    fn defaults_pick_first_candidate() {
        let ds = sample();
        let line = ChartSpec::with_defaults(ChartKind::Line, &ds);
        assert_eq!(line.x.as_deref(), Some("region"));
        assert_eq!(line.y.as_deref(), Some("sales"));

        let scatter = ChartSpec::with_defaults(ChartKind::Scatter, &ds);
        assert_eq!(scatter.x.as_deref(), Some("sales"));

        let pie = ChartSpec::with_defaults(ChartKind::Pie, &ds);
        assert_eq!(pie.x.as_deref(), Some("region"));
        assert_eq!(pie.y.as_deref(), Some("sales"));

        let hist = ChartSpec::with_defaults(ChartKind::Histogram, &ds);
        assert_eq!(hist.x, None);
    }

    #[test]
    fn every_error_shows_the_same_message() {
        let errors = [
            ChartInputError::NoData,
            ChartInputError::NotNumeric("a".into()),
            ChartInputError::MissingSelection("X-axis"),
        ];
        for e in errors {
            assert_eq!(e.user_message(), CHART_INPUT_MESSAGE);
        }
    }
}
