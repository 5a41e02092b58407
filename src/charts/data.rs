//! Chart Data Preparation
//! Validates a chart spec against the filtered dataset and turns it into
//! plot-ready series. Both the interactive plotter and the PNG renderer draw
//! from the same `ChartData`.

use super::spec::{ChartInputError, ChartKind, ChartSpec};
use crate::data::{ColumnKind, Dataset};
use crate::stats::StatsCalculator;
use std::collections::{BTreeMap, HashMap};

/// Points in row order plus optional tick labels for a category / index axis.
#[derive(Debug, Clone, PartialEq)]
pub struct XYSeries {
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<[f64; 2]>,
    /// Labels at fixed x positions; empty for a plain numeric axis.
    pub ticks: Vec<(f64, String)>,
}

impl XYSeries {
    pub fn tick_label(&self, x: f64) -> Option<&str> {
        self.ticks
            .iter()
            .find(|(pos, _)| (pos - x).abs() < 1e-9)
            .map(|(_, label)| label.as_str())
    }
}

/// Equal-width bins; `edges.len() == counts.len() + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramData {
    pub column: String,
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

/// Box-and-whisker summary with 1.5·IQR whiskers.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub column: String,
    pub whisker_low: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
}

/// One slice per group key, sorted by key.
#[derive(Debug, Clone, PartialEq)]
pub struct PieData {
    pub category_column: String,
    pub value_column: String,
    pub slices: Vec<PieSlice>,
}

impl PieData {
    pub fn total(&self) -> f64 {
        self.slices.iter().map(|s| s.value).sum()
    }

    /// Share of each slice in [0, 1], in slice order.
    pub fn fractions(&self) -> Vec<f64> {
        let total = self.total();
        self.slices.iter().map(|s| s.value / total).collect()
    }

    /// Percentage labels, one decimal place.
    pub fn percent_labels(&self) -> Vec<String> {
        self.fractions()
            .iter()
            .map(|f| format!("{:.1}%", f * 100.0))
            .collect()
    }
}

/// Plot-ready data for one chart.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    Line(XYSeries),
    Bar(XYSeries),
    Area(XYSeries),
    Scatter(XYSeries),
    Histogram(HistogramData),
    BoxPlot(BoxSummary),
    Pie(PieData),
}

/// X values of an "any column" axis.
enum AxisValues {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl ChartData {
    pub fn kind(&self) -> ChartKind {
        match self {
            ChartData::Line(_) => ChartKind::Line,
            ChartData::Bar(_) => ChartKind::Bar,
            ChartData::Area(_) => ChartKind::Area,
            ChartData::Scatter(_) => ChartKind::Scatter,
            ChartData::Histogram(_) => ChartKind::Histogram,
            ChartData::BoxPlot(_) => ChartKind::BoxPlot,
            ChartData::Pie(_) => ChartKind::Pie,
        }
    }

    /// Validate `spec` against `data` and build the series for its kind.
    pub fn prepare(data: &Dataset, spec: &ChartSpec) -> Result<ChartData, ChartInputError> {
        match spec.kind {
            ChartKind::Line => Self::xy_series(data, spec).map(ChartData::Line),
            ChartKind::Bar => Self::xy_series(data, spec).map(ChartData::Bar),
            ChartKind::Area => Self::area_series(data, spec).map(ChartData::Area),
            ChartKind::Scatter => Self::scatter_series(data, spec).map(ChartData::Scatter),
            ChartKind::Histogram => Self::histogram(data, spec).map(ChartData::Histogram),
            ChartKind::BoxPlot => Self::box_summary(data, spec).map(ChartData::BoxPlot),
            ChartKind::Pie => Self::pie(data, spec).map(ChartData::Pie),
        }
    }

    fn selected<'a>(
        selection: &'a Option<String>,
        role: &'static str,
    ) -> Result<&'a str, ChartInputError> {
        selection
            .as_deref()
            .ok_or(ChartInputError::MissingSelection(role))
    }

    /// Values of a numeric column; infinities are treated as missing since
    /// no axis or bin can hold them.
    fn numeric_column(data: &Dataset, name: &str) -> Result<Vec<Option<f64>>, ChartInputError> {
        match data.kind_of(name) {
            None => Err(ChartInputError::UnknownColumn(name.to_string())),
            Some(ColumnKind::Categorical) => Err(ChartInputError::NotNumeric(name.to_string())),
            Some(ColumnKind::Numeric) => data
                .numeric_values(name)
                .map(|values| {
                    values
                        .into_iter()
                        .map(|v| v.filter(|x| x.is_finite()))
                        .collect()
                })
                .ok_or_else(|| ChartInputError::NotNumeric(name.to_string())),
        }
    }

    fn categorical_column(
        data: &Dataset,
        name: &str,
    ) -> Result<Vec<Option<String>>, ChartInputError> {
        match data.kind_of(name) {
            None => Err(ChartInputError::UnknownColumn(name.to_string())),
            Some(ColumnKind::Numeric) => Err(ChartInputError::NotCategorical(name.to_string())),
            Some(ColumnKind::Categorical) => data
                .text_values(name)
                .ok_or_else(|| ChartInputError::UnknownColumn(name.to_string())),
        }
    }

    fn any_column(data: &Dataset, name: &str) -> Result<AxisValues, ChartInputError> {
        match data.kind_of(name) {
            None => Err(ChartInputError::UnknownColumn(name.to_string())),
            Some(ColumnKind::Numeric) => Self::numeric_column(data, name).map(AxisValues::Numeric),
            Some(ColumnKind::Categorical) => {
                Self::categorical_column(data, name).map(AxisValues::Text)
            }
        }
    }

    /// Non-missing values, or `NoData` when there are none.
    fn present(values: Vec<Option<f64>>) -> Result<Vec<f64>, ChartInputError> {
        let values: Vec<f64> = values.into_iter().flatten().collect();
        if values.is_empty() {
            Err(ChartInputError::NoData)
        } else {
            Ok(values)
        }
    }

    /// Line / Bar: Y over X in row order. A text X axis becomes a category
    /// axis with positions in order of first appearance.
    fn xy_series(data: &Dataset, spec: &ChartSpec) -> Result<XYSeries, ChartInputError> {
        let x_name = Self::selected(&spec.x, "X-axis")?;
        let y_name = Self::selected(&spec.y, "Y-axis")?;
        let x_values = Self::any_column(data, x_name)?;
        let y_values = Self::numeric_column(data, y_name)?;

        let mut points = Vec::new();
        let mut ticks = Vec::new();
        match x_values {
            AxisValues::Numeric(xs) => {
                for (x, y) in xs.into_iter().zip(y_values) {
                    if let (Some(x), Some(y)) = (x, y) {
                        points.push([x, y]);
                    }
                }
            }
            AxisValues::Text(xs) => {
                let mut positions: HashMap<String, f64> = HashMap::new();
                for (x, y) in xs.into_iter().zip(y_values) {
                    let (Some(x), Some(y)) = (x, y) else {
                        continue;
                    };
                    let next = positions.len() as f64;
                    let pos = *positions.entry(x.clone()).or_insert_with(|| {
                        ticks.push((next, x.clone()));
                        next
                    });
                    points.push([pos, y]);
                }
            }
        }

        if points.is_empty() {
            return Err(ChartInputError::NoData);
        }

        Ok(XYSeries {
            x_label: x_name.to_string(),
            y_label: y_name.to_string(),
            points,
            ticks,
        })
    }

    /// Area: Y filled down to zero over evenly spaced positions, each
    /// labelled with the row's X value.
    fn area_series(data: &Dataset, spec: &ChartSpec) -> Result<XYSeries, ChartInputError> {
        let x_name = Self::selected(&spec.x, "X-axis")?;
        let y_name = Self::selected(&spec.y, "Y-axis")?;
        // Any column is accepted for the labels
        let labels = data
            .text_values(x_name)
            .ok_or_else(|| ChartInputError::UnknownColumn(x_name.to_string()))?;
        let y_values = Self::numeric_column(data, y_name)?;

        let mut points = Vec::new();
        let mut ticks = Vec::new();
        // Positions follow the row index so a gap stays a gap.
        for (row, (label, y)) in labels.into_iter().zip(y_values).enumerate() {
            let pos = row as f64;
            ticks.push((pos, label.unwrap_or_default()));
            if let Some(y) = y {
                points.push([pos, y]);
            }
        }

        if points.is_empty() {
            return Err(ChartInputError::NoData);
        }

        Ok(XYSeries {
            x_label: x_name.to_string(),
            y_label: y_name.to_string(),
            points,
            ticks,
        })
    }

    fn scatter_series(data: &Dataset, spec: &ChartSpec) -> Result<XYSeries, ChartInputError> {
        let x_name = Self::selected(&spec.x, "X-axis")?;
        let y_name = Self::selected(&spec.y, "Y-axis")?;
        let xs = Self::numeric_column(data, x_name)?;
        let ys = Self::numeric_column(data, y_name)?;

        let points: Vec<[f64; 2]> = xs
            .into_iter()
            .zip(ys)
            .filter_map(|pair| match pair {
                (Some(x), Some(y)) => Some([x, y]),
                _ => None,
            })
            .collect();

        if points.is_empty() {
            return Err(ChartInputError::NoData);
        }

        Ok(XYSeries {
            x_label: x_name.to_string(),
            y_label: y_name.to_string(),
            points,
            ticks: Vec::new(),
        })
    }

    fn histogram(data: &Dataset, spec: &ChartSpec) -> Result<HistogramData, ChartInputError> {
        let name = Self::selected(&spec.y, "Numeric Column")?;
        let values = Self::present(Self::numeric_column(data, name)?)?;
        let (edges, counts) = Self::bin_values(&values, spec.bins.get());

        Ok(HistogramData {
            column: name.to_string(),
            edges,
            counts,
        })
    }

    /// Equal-width bins over [min, max]; the last bin includes its right edge.
    /// A constant sample is spread over [v - 0.5, v + 0.5].
    pub fn bin_values(values: &[f64], bins: usize) -> (Vec<f64>, Vec<usize>) {
        let bins = bins.max(1);
        let (mut lo, mut hi) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if !lo.is_finite() || !hi.is_finite() {
            return (Vec::new(), Vec::new());
        }
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let mut edges: Vec<f64> = (0..=bins).map(|i| lo + i as f64 * width).collect();
        edges[bins] = hi;

        let mut counts = vec![0usize; bins];
        for &v in values {
            let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }

        (edges, counts)
    }

    fn box_summary(data: &Dataset, spec: &ChartSpec) -> Result<BoxSummary, ChartInputError> {
        let name = Self::selected(&spec.y, "Numeric Column")?;
        let mut values = Self::present(Self::numeric_column(data, name)?)?;
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let q1 = StatsCalculator::percentile(&values, 25.0);
        let median = StatsCalculator::percentile(&values, 50.0);
        let q3 = StatsCalculator::percentile(&values, 75.0);
        let iqr = q3 - q1;
        let low_fence = q1 - 1.5 * iqr;
        let high_fence = q3 + 1.5 * iqr;

        let whisker_low = values
            .iter()
            .copied()
            .find(|&v| v >= low_fence)
            .unwrap_or(q1);
        let whisker_high = values
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= high_fence)
            .unwrap_or(q3);
        let outliers = values
            .iter()
            .copied()
            .filter(|&v| v < whisker_low || v > whisker_high)
            .collect();

        Ok(BoxSummary {
            column: name.to_string(),
            whisker_low,
            q1,
            median,
            q3,
            whisker_high,
            outliers,
        })
    }

    /// Sum the value column per category; rows without a category are dropped,
    /// missing values count as zero.
    fn pie(data: &Dataset, spec: &ChartSpec) -> Result<PieData, ChartInputError> {
        let cat_name = Self::selected(&spec.x, "Category Column")?;
        let val_name = Self::selected(&spec.y, "Value Column")?;
        let categories = Self::categorical_column(data, cat_name)?;
        let values = Self::numeric_column(data, val_name)?;

        let mut sums: BTreeMap<String, f64> = BTreeMap::new();
        for (cat, v) in categories.into_iter().zip(values) {
            if let Some(cat) = cat {
                *sums.entry(cat).or_insert(0.0) += v.unwrap_or(0.0);
            }
        }

        if sums.is_empty() {
            return Err(ChartInputError::NoData);
        }
        if let Some((label, _)) = sums.iter().find(|(_, v)| **v < 0.0) {
            return Err(ChartInputError::InvalidValues(format!(
                "negative total for '{}'",
                label
            )));
        }
        let total: f64 = sums.values().sum();
        if total <= 0.0 {
            return Err(ChartInputError::InvalidValues("all slices are zero".to_string()));
        }

        Ok(PieData {
            category_column: cat_name.to_string(),
            value_column: val_name.to_string(),
            slices: sums
                .into_iter()
                .map(|(label, value)| PieSlice { label, value })
                .collect(),
        })
    }
}
