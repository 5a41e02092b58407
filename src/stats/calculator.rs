//! Statistics Calculator Module
//! Descriptive statistics per column: moments and quartiles for numeric
//! columns, distinct/mode counts for categorical ones.

use crate::data::{ColumnInfo, ColumnKind, Dataset};
use rayon::prelude::*;
use serde::Serialize;
use statrs::statistics::Statistics;
use std::collections::HashMap;

/// Row labels of the summary table, in display order.
pub const SUMMARY_ROWS: [&str; 11] = [
    "count", "unique", "top", "freq", "mean", "std", "min", "25%", "50%", "75%", "max",
];

/// Measures for a numeric column. Undefined measures are NaN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl Default for NumericStats {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            q25: f64::NAN,
            median: f64::NAN,
            q75: f64::NAN,
            max: f64::NAN,
        }
    }
}

/// Measures for a categorical column. `top`/`freq` are absent when the column has no values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoricalStats {
    pub count: usize,
    pub unique: usize,
    pub top: Option<String>,
    pub freq: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnStats {
    Numeric { name: String, stats: NumericStats },
    Categorical { name: String, stats: CategoricalStats },
}

impl ColumnStats {
    pub fn name(&self) -> &str {
        match self {
            ColumnStats::Numeric { name, .. } | ColumnStats::Categorical { name, .. } => name,
        }
    }

    /// Cell text for one summary row label; measures that do not apply are "NaN".
    pub fn cell(&self, row: &str) -> String {
        match self {
            ColumnStats::Numeric { stats, .. } => match row {
                "count" => stats.count.to_string(),
                "mean" => fmt_measure(stats.mean),
                "std" => fmt_measure(stats.std),
                "min" => fmt_measure(stats.min),
                "25%" => fmt_measure(stats.q25),
                "50%" => fmt_measure(stats.median),
                "75%" => fmt_measure(stats.q75),
                "max" => fmt_measure(stats.max),
                _ => "NaN".to_string(),
            },
            ColumnStats::Categorical { stats, .. } => match row {
                "count" => stats.count.to_string(),
                "unique" => stats.unique.to_string(),
                "top" => stats.top.clone().unwrap_or_else(|| "NaN".to_string()),
                "freq" => stats
                    .freq
                    .map(|f| f.to_string())
                    .unwrap_or_else(|| "NaN".to_string()),
                _ => "NaN".to_string(),
            },
        }
    }
}

fn fmt_measure(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.6}", v)
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

/// Dataset-level summary. Computed on load; unaffected by filtering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub row_count: usize,
    pub column_count: usize,
    pub column_names: Vec<String>,
    /// One entry per column, in column order.
    pub columns: Vec<ColumnStats>,
}

impl SummaryStats {
    pub fn get(&self, column: &str) -> Option<&ColumnStats> {
        self.columns.iter().find(|c| c.name() == column)
    }

    /// Summary rows (label + one cell per column), laid out like a describe table.
    pub fn table_rows(&self) -> Vec<(&'static str, Vec<String>)> {
        SUMMARY_ROWS
            .iter()
            .map(|&row| (row, self.columns.iter().map(|c| c.cell(row)).collect()))
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Handles descriptive statistics with multi-threading support.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Summarize every column of the dataset.
    pub fn describe(dataset: &Dataset) -> SummaryStats {
        // Use rayon for parallel computation
        let columns = dataset
            .columns()
            .par_iter()
            .map(|info| Self::describe_column(dataset, info))
            .collect();

        SummaryStats {
            row_count: dataset.row_count(),
            column_count: dataset.column_count(),
            column_names: dataset.column_names(),
            columns,
        }
    }

    fn describe_column(dataset: &Dataset, info: &ColumnInfo) -> ColumnStats {
        match info.kind {
            ColumnKind::Numeric => {
                let values: Vec<f64> = dataset
                    .numeric_values(&info.name)
                    .unwrap_or_default()
                    .into_iter()
                    .flatten()
                    .collect();
                ColumnStats::Numeric {
                    name: info.name.clone(),
                    stats: Self::compute_numeric_stats(&values),
                }
            }
            ColumnKind::Categorical => {
                let values: Vec<String> = dataset
                    .text_values(&info.name)
                    .unwrap_or_default()
                    .into_iter()
                    .flatten()
                    .collect();
                ColumnStats::Categorical {
                    name: info.name.clone(),
                    stats: Self::compute_categorical_stats(&values),
                }
            }
        }
    }

    /// Count, mean, sample std, min, quartiles and max of the values.
    pub fn compute_numeric_stats(values: &[f64]) -> NumericStats {
        let n = values.len();
        if n == 0 {
            return NumericStats::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        NumericStats {
            count: n,
            mean: values.iter().mean(),
            // Sample standard deviation (n - 1); NaN for a single value
            std: values.iter().std_dev(),
            min: sorted[0],
            q25: Self::percentile(&sorted, 25.0),
            median: Self::percentile(&sorted, 50.0),
            q75: Self::percentile(&sorted, 75.0),
            max: sorted[n - 1],
        }
    }

    /// Non-missing count, distinct count, and the most frequent value.
    /// Ties go to the value seen first.
    pub fn compute_categorical_stats(values: &[String]) -> CategoricalStats {
        let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
        for (i, v) in values.iter().enumerate() {
            counts.entry(v.as_str()).or_insert((0, i)).0 += 1;
        }

        let top = counts
            .iter()
            .max_by(|a, b| a.1 .0.cmp(&b.1 .0).then(b.1 .1.cmp(&a.1 .1)))
            .map(|(value, (freq, _))| (value.to_string(), *freq));

        CategoricalStats {
            count: values.len(),
            unique: counts.len(),
            freq: top.as_ref().map(|(_, f)| *f),
            top: top.map(|(v, _)| v),
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }
}
