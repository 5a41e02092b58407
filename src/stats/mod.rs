//! Statistics module - Descriptive summaries

mod calculator;

pub use calculator::{
    CategoricalStats, ColumnStats, NumericStats, StatsCalculator, SummaryStats, SUMMARY_ROWS,
};
