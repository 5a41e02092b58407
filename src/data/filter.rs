//! Filter Engine
//! Single-column row predicates: a set of allowed categories, or an inclusive numeric range.

use super::dataset::{ColumnKind, Dataset};
use std::collections::BTreeSet;

/// Row predicate on one column.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterPredicate {
    /// Keep rows whose value is one of `allowed`.
    Categories {
        allowed: BTreeSet<String>,
        include_missing: bool,
    },
    /// Keep rows with `lo <= value <= hi`.
    Range {
        lo: f64,
        hi: f64,
        include_missing: bool,
    },
}

impl FilterPredicate {
    /// The "match everything" predicate for a column: every distinct value,
    /// or the full [min, max] range.
    pub fn default_for(dataset: &Dataset, column: &str) -> Option<Self> {
        let predicate = match dataset.kind_of(column)? {
            ColumnKind::Categorical => FilterPredicate::Categories {
                allowed: dataset.distinct_values(column).into_iter().collect(),
                include_missing: true,
            },
            ColumnKind::Numeric => {
                let (lo, hi) = dataset
                    .value_range(column)
                    .unwrap_or((f64::NEG_INFINITY, f64::INFINITY));
                FilterPredicate::Range {
                    lo,
                    hi,
                    include_missing: true,
                }
            }
        };
        Some(predicate)
    }

    pub fn include_missing(&self) -> bool {
        match self {
            FilterPredicate::Categories {
                include_missing, ..
            }
            | FilterPredicate::Range {
                include_missing, ..
            } => *include_missing,
        }
    }

    fn matches_number(&self, value: Option<f64>) -> bool {
        match (self, value) {
            (FilterPredicate::Range { lo, hi, .. }, Some(v)) => *lo <= v && v <= *hi,
            (_, None) => self.include_missing(),
            (FilterPredicate::Categories { .. }, Some(_)) => false,
        }
    }

    fn matches_text(&self, value: Option<&str>) -> bool {
        match (self, value) {
            (FilterPredicate::Categories { allowed, .. }, Some(v)) => allowed.contains(v),
            (_, None) => self.include_missing(),
            (FilterPredicate::Range { .. }, Some(_)) => false,
        }
    }
}

/// Applies a column predicate to a dataset.
pub struct DataFilter;

impl DataFilter {
    /// Rows of `dataset` matching `predicate` on `column`.
    ///
    /// Total over its inputs: an unknown column, or a predicate of the wrong
    /// kind for the column, keeps no rows rather than failing.
    pub fn apply(dataset: &Dataset, column: &str, predicate: &FilterPredicate) -> Dataset {
        let mask = Self::mask(dataset, column, predicate);
        let kept = mask.iter().filter(|&&keep| keep).count();
        log::debug!(
            "Filter on '{}': kept {} of {} rows",
            column,
            kept,
            dataset.row_count()
        );

        match dataset.filter_rows(&mask) {
            Ok(filtered) => filtered,
            Err(e) => {
                log::error!("Row filter failed: {}", e);
                dataset.empty_like()
            }
        }
    }

    /// Row mask for `predicate` on `column`.
    pub fn mask(dataset: &Dataset, column: &str, predicate: &FilterPredicate) -> Vec<bool> {
        let height = dataset.row_count();
        match dataset.kind_of(column) {
            Some(ColumnKind::Numeric) => dataset
                .numeric_values(column)
                .map(|vals| vals.into_iter().map(|v| predicate.matches_number(v)).collect())
                .unwrap_or_else(|| vec![false; height]),
            Some(ColumnKind::Categorical) => dataset
                .text_values(column)
                .map(|vals| {
                    vals.iter()
                        .map(|v| predicate.matches_text(v.as_deref()))
                        .collect()
                })
                .unwrap_or_else(|| vec![false; height]),
            None => vec![false; height],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataLoader;

    fn people() -> Dataset {
        let csv = "team,score,hours\n\
                   red,10,1.5\n\
                   blue,20,2.0\n\
                   red,30,\n\
                   green,,4.0\n\
                   ,50,5.5\n";
        DataLoader::default().load_csv_bytes(csv.as_bytes()).unwrap()
    }

    fn allow(values: &[&str]) -> FilterPredicate {
        FilterPredicate::Categories {
            allowed: values.iter().map(|s| s.to_string()).collect(),
            include_missing: false,
        }
    }

    #[test]
    fn default_predicate_keeps_everything() {
        let ds = people();
        for column in ds.column_names() {
            let predicate = FilterPredicate::default_for(&ds, &column).unwrap();
            let filtered = DataFilter::apply(&ds, &column, &predicate);
            assert!(filtered.dataframe().equals_missing(ds.dataframe()), "{column}");
        }
    }

    #[test]
    fn categorical_membership() {
        let ds = people();
        let filtered = DataFilter::apply(&ds, "team", &allow(&["red"]));
        assert_eq!(filtered.row_count(), 2);
        assert_eq!(filtered.distinct_values("team"), vec!["red"]);
    }

    #[test]
    fn empty_selection_gives_zero_rows() {
        let ds = people();
        let filtered = DataFilter::apply(&ds, "team", &allow(&[]));
        assert_eq!(filtered.row_count(), 0);
        assert_eq!(filtered.columns(), ds.columns());
    }

    #[test]
    fn range_is_inclusive() {
        let ds = people();
        let predicate = FilterPredicate::Range {
            lo: 20.0,
            hi: 30.0,
            include_missing: false,
        };
        let filtered = DataFilter::apply(&ds, "score", &predicate);
        assert_eq!(
            filtered.numeric_values("score").unwrap(),
            vec![Some(20.0), Some(30.0)]
        );
    }

    #[test]
    fn degenerate_range_keeps_only_min() {
        let ds = people();
        let (min, _) = ds.value_range("hours").unwrap();
        let predicate = FilterPredicate::Range {
            lo: min,
            hi: min,
            include_missing: false,
        };
        let filtered = DataFilter::apply(&ds, "hours", &predicate);
        assert_eq!(filtered.numeric_values("hours").unwrap(), vec![Some(1.5)]);
    }

    #[test]
    fn inverted_range_matches_nothing() {
        let ds = people();
        let predicate = FilterPredicate::Range {
            lo: 40.0,
            hi: 10.0,
            include_missing: false,
        };
        assert_eq!(DataFilter::apply(&ds, "score", &predicate).row_count(), 0);
    }

    #[test]
    fn missing_cells_follow_include_flag() {
        let ds = people();
        let mut predicate = FilterPredicate::default_for(&ds, "team").unwrap();
        if let FilterPredicate::Categories {
            include_missing, ..
        } = &mut predicate
        {
            *include_missing = false;
        }
        assert_eq!(DataFilter::apply(&ds, "team", &predicate).row_count(), 4);
    }

    #[test]
    fn filtering_is_idempotent() {
        let ds = people();
        let predicate = allow(&["red", "green"]);
        let once = DataFilter::apply(&ds, "team", &predicate);
        let twice = DataFilter::apply(&once, "team", &predicate);
        assert!(once.dataframe().equals_missing(twice.dataframe()));
    }

    #[test]
    fn mismatched_predicate_keeps_nothing() {
        let ds = people();
        let filtered = DataFilter::apply(&ds, "score", &allow(&["10"]));
        assert_eq!(filtered.row_count(), 0);
        let filtered = DataFilter::apply(&ds, "unknown", &allow(&["red"]));
        assert_eq!(filtered.row_count(), 0);
    }
}
