//! Dataset Module
//! Column-typed view over a Polars DataFrame. Each column carries an explicit
//! kind (numeric or categorical) decided once at load time.

use polars::prelude::*;
use std::collections::HashSet;

/// Column kind, attached to every column when the dataset is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl ColumnKind {
    /// Integer and float dtypes are numeric; everything else (text, bool, dates) is categorical.
    pub fn from_dtype(dtype: &DataType) -> Self {
        if matches!(
            dtype,
            DataType::Float32
                | DataType::Float64
                | DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
        ) {
            ColumnKind::Numeric
        } else {
            ColumnKind::Categorical
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Categorical => "categorical",
        }
    }
}

/// Name and kind of one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub kind: ColumnKind,
}

/// First rows of a dataset rendered to text, ready for a table widget.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TablePreview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Position of each shown row in the uploaded file.
    pub row_ids: Vec<usize>,
    pub total_rows: usize,
}

/// Tabular data with typed columns. Never mutated after construction;
/// filtering produces a new `Dataset` with the same columns.
#[derive(Debug, Clone)]
pub struct Dataset {
    df: DataFrame,
    columns: Vec<ColumnInfo>,
    row_ids: Vec<usize>,
}

impl Dataset {
    pub fn new(df: DataFrame) -> Self {
        let columns = df
            .get_columns()
            .iter()
            .map(|col| ColumnInfo {
                name: col.name().to_string(),
                kind: ColumnKind::from_dtype(col.dtype()),
            })
            .collect();

        let row_ids = (0..df.height()).collect();
        Self {
            df,
            columns,
            row_ids,
        }
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        self.columns.iter().find(|c| c.name == name).map(|c| c.kind)
    }

    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns_of_kind(ColumnKind::Numeric)
    }

    pub fn categorical_columns(&self) -> Vec<String> {
        self.columns_of_kind(ColumnKind::Categorical)
    }

    fn columns_of_kind(&self, kind: ColumnKind) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Values of a numeric column as f64. Nulls and NaN both come back as `None`.
    pub fn numeric_values(&self, name: &str) -> Option<Vec<Option<f64>>> {
        if self.kind_of(name)? != ColumnKind::Numeric {
            return None;
        }
        let casted = self.df.column(name).ok()?.cast(&DataType::Float64).ok()?;
        let ca = casted.f64().ok()?;
        Some(
            ca.into_iter()
                .map(|v| v.filter(|x| !x.is_nan()))
                .collect(),
        )
    }

    /// Values of any column rendered as text. Nulls come back as `None`.
    pub fn text_values(&self, name: &str) -> Option<Vec<Option<String>>> {
        let casted = self.df.column(name).ok()?.cast(&DataType::String).ok()?;
        let ca = casted.str().ok()?;
        Some(ca.into_iter().map(|v| v.map(str::to_string)).collect())
    }

    /// Distinct non-missing values of a column, in order of first appearance.
    pub fn distinct_values(&self, name: &str) -> Vec<String> {
        let Some(values) = self.text_values(name) else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        values
            .into_iter()
            .flatten()
            .filter(|v| seen.insert(v.clone()))
            .collect()
    }

    /// Whether any cell of the column is missing.
    pub fn has_missing(&self, name: &str) -> bool {
        match self.kind_of(name) {
            Some(ColumnKind::Numeric) => self
                .numeric_values(name)
                .is_some_and(|vals| vals.iter().any(Option::is_none)),
            Some(ColumnKind::Categorical) => self
                .df
                .column(name)
                .is_ok_and(|col| col.null_count() > 0),
            None => false,
        }
    }

    /// Min and max of the non-missing values of a numeric column.
    pub fn value_range(&self, name: &str) -> Option<(f64, f64)> {
        let values = self.numeric_values(name)?;
        values.into_iter().flatten().fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// Keep the rows whose mask entry is true. Column kinds carry over unchanged.
    pub fn filter_rows(&self, mask: &[bool]) -> PolarsResult<Dataset> {
        let df = self
            .df
            .filter(&BooleanChunked::from_slice("mask".into(), mask))?;
        let row_ids = self
            .row_ids
            .iter()
            .zip(mask)
            .filter_map(|(&id, &keep)| keep.then_some(id))
            .collect();
        Ok(Dataset {
            df,
            columns: self.columns.clone(),
            row_ids,
        })
    }

    /// Same columns, zero rows.
    pub fn empty_like(&self) -> Dataset {
        Dataset {
            df: self.df.clear(),
            columns: self.columns.clone(),
            row_ids: Vec::new(),
        }
    }

    /// Text rendering of the first `limit` rows; missing cells are shown empty.
    pub fn preview(&self, limit: usize) -> TablePreview {
        let head = self.df.head(Some(limit));
        let head = Dataset {
            row_ids: self.row_ids.iter().take(head.height()).copied().collect(),
            df: head,
            columns: self.columns.clone(),
        };

        let columns: Vec<Vec<Option<String>>> = self
            .columns
            .iter()
            .map(|c| head.text_values(&c.name).unwrap_or_default())
            .collect();

        let rows = (0..head.row_count())
            .map(|i| {
                columns
                    .iter()
                    .map(|col| col.get(i).cloned().flatten().unwrap_or_default())
                    .collect()
            })
            .collect();

        TablePreview {
            headers: self.column_names(),
            rows,
            row_ids: head.row_ids,
            total_rows: self.row_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        let df = DataFrame::new(vec![
            Column::new("city".into(), [Some("Oslo"), None, Some("Rome"), Some("Oslo")]),
            Column::new("temp".into(), [Some(3.5), Some(f64::NAN), None, Some(-1.0)]),
            Column::new("visits".into(), [10i64, 20, 30, 40]),
        ])
        .unwrap();
        Dataset::new(df)
    }

    #[test]
    fn kinds_follow_dtypes() {
        let ds = sample();
        assert_eq!(ds.kind_of("city"), Some(ColumnKind::Categorical));
        assert_eq!(ds.kind_of("temp"), Some(ColumnKind::Numeric));
        assert_eq!(ds.kind_of("visits"), Some(ColumnKind::Numeric));
        assert_eq!(ds.kind_of("nope"), None);
        assert_eq!(ds.numeric_columns(), vec!["temp", "visits"]);
        assert_eq!(ds.categorical_columns(), vec!["city"]);
        assert_eq!(ColumnKind::from_dtype(&DataType::Boolean), ColumnKind::Categorical);
    }

    #[test]
    fn nan_counts_as_missing() {
        let ds = sample();
        assert_eq!(
            ds.numeric_values("temp").unwrap(),
            vec![Some(3.5), None, None, Some(-1.0)]
        );
        assert!(ds.has_missing("temp"));
        assert!(ds.has_missing("city"));
        assert!(!ds.has_missing("visits"));
        assert_eq!(ds.value_range("temp"), Some((-1.0, 3.5)));
        assert!(ds.numeric_values("city").is_none());
    }

    #[test]
    fn distinct_values_keep_first_appearance_order() {
        let ds = sample();
        assert_eq!(ds.distinct_values("city"), vec!["Oslo", "Rome"]);
    }

    #[test]
    fn filter_rows_preserves_columns() {
        let ds = sample();
        let filtered = ds.filter_rows(&[true, false, false, true]).unwrap();
        assert_eq!(filtered.row_count(), 2);
        assert_eq!(filtered.columns(), ds.columns());
    }

    #[test]
    fn filtered_preview_keeps_source_row_numbers() {
        let ds = sample();
        assert_eq!(ds.preview(10).row_ids, vec![0, 1, 2, 3]);

        let filtered = ds.filter_rows(&[false, true, false, true]).unwrap();
        let preview = filtered.preview(10);
        assert_eq!(preview.row_ids, vec![1, 3]);
        assert_eq!(preview.rows[1][2], "40");

        let refiltered = filtered.filter_rows(&[false, true]).unwrap();
        assert_eq!(refiltered.preview(1).row_ids, vec![3]);
        assert!(ds.empty_like().preview(5).row_ids.is_empty());
    }

    #[test]
    fn preview_is_limited_and_blanks_missing() {
        let ds = sample();
        let preview = ds.preview(2);
        assert_eq!(preview.total_rows, 4);
        assert_eq!(preview.rows.len(), 2);
        assert_eq!(preview.rows[1][0], "");
        assert_eq!(preview.rows[0][2], "10");
    }
}
