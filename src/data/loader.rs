//! CSV Data Loader Module
//! Parses uploaded CSV bytes into a typed `Dataset` using Polars.

use super::dataset::{ColumnKind, Dataset};
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

/// Cell tokens read as missing values (the usual pandas NA spellings).
pub const NA_TOKENS: [&str; 13] = [
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "<NA>", "#N/A",
];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to parse CSV: {0}")]
    Parse(#[from] PolarsError),
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

/// Handles CSV parsing with Polars.
#[derive(Debug, Clone, Default)]
pub struct DataLoader {
    infer_schema_rows: Option<usize>,
}

impl DataLoader {
    /// `infer_schema_rows` of `None` scans every row before settling column types.
    pub fn new(infer_schema_rows: Option<usize>) -> Self {
        Self { infer_schema_rows }
    }

    /// Parse comma-delimited bytes whose first row is the header.
    pub fn load_csv_bytes(&self, bytes: &[u8]) -> Result<Dataset, LoaderError> {
        let df = match self.read(bytes, self.infer_schema_rows) {
            Ok(df) => df,
            Err(typed_err) => {
                // A cell polars could not fit into the inferred dtype (e.g. an
                // integer beyond i64). Read as text and settle kinds per column.
                log::debug!("Typed CSV read failed ({}), retrying as text", typed_err);
                let text = self.read(bytes, Some(0)).map_err(|_| typed_err)?;
                Self::infer_from_text(text)?
            }
        };
        let df = Self::all_missing_as_numeric(df)?;

        let dataset = Dataset::new(df);
        log::info!(
            "Loaded CSV: {} rows, {} columns",
            dataset.row_count(),
            dataset.column_count()
        );
        Ok(dataset)
    }

    fn read(&self, bytes: &[u8], infer_schema_rows: Option<usize>) -> PolarsResult<DataFrame> {
        let null_values = NullValues::AllColumns(NA_TOKENS.iter().map(|t| (*t).into()).collect());

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(infer_schema_rows)
            .map_parse_options(|opts| {
                opts.with_separator(b',')
                    .with_null_values(Some(null_values.clone()))
            })
            .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
            .finish()
    }

    /// Each text column becomes Int64, else Float64, else stays text.
    fn infer_from_text(df: DataFrame) -> PolarsResult<DataFrame> {
        let columns = df
            .get_columns()
            .iter()
            .map(|col| {
                let series = col.as_materialized_series();
                let typed = series
                    .strict_cast(&DataType::Int64)
                    .or_else(|_| series.strict_cast(&DataType::Float64))
                    .unwrap_or_else(|_| series.clone());
                Column::from(typed)
            })
            .collect();
        DataFrame::new(columns)
    }

    /// A column with no values at all is numeric (all NaN), not text.
    fn all_missing_as_numeric(df: DataFrame) -> PolarsResult<DataFrame> {
        if df.height() == 0 {
            return Ok(df);
        }
        let columns = df
            .get_columns()
            .iter()
            .map(|col| {
                if col.null_count() == col.len()
                    && ColumnKind::from_dtype(col.dtype()) == ColumnKind::Categorical
                {
                    col.cast(&DataType::Float64)
                } else {
                    Ok(col.clone())
                }
            })
            .collect::<PolarsResult<Vec<_>>>()?;
        DataFrame::new(columns)
    }

    /// Read a CSV file from disk and parse it.
    pub fn load_csv_file(&self, path: &Path) -> Result<Dataset, LoaderError> {
        let bytes = std::fs::read(path)?;
        self.load_csv_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "name,score,age\n\
                       ann,1.5,30\n\
                       bob,NA,41\n\
                       cid,2,\n";

    #[test]
    fn row_count_matches_data_lines() {
        let ds = DataLoader::default().load_csv_bytes(CSV.as_bytes()).unwrap();
        assert_eq!(ds.row_count(), 3);
        assert_eq!(ds.column_names(), vec!["name", "score", "age"]);
    }

    #[test]
    fn na_tokens_do_not_block_numeric_inference() {
        let ds = DataLoader::default().load_csv_bytes(CSV.as_bytes()).unwrap();
        assert_eq!(ds.kind_of("name"), Some(ColumnKind::Categorical));
        assert_eq!(ds.kind_of("score"), Some(ColumnKind::Numeric));
        assert_eq!(ds.kind_of("age"), Some(ColumnKind::Numeric));
        assert_eq!(
            ds.numeric_values("score").unwrap(),
            vec![Some(1.5), None, Some(2.0)]
        );
    }

    #[test]
    fn mixed_column_is_categorical() {
        let csv = "code\n1\n2\nx7\n";
        let ds = DataLoader::default().load_csv_bytes(csv.as_bytes()).unwrap();
        assert_eq!(ds.kind_of("code"), Some(ColumnKind::Categorical));
    }

    #[test]
    fn header_only_file_has_zero_rows() {
        let ds = DataLoader::default().load_csv_bytes(b"a,b\n").unwrap();
        assert_eq!(ds.row_count(), 0);
        assert_eq!(ds.column_count(), 2);
    }

    #[test]
    fn empty_upload_is_a_parse_error() {
        let result = DataLoader::default().load_csv_bytes(b"");
        assert!(matches!(result, Err(LoaderError::Parse(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = DataLoader::default().load_csv_file(Path::new("/definitely/not/here.csv"));
        assert!(matches!(result, Err(LoaderError::Io(_))));
    }

    #[test]
    fn column_without_values_is_numeric() {
        let ds = DataLoader::default()
            .load_csv_bytes(b"name,score\na,NA\nb,\n")
            .unwrap();
        assert_eq!(ds.kind_of("score"), Some(ColumnKind::Numeric));
        assert_eq!(ds.numeric_values("score").unwrap(), vec![None, None]);
        assert_eq!(ds.kind_of("name"), Some(ColumnKind::Categorical));
    }

    #[test]
    fn integer_beyond_i64_reads_as_float() {
        let ds = DataLoader::default()
            .load_csv_bytes(b"id,tag\n1,a\n99999999999999999999,b\n")
            .unwrap();
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.kind_of("id"), Some(ColumnKind::Numeric));
        assert_eq!(ds.kind_of("tag"), Some(ColumnKind::Categorical));
        assert_eq!(
            ds.numeric_values("id").unwrap(),
            vec![Some(1.0), Some(99999999999999999999.0)]
        );
    }
}
