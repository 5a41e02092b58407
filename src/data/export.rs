//! CSV Exporter
//! Serializes a (filtered) dataset back to UTF-8 CSV for download.

use super::dataset::Dataset;
use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::Path;

/// Suggested file name for the download.
pub const EXPORT_FILE_NAME: &str = "filtered_data.csv";
/// MIME type of the exported bytes.
pub const EXPORT_MIME: &str = "text/csv";

pub struct CsvExporter;

impl CsvExporter {
    /// Header row plus one line per row, no index column.
    /// A zero-row dataset yields the header alone.
    pub fn to_csv_bytes(dataset: &Dataset) -> PolarsResult<Vec<u8>> {
        let mut df = dataset.dataframe().clone();
        let mut buf: Vec<u8> = Vec::new();
        CsvWriter::new(&mut buf)
            .include_header(true)
            .with_separator(b',')
            .finish(&mut df)?;
        Ok(buf)
    }

    /// Write the export to `path`.
    pub fn save(dataset: &Dataset, path: &Path) -> Result<()> {
        let bytes = Self::to_csv_bytes(dataset).context("serializing filtered data")?;
        std::fs::write(path, bytes)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!(
            "Exported {} rows ({}) to {}",
            dataset.row_count(),
            EXPORT_MIME,
            path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataFilter, DataLoader, FilterPredicate};

    const CSV: &str = "item,qty,price\n\
                       apple,3,0.5\n\
                       pear,,1.25\n\
                       plum,7,2\n";

    fn load(bytes: &[u8]) -> Dataset {
        DataLoader::default().load_csv_bytes(bytes).unwrap()
    }

    #[test]
    fn export_reload_keeps_names_rows_and_values() {
        let original = load(CSV.as_bytes());
        let bytes = CsvExporter::to_csv_bytes(&original).unwrap();
        let reloaded = load(&bytes);

        assert_eq!(reloaded.column_names(), original.column_names());
        assert_eq!(reloaded.row_count(), original.row_count());
        assert_eq!(reloaded.text_values("item"), original.text_values("item"));
        assert_eq!(reloaded.numeric_values("qty"), original.numeric_values("qty"));
        assert_eq!(
            reloaded.numeric_values("price"),
            original.numeric_values("price")
        );
    }

    #[test]
    fn filtered_export_contains_only_kept_rows() {
        let ds = load(CSV.as_bytes());
        let predicate = FilterPredicate::Categories {
            allowed: ["plum".to_string()].into_iter().collect(),
            include_missing: false,
        };
        let filtered = DataFilter::apply(&ds, "item", &predicate);
        let text = String::from_utf8(CsvExporter::to_csv_bytes(&filtered).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "item,qty,price");
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("plum,7,"));
    }

    #[test]
    fn empty_dataset_exports_header_only() {
        let ds = load(CSV.as_bytes()).empty_like();
        let text = String::from_utf8(CsvExporter::to_csv_bytes(&ds).unwrap()).unwrap();
        assert_eq!(text.trim_end(), "item,qty,price");
    }
}
