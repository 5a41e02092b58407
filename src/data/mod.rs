//! Data module - CSV loading, filtering and export

mod dataset;
mod export;
mod filter;
mod loader;

pub use dataset::{ColumnInfo, ColumnKind, Dataset, TablePreview};
pub use export::{CsvExporter, EXPORT_FILE_NAME, EXPORT_MIME};
pub use filter::{DataFilter, FilterPredicate};
pub use loader::{DataLoader, LoaderError};
