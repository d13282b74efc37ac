//! FILENAME: core/persistence/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Workbook read error: {0}")]
    WorkbookRead(#[from] calamine::Error),

    #[error("Delimited read error: {0}")]
    CsvRead(#[from] csv::Error),

    #[error("Cache archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Cache encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Missing data: {0}")]
    MissingData(String),

    #[error("Invalid cache entry: {0}")]
    InvalidCacheEntry(String),
}
