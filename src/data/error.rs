//! Error types for data operations
//!
//! Provides unified error handling for ingestion, chart building, export and
//! the storage collaborator.

use thiserror::Error;

// Re-export CSV limits from constants module for consistency
pub use crate::constants::{MAX_CSV_ROWS, MAX_CSV_SIZE_MB};

/// Errors that can occur during data operations
#[derive(Error, Debug)]
pub enum DataError {
    /// IO error from std::io
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input is not valid UTF-8 text
    #[error("File is not valid UTF-8 text: {0}")]
    Encoding(String),

    /// File is too large for eager loading
    #[error("File too large: {size_mb}MB (max {max_mb}MB)")]
    TooLarge { size_mb: u64, max_mb: usize },

    /// Too many rows for eager loading
    #[error("Too many rows: {rows} (max {max_rows})")]
    TooManyRows { rows: usize, max_rows: usize },

    /// File is empty
    #[error("Empty file")]
    EmptyFile,

    /// No columns found in data
    #[error("No columns found")]
    NoColumns,

    /// File extension is not a supported input format
    #[error("Unsupported file type: {0}")]
    UnsupportedExtension(String),

    /// Archive could not be decoded
    #[error("Archive error: {0}")]
    Archive(String),

    /// Archive has no entry with the wanted extension
    #[error("No .{extension} entry found in archive")]
    NoMatchingEntry { extension: String },

    /// Chart requested without an x/y selection
    #[error("Select an X and a Y column first")]
    NoSelection,

    /// A column name that the current dataset does not have
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// A range bound that is NaN or infinite
    #[error("Range bound for {column} must be a finite number, got {value}")]
    InvalidBound { column: String, value: f64 },

    /// Save requested without a name
    #[error("A name is required")]
    MissingName,

    /// Rendering collaborator failed
    #[error("Render error: {0}")]
    Render(String),

    /// Image encoding failed
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// JSON error from serde_json
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Storage collaborator failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Generic error message
    #[error("{0}")]
    Other(String),
}

impl DataError {
    /// Errors raised while loading input; the current dataset stays in place
    pub fn is_ingestion(&self) -> bool {
        matches!(
            self,
            DataError::Io(_)
                | DataError::Encoding(_)
                | DataError::TooLarge { .. }
                | DataError::TooManyRows { .. }
                | DataError::EmptyFile
                | DataError::NoColumns
                | DataError::UnsupportedExtension(_)
                | DataError::Archive(_)
                | DataError::NoMatchingEntry { .. }
        )
    }

    /// Errors caused by an invalid request from the caller
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DataError::NoSelection
                | DataError::UnknownColumn(_)
                | DataError::InvalidBound { .. }
                | DataError::MissingName
        )
    }
}

/// Result type alias for data operations
pub type DataResult<T> = Result<T, DataError>;

impl From<String> for DataError {
    fn from(s: String) -> Self {
        DataError::Other(s)
    }
}

impl From<&str> for DataError {
    fn from(s: &str) -> Self {
        DataError::Other(s.to_string())
    }
}
