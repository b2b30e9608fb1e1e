//! Error types for the house price training pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// Reference dataset is missing
    #[error("Reference data does not exist in path: {}", .path.display())]
    DataNotFound { path: PathBuf },

    /// Test fraction outside of (0, 1)
    #[error("Invalid test size {0}: must be in (0, 1)")]
    InvalidTestSize(f64),

    /// Split would leave one of the partitions empty
    #[error("Cannot split {n_samples} samples with test size {test_size}: a partition would be empty")]
    InvalidSplit { n_samples: usize, test_size: f64 },

    /// Requested column is not in the CSV header
    #[error("Column not found in dataset: {0}")]
    MissingColumn(String),

    /// Cell could not be parsed as a number
    #[error("Failed to parse {column} = {value:?} on line {line}")]
    Parse {
        line: u64,
        column: String,
        value: String,
    },

    /// Input arrays do not have the expected shape
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// NaN or infinite value where a finite number is required
    #[error("Non-finite value: {0}")]
    NonFinite(&'static str),

    /// No samples to work with
    #[error("Empty input: {0}")]
    EmptyInput(&'static str),

    /// Predict called before fit
    #[error("Model has not been fitted")]
    NotFitted,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Model (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ndarray construction error
    #[error("Array error: {0}")]
    Array(#[from] ndarray::ShapeError),
}

impl Error {
    /// Check if this error means the input data was missing
    pub fn is_data_not_found(&self) -> bool {
        matches!(self, Error::DataNotFound { .. })
    }
}
