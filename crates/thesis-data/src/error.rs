//! Error types for thesis-data

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Core(#[from] thesis_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Column not found: {0}")]
    InvalidColumn(String),

    #[error("Type mismatch for column '{column}': expected {expected}, got {got}")]
    TypeMismatch {
        column: String,
        expected: String,
        got: String,
    },

    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),

    #[error("Version '{version}' not found for dataset {dataset}")]
    VersionNotFound { dataset: String, version: String },

    #[error("Version '{version}' already exists for dataset {dataset}")]
    VersionExists { dataset: String, version: String },

    #[error("Dataset {0} is unavailable: a writer panicked while holding it")]
    Poisoned(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, Error>;
