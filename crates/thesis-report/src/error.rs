//! Error types for table building

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The record carried an error instead of a result; the message is
    /// passed through unchanged
    #[error("{0}")]
    ErrorRecord(String),

    #[error("{0}")]
    Core(#[from] thesis_core::Error),

    #[error("{0}")]
    Data(#[from] thesis_data::Error),

    #[error("Correlation matrix requires at least 2 variables, got {0}")]
    TooFewVariables(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
