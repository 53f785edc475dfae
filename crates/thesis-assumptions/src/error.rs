//! Error types for thesis-assumptions

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Core(#[from] thesis_core::Error),

    #[error("{0}")]
    Data(#[from] thesis_data::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, Error>;
