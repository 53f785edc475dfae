//! Error types for the test engine
//!
//! Nothing in this type reaches callers of [`crate::TestEngine::run`]: the
//! engine folds every error into an error-only [`crate::ResultRecord`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Core(#[from] thesis_core::Error),

    #[error("{0}")]
    Data(#[from] thesis_data::Error),

    #[error("{0}")]
    Assumptions(#[from] thesis_assumptions::Error),

    #[error("Missing parameter '{parameter}' for {selector}")]
    MissingParameter {
        selector: &'static str,
        parameter: &'static str,
    },

    #[error("Unknown test '{0}'")]
    UnknownSelector(String),

    #[error("{0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, Error>;
