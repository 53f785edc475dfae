//! Error type for the workbench facade

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Core(#[from] thesis_core::Error),

    #[error("{0}")]
    Data(#[from] thesis_data::Error),

    #[error("{0}")]
    Assumptions(#[from] thesis_assumptions::Error),

    #[error("{0}")]
    Engine(#[from] thesis_engine::Error),

    #[error("{0}")]
    Report(#[from] thesis_report::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid value for {variable}: {reason}")]
    Env {
        variable: &'static str,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
