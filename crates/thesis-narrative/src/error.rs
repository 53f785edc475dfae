//! Provider failures
//!
//! These never reach callers of [`crate::NarrativeRequestor`]: a failed
//! attempt is logged and the next provider is tried.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{0} API key is not configured")]
    MissingKey(&'static str),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} returned status {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("Malformed response from {provider}: {reason}")]
    MalformedResponse {
        provider: &'static str,
        reason: String,
    },

    #[error("{0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, ProviderError>;
