//! Narrative interpretation of thesis-stats results
//!
//! A [`NarrativeRequestor`] holds an ordered list of [`NarrativeProvider`]s
//! and asks each in turn until one returns text. When the list is exhausted
//! it answers with a fixed template and `success = false`; it never returns
//! an error. Provider failures (missing key, non-200 status, timeout,
//! malformed body) are logged with `tracing` and swallowed.
//!
//! ```rust
//! use thesis_narrative::{NarrativeConfig, NarrativeRequestor, FALLBACK_PROVIDER};
//! use thesis_engine::ResultRecord;
//!
//! // no API keys configured: both providers fail immediately
//! let requestor = NarrativeRequestor::from_config(&NarrativeConfig::default());
//! let record = ResultRecord::failed("T-test requires exactly 2 groups, found 3");
//! let out = requestor.interpret(&record, "Compare teaching methods");
//! assert!(!out.success);
//! assert_ne!(out.provider_used, FALLBACK_PROVIDER);
//! ```

mod config;
mod deepseek;
mod error;
mod gemini;
pub mod prompts;
mod provider;
mod requestor;

pub use config::{
    DeepSeekConfig, GeminiConfig, NarrativeConfig, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE,
    DEFAULT_TIMEOUT_SECS,
};
pub use deepseek::DeepSeekProvider;
pub use error::{ProviderError, Result};
pub use gemini::GeminiProvider;
pub use provider::{ChatMessage, NarrativeProvider, NarrativeRequest};
pub use requestor::{Interpretation, NarrativeRequestor, FALLBACK_PROVIDER};
