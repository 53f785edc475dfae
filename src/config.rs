//! Workbench configuration
//!
//! Settings come from a TOML document, with API keys and the significance
//! level optionally overridden from the environment:
//!
//! ```toml
//! alpha = 0.01
//!
//! [narrative]
//! enabled = true
//! timeout_secs = 30
//!
//! [narrative.deepseek]
//! api_key = "sk-..."
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thesis_core::check_alpha;
use thesis_narrative::NarrativeConfig;
use tracing::debug;

pub const DEEPSEEK_KEY_VAR: &str = "DEEPSEEK_API_KEY";
pub const GEMINI_KEY_VAR: &str = "GEMINI_API_KEY";
pub const ALPHA_VAR: &str = "THESIS_ALPHA";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbenchConfig {
    /// Significance level used when a request does not carry its own
    pub alpha: f64,
    pub narrative: NarrativeConfig,
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            alpha: thesis_core::DEFAULT_ALPHA,
            narrative: NarrativeConfig::default(),
        }
    }
}

impl WorkbenchConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading configuration");
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Overlay values from the process environment
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Overlay values from `lookup`; unset and empty variables are ignored
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(key) = lookup(DEEPSEEK_KEY_VAR) {
            self.narrative.deepseek.api_key = key;
        }
        if let Some(key) = lookup(GEMINI_KEY_VAR) {
            self.narrative.gemini.api_key = key;
        }
        if let Some(raw) = lookup(ALPHA_VAR) {
            self.alpha = raw.trim().parse().map_err(|e: std::num::ParseFloatError| Error::Env {
                variable: ALPHA_VAR,
                reason: e.to_string(),
            })?;
        }
        self.validate()
    }

    fn validate(self) -> Result<Self> {
        check_alpha(self.alpha)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let c = WorkbenchConfig::default();
        assert_eq!(c.alpha, 0.05);
        assert!(c.narrative.enabled);
        assert_eq!(c.narrative.timeout_secs, 60);
        assert_eq!(c.narrative.deepseek.model, "deepseek-reasoner");
        assert_eq!(
            c.narrative.gemini.models,
            vec!["gemini-3-flash-preview", "gemini-2.5-flash"]
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let c = WorkbenchConfig::from_toml_str(
            "alpha = 0.01\n[narrative]\ntimeout_secs = 5\n[narrative.deepseek]\napi_key = \"k\"\n",
        )
        .unwrap();
        assert_eq!(c.alpha, 0.01);
        assert_eq!(c.narrative.timeout_secs, 5);
        assert_eq!(c.narrative.deepseek.api_key, "k");
        assert_eq!(c.narrative.deepseek.base_url, "https://api.deepseek.com/v1");
        assert_eq!(c.narrative.max_tokens, 2000);
    }

    #[test]
    fn test_alpha_out_of_range_rejected() {
        assert!(matches!(
            WorkbenchConfig::from_toml_str("alpha = 1.5"),
            Err(Error::Core(thesis_core::Error::InvalidParameter(_)))
        ));
        assert!(matches!(
            WorkbenchConfig::from_toml_str("alpha = \"high\""),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (DEEPSEEK_KEY_VAR, "ds-key"),
            (GEMINI_KEY_VAR, ""),
            (ALPHA_VAR, " 0.1 "),
        ]
        .into_iter()
        .collect();
        let c = WorkbenchConfig::default()
            .with_overrides(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(c.narrative.deepseek.api_key, "ds-key");
        assert!(c.narrative.gemini.api_key.is_empty());
        assert_eq!(c.alpha, 0.1);
    }

    #[test]
    fn test_bad_alpha_override() {
        let err = WorkbenchConfig::default()
            .with_overrides(|name| (name == ALPHA_VAR).then(|| "five percent".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ALPHA_VAR));
    }
}
