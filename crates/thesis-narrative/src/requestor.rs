//! Ordered provider fallback

use crate::config::NarrativeConfig;
use crate::deepseek::DeepSeekProvider;
use crate::gemini::GeminiProvider;
use crate::prompts::{
    descriptive_prompt, methods_prompt, result_prompt, FALLBACK_TEXT, SYSTEM_PROMPT,
};
use crate::provider::{NarrativeProvider, NarrativeRequest};
use serde::{Deserialize, Serialize};
use thesis_engine::{Descriptives, ResultRecord};
use tracing::{info, instrument, warn};

/// Reported as `provider_used` when every provider failed
pub const FALLBACK_PROVIDER: &str = "fallback-template";

const EXHAUSTED: &str = "All AI services unavailable. Using template response.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    pub success: bool,
    pub text: String,
    pub provider_used: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Interpretation {
    fn fallback() -> Self {
        Self {
            success: false,
            text: FALLBACK_TEXT.to_string(),
            provider_used: FALLBACK_PROVIDER.to_string(),
            error: Some(EXHAUSTED.to_string()),
        }
    }
}

/// Tries each provider in order; never fails
pub struct NarrativeRequestor {
    providers: Vec<Box<dyn NarrativeProvider>>,
    temperature: f64,
    max_tokens: u32,
}

impl NarrativeRequestor {
    pub fn with_providers(providers: Vec<Box<dyn NarrativeProvider>>) -> Self {
        let defaults = NarrativeConfig::default();
        Self {
            providers,
            temperature: defaults.temperature,
            max_tokens: defaults.max_tokens,
        }
    }

    /// DeepSeek then Gemini; no providers when narrative generation is
    /// disabled
    pub fn from_config(config: &NarrativeConfig) -> Self {
        let mut providers: Vec<Box<dyn NarrativeProvider>> = Vec::new();
        if config.enabled {
            match DeepSeekProvider::new(config.deepseek.clone(), config.timeout()) {
                Ok(p) => providers.push(Box::new(p)),
                Err(e) => warn!(error = %e, "DeepSeek provider unavailable"),
            }
            match GeminiProvider::new(config.gemini.clone(), config.timeout()) {
                Ok(p) => providers.push(Box::new(p)),
                Err(e) => warn!(error = %e, "Gemini provider unavailable"),
            }
        }
        Self {
            providers,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    fn request(&self, prompt: String, system: bool) -> NarrativeRequest {
        let mut request = NarrativeRequest::new(prompt);
        request.temperature = self.temperature;
        request.max_tokens = self.max_tokens;
        if system {
            request = request.with_system(SYSTEM_PROMPT);
        }
        request
    }

    /// First provider answer, or the fixed fallback text
    #[instrument(skip_all, fields(providers = self.providers.len()))]
    pub fn generate(&self, request: &NarrativeRequest) -> Interpretation {
        for provider in &self.providers {
            match provider.attempt(request) {
                Ok(text) if !text.trim().is_empty() => {
                    info!(provider = provider.name(), "narrative generated");
                    return Interpretation {
                        success: true,
                        text,
                        provider_used: provider.name().to_string(),
                        error: None,
                    };
                }
                Ok(_) => warn!(provider = provider.name(), "empty narrative"),
                Err(e) => warn!(provider = provider.name(), error = %e, "provider failed"),
            }
        }
        warn!("falling back to template interpretation");
        Interpretation::fallback()
    }

    /// Interpret one result against a research objective
    ///
    /// An error-only record is answered without calling any provider.
    pub fn interpret(&self, record: &ResultRecord, objective: &str) -> Interpretation {
        match record {
            ResultRecord::Failed { error } => Interpretation {
                success: false,
                text: String::new(),
                provider_used: "none".to_string(),
                error: Some(error.clone()),
            },
            ResultRecord::Complete(result) => {
                self.generate(&self.request(result_prompt(result, objective), true))
            }
        }
    }

    pub fn describe_sample(
        &self,
        descriptives: &Descriptives,
        sample_size: usize,
    ) -> Interpretation {
        self.generate(&self.request(descriptive_prompt(descriptives, sample_size), false))
    }

    pub fn methods_section(
        &self,
        tests_used: &[String],
        variables: &[String],
        alpha: f64,
    ) -> Interpretation {
        self.generate(&self.request(methods_prompt(tests_used, variables, alpha), false))
    }
}
