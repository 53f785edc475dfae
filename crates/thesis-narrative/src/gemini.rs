//! Single-prompt provider with model variants

use crate::config::GeminiConfig;
use crate::provider::{NarrativeProvider, NarrativeRequest};
use crate::{ProviderError, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

const PROVIDER: &str = "Gemini";

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f64,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Vec<TextPart>,
}

#[derive(Deserialize)]
struct TextPart {
    text: String,
}

pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { config, client })
    }

    fn attempt_model(
        &self,
        model: &str,
        prompt: &str,
        request: &NarrativeRequest,
    ) -> Result<String> {
        let url = format!(
            "{}/models/{model}:generateContent",
            self.config.base_url.trim_end_matches('/')
        );
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        };
        let response = self
            .client
            .post(url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()?;
        let status = response.status();
        let text = response.text()?;
        if status != StatusCode::OK {
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
                body: text,
            });
        }
        parse_generate_response(&text)
    }
}

impl NarrativeProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini-flash"
    }

    #[instrument(skip_all, fields(provider = PROVIDER))]
    fn attempt(&self, request: &NarrativeRequest) -> Result<String> {
        if self.config.api_key.is_empty() {
            return Err(ProviderError::MissingKey(PROVIDER));
        }
        let prompt = request.full_prompt();
        let mut last_error = ProviderError::Unavailable("no Gemini models configured".to_string());
        for model in &self.config.models {
            match self.attempt_model(model, &prompt, request) {
                Ok(text) => {
                    debug!(model = %model, "model answered");
                    return Ok(text);
                }
                Err(e) => {
                    warn!(model = %model, error = %e, "model failed");
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }
}

fn parse_generate_response(body: &str) -> Result<String> {
    let malformed = |reason: String| ProviderError::MalformedResponse {
        provider: PROVIDER,
        reason,
    };
    let parsed: GenerateResponse =
        serde_json::from_str(body).map_err(|e| malformed(e.to_string()))?;
    parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().next())
        .map(|p| p.text)
        .ok_or_else(|| malformed("no candidate text".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_fails_without_request() {
        let p = GeminiProvider::new(GeminiConfig::default(), Duration::from_secs(1)).unwrap();
        let err = p.attempt(&NarrativeRequest::new("x")).unwrap_err();
        assert!(matches!(err, ProviderError::MissingKey("Gemini")));
    }

    #[test]
    fn test_no_models_is_unavailable() {
        let config = GeminiConfig {
            api_key: "key".to_string(),
            models: Vec::new(),
            ..GeminiConfig::default()
        };
        let p = GeminiProvider::new(config, Duration::from_secs(1)).unwrap();
        assert!(matches!(
            p.attempt(&NarrativeRequest::new("x")),
            Err(ProviderError::Unavailable(_))
        ));
    }

    #[test]
    fn test_parse_candidate_text() {
        let body = r#"{"candidates": [{"content": {"parts": [{"text": "A moderate association."}], "role": "model"}}]}"#;
        assert_eq!(parse_generate_response(body).unwrap(), "A moderate association.");
        assert!(parse_generate_response(r#"{"candidates": []}"#).is_err());
        assert!(parse_generate_response(r#"{"error": {"code": 429}}"#).is_err());
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: "prompt" }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                max_output_tokens: 2000,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "prompt");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 2000);
    }
}
