//! Chat-completions provider

use crate::config::DeepSeekConfig;
use crate::provider::{ChatMessage, NarrativeProvider, NarrativeRequest};
use crate::{ProviderError, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const PROVIDER: &str = "DeepSeek";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: String,
}

pub struct DeepSeekProvider {
    config: DeepSeekConfig,
    client: Client,
}

impl DeepSeekProvider {
    pub fn new(config: DeepSeekConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

impl NarrativeProvider for DeepSeekProvider {
    fn name(&self) -> &str {
        &self.config.model
    }

    #[instrument(skip_all, fields(provider = PROVIDER))]
    fn attempt(&self, request: &NarrativeRequest) -> Result<String> {
        if self.config.api_key.is_empty() {
            return Err(ProviderError::MissingKey(PROVIDER));
        }
        let body = ChatRequest {
            model: &self.config.model,
            messages: request.messages(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream: false,
        };
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
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
        debug!(bytes = text.len(), "response received");
        parse_chat_response(&text)
    }
}

fn parse_chat_response(body: &str) -> Result<String> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::MalformedResponse {
            provider: PROVIDER,
            reason: e.to_string(),
        })?;
    parsed
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| ProviderError::MalformedResponse {
            provider: PROVIDER,
            reason: "no choices".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_fails_without_request() {
        let p = DeepSeekProvider::new(DeepSeekConfig::default(), Duration::from_secs(1)).unwrap();
        let err = p.attempt(&NarrativeRequest::new("x")).unwrap_err();
        assert!(matches!(err, ProviderError::MissingKey("DeepSeek")));
        assert_eq!(p.name(), "deepseek-reasoner");
    }

    #[test]
    fn test_parse_first_choice() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": "The groups differed."}}]}"#;
        assert_eq!(parse_chat_response(body).unwrap(), "The groups differed.");
    }

    #[test]
    fn test_malformed_bodies() {
        assert!(matches!(
            parse_chat_response(r#"{"choices": []}"#),
            Err(ProviderError::MalformedResponse { .. })
        ));
        assert!(matches!(
            parse_chat_response("<html>bad gateway</html>"),
            Err(ProviderError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_request_body_shape() {
        let request = NarrativeRequest::new("prompt").with_system("system");
        let body = ChatRequest {
            model: "deepseek-reasoner",
            messages: request.messages(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "prompt");
        assert_eq!(json["temperature"], 0.7);
        assert_eq!(json["max_tokens"], 2000);
        assert_eq!(json["stream"], false);
    }
}
