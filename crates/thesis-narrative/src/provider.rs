//! The provider seam

use crate::config::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::Result;
use serde::Serialize;

/// One prompt with its generation settings
#[derive(Debug, Clone, PartialEq)]
pub struct NarrativeRequest {
    pub system: Option<String>,
    pub prompt: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl NarrativeRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Role-tagged message list for chat-style APIs
    pub fn messages(&self) -> Vec<ChatMessage<'_>> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &self.system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &self.prompt,
        });
        messages
    }

    /// System prompt and user prompt joined for single-string APIs
    pub fn full_prompt(&self) -> String {
        match &self.system {
            Some(system) => format!("{system}\n\n{}", self.prompt),
            None => self.prompt.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

/// A text-generation backend
///
/// An attempt either returns the generated text or an error; it never
/// retries on its own. Ordering and fallback belong to
/// [`crate::NarrativeRequestor`].
pub trait NarrativeProvider: Send + Sync {
    /// Reported as `provider_used` on success
    fn name(&self) -> &str;

    fn attempt(&self, request: &NarrativeRequest) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_with_system() {
        let r = NarrativeRequest::new("interpret this").with_system("be brief");
        let m = r.messages();
        assert_eq!(m.len(), 2);
        assert_eq!(m[0].role, "system");
        assert_eq!(m[1].content, "interpret this");
        assert_eq!(r.full_prompt(), "be brief\n\ninterpret this");
    }

    #[test]
    fn test_messages_without_system() {
        let r = NarrativeRequest::new("describe the sample");
        assert_eq!(r.messages().len(), 1);
        assert_eq!(r.full_prompt(), "describe the sample");
        assert_eq!(r.temperature, 0.7);
        assert_eq!(r.max_tokens, 2000);
    }
}
