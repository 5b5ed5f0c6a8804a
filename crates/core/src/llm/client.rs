//! Chat completion client abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Error type for model API calls (transport, auth, rate limiting).
#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Not configured: {0}")]
    NotConfigured(String),
}

impl LlmError {
    /// Whether a repeated call has a reasonable chance of succeeding.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Http(_) | LlmError::Timeout(_) => true,
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            LlmError::Json(_) | LlmError::NotConfigured(_) => false,
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            LlmError::Timeout(timeout)
        } else {
            LlmError::Http(err.to_string())
        }
    }
}

/// Token usage statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Request for a completion.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System prompt (instructions for the model)
    pub system: Option<String>,
    /// User message
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            max_tokens: 4096,
            temperature: 0.0,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Response from a completion.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// The generated text
    pub text: String,
    /// Token usage
    pub usage: LlmUsage,
    /// Model that answered
    pub model: String,
}

/// A chat-style completion endpoint.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Provider name (e.g., "openai", "ollama")
    fn provider(&self) -> &str;

    /// Model identifier sent with every request.
    fn model(&self) -> &str;

    /// Send a system/user message pair and return the single text completion.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_request_builder() {
        let request = CompletionRequest::new("Hello")
            .with_system("You are helpful")
            .with_max_tokens(100)
            .with_temperature(0.3);

        assert_eq!(request.prompt, "Hello");
        assert_eq!(request.system, Some("You are helpful".to_string()));
        assert_eq!(request.max_tokens, 100);
        assert_eq!(request.temperature, 0.3);
    }

    #[test]
    fn test_retryable_classification() {
        assert!(LlmError::Http("connection reset".into()).is_retryable());
        assert!(LlmError::Timeout(Duration::from_secs(5)).is_retryable());
        assert!(LlmError::Api { status: 429, message: "slow down".into() }.is_retryable());
        assert!(LlmError::Api { status: 503, message: "unavailable".into() }.is_retryable());
        assert!(!LlmError::Api { status: 401, message: "bad key".into() }.is_retryable());
        assert!(!LlmError::Json("eof".into()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = LlmError::Api {
            status: 401,
            message: "invalid api key".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 401 - invalid api key");
    }
}
