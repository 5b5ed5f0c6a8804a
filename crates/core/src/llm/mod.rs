//! Model API access.
//!
//! Components never reach for a global client. [`build_client`] constructs
//! the configured provider once at startup and the resulting
//! `Arc<dyn LlmClient>` is handed to the generator and the evaluator.
//!
//! ```text
//!   LlmConfig ──► build_client ──► RetryingClient<OpenAiClient | OllamaClient>
//!                                         │
//!                         ┌───────────────┴───────────────┐
//!                         ▼                               ▼
//!                 TicketGenerator                    Evaluator
//! ```

mod client;
mod config;
mod ollama;
mod openai;
mod retry;

use std::sync::Arc;

pub use client::{CompletionRequest, CompletionResponse, LlmClient, LlmError, LlmUsage};
pub use config::{LlmConfig, LlmProvider, RetryConfig};
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;
pub use retry::RetryingClient;

use crate::config::ConfigError;

/// Construct the configured client, wrapped with retry and metrics.
///
/// A missing credential for a provider that needs one is a configuration
/// error; it is checked here, once.
pub fn build_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, ConfigError> {
    let timeout = config.timeout();
    let client_err = |e: LlmError| ConfigError::ValidationError(format!("llm client: {}", e));

    let client: Arc<dyn LlmClient> = match config.provider {
        LlmProvider::OpenAi => {
            let api_key = config
                .resolve_api_key()?
                .ok_or_else(|| ConfigError::MissingCredential(config.api_key_env.clone()))?;
            let mut client =
                OpenAiClient::new(api_key, config.model.clone(), timeout).map_err(client_err)?;
            if let Some(base) = &config.api_base {
                client = client.with_api_base(base.clone());
            }
            Arc::new(RetryingClient::new(client, config.retry.clone()))
        }
        LlmProvider::Ollama => {
            let mut client = OllamaClient::new(config.model.clone(), timeout).map_err(client_err)?;
            if let Some(base) = &config.api_base {
                client = client.with_api_base(base.clone());
            }
            Arc::new(RetryingClient::new(client, config.retry.clone()))
        }
    };

    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_openai_client_with_literal_key() {
        let config = LlmConfig {
            api_key: Some("sk-test".to_string()),
            model: "gpt-4o-mini".to_string(),
            ..Default::default()
        };
        let client = build_client(&config).unwrap();
        assert_eq!(client.provider(), "openai");
        assert_eq!(client.model(), "gpt-4o-mini");
    }

    #[test]
    fn test_build_ollama_client_without_key() {
        let config = LlmConfig {
            provider: LlmProvider::Ollama,
            model: "llama3".to_string(),
            api_key_env: "INCIDENT_EVAL_TEST_UNSET_KEY".to_string(),
            ..Default::default()
        };
        let client = build_client(&config).unwrap();
        assert_eq!(client.provider(), "ollama");
    }

    #[test]
    fn test_build_openai_without_key_fails() {
        let config = LlmConfig {
            api_key_env: "INCIDENT_EVAL_TEST_UNSET_KEY".to_string(),
            ..Default::default()
        };
        let result = build_client(&config);
        assert!(matches!(result, Err(ConfigError::MissingCredential(_))));
    }
}
