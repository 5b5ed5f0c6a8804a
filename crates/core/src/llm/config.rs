//! Model client configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ConfigError;

/// Model API provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LlmProvider {
    /// OpenAI (or any OpenAI-compatible chat completions endpoint).
    #[default]
    #[serde(rename = "openai")]
    OpenAi,
    /// Local Ollama instance.
    #[serde(rename = "ollama")]
    Ollama,
}

impl LlmProvider {
    pub fn requires_api_key(&self) -> bool {
        matches!(self, LlmProvider::OpenAi)
    }
}

/// Model client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProvider,
    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,
    /// Literal API key. Prefer `api_key_env`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Custom API base URL (for proxies or self-hosted).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Maximum tokens for completions.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_max_tokens() -> u32 {
    4096
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            model: default_model(),
            api_key: None,
            api_key_env: default_api_key_env(),
            api_base: None,
            timeout_secs: default_timeout(),
            max_tokens: default_max_tokens(),
            retry: RetryConfig::default(),
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Resolve the credential: the literal key first, then the named
    /// environment variable.
    ///
    /// Returns `Ok(None)` for providers that need no key.
    pub fn resolve_api_key(&self) -> Result<Option<String>, ConfigError> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    pub(crate) fn resolve_api_key_with<F>(&self, lookup: F) -> Result<Option<String>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.is_empty()) {
            return Ok(Some(key.clone()));
        }
        if let Some(key) = lookup(&self.api_key_env).filter(|k| !k.is_empty()) {
            return Ok(Some(key));
        }
        if self.provider.requires_api_key() {
            return Err(ConfigError::MissingCredential(self.api_key_env.clone()));
        }
        Ok(None)
    }
}

/// Bounded exponential backoff for retryable provider errors.
///
/// `max_attempts = 1` disables retrying.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per call, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the first retry in milliseconds.
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,
    /// Upper bound on any single delay in milliseconds.
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
    /// Exponential backoff multiplier.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

fn default_max_attempts() -> u32 {
    1
}

fn default_initial_delay() -> u64 {
    500
}

fn default_max_delay() -> u64 {
    8000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay(),
            max_delay_ms: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = self.backoff_multiplier.max(1.0).powi(retry.saturating_sub(1) as i32);
        let millis = (self.initial_delay_ms as f64 * factor).min(self.max_delay_ms as f64);
        Duration::from_millis(millis as u64)
    }
}
