use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::generator::GenerationConfig;
use crate::llm::{LlmConfig, LlmProvider, RetryConfig};
use crate::orchestrator::BaselineConfig;

/// Root configuration. Every section has defaults, so an empty file is valid.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub baseline: BaselineConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Config {
    /// The ticket collection the baseline reads: explicit path, else the
    /// generation output.
    pub fn tickets_path(&self) -> PathBuf {
        self.baseline
            .tickets_path
            .clone()
            .unwrap_or_else(|| self.generation.output_path.clone())
    }
}

/// Metrics export configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MetricsConfig {
    /// Where the Prometheus text exposition is written on exit.
    #[serde(default)]
    pub textfile_path: Option<PathBuf>,
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub llm: SanitizedLlmConfig,
    pub generation: GenerationConfig,
    pub baseline: BaselineConfig,
    pub metrics: MetricsConfig,
}

/// Sanitized model client config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedLlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub api_key_configured: bool,
    pub api_key_env: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub retry: RetryConfig,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let llm = &config.llm;
        Self {
            llm: SanitizedLlmConfig {
                provider: llm.provider,
                model: llm.model.clone(),
                api_key_configured: llm.api_key.as_ref().is_some_and(|k| !k.is_empty()),
                api_key_env: llm.api_key_env.clone(),
                api_base: llm.api_base.clone(),
                timeout_secs: llm.timeout_secs,
                max_tokens: llm.max_tokens,
                retry: llm.retry.clone(),
            },
            generation: config.generation.clone(),
            baseline: config.baseline.clone(),
            metrics: config.metrics.clone(),
        }
    }
}
