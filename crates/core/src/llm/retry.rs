//! Retry and instrumentation wrapper around any [`LlmClient`].

use async_trait::async_trait;
use std::time::Instant;
use tracing::{debug, warn};

use super::client::{CompletionRequest, CompletionResponse, LlmClient, LlmError};
use super::config::RetryConfig;
use crate::metrics;

/// Wraps a client with bounded exponential backoff and call metrics.
///
/// Only errors for which [`LlmError::is_retryable`] holds are retried.
pub struct RetryingClient<C: LlmClient> {
    inner: C,
    retry: RetryConfig,
}

impl<C: LlmClient> RetryingClient<C> {
    pub fn new(inner: C, retry: RetryConfig) -> Self {
        Self { inner, retry }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

#[async_trait]
impl<C: LlmClient> LlmClient for RetryingClient<C> {
    fn provider(&self) -> &str {
        self.inner.provider()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let provider = self.inner.provider();
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let started = Instant::now();
            let result = self.inner.complete(request.clone()).await;
            let elapsed = started.elapsed();

            metrics::LLM_REQUEST_DURATION
                .with_label_values(&[provider])
                .observe(elapsed.as_secs_f64());

            match result {
                Ok(response) => {
                    metrics::LLM_REQUESTS.with_label_values(&[provider, "ok"]).inc();
                    metrics::LLM_TOKENS
                        .with_label_values(&[provider, "input"])
                        .inc_by(response.usage.input_tokens as u64);
                    metrics::LLM_TOKENS
                        .with_label_values(&[provider, "output"])
                        .inc_by(response.usage.output_tokens as u64);
                    debug!(
                        provider,
                        model = %response.model,
                        input_tokens = response.usage.input_tokens,
                        output_tokens = response.usage.output_tokens,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Model call completed"
                    );
                    return Ok(response);
                }
                Err(e) => {
                    metrics::LLM_REQUESTS.with_label_values(&[provider, "error"]).inc();
                    if attempt >= max_attempts || !e.is_retryable() {
                        return Err(e);
                    }

                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        provider,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "Model call failed, retrying: {}",
                        e
                    );
                    metrics::LLM_RETRIES.with_label_values(&[provider]).inc();
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
