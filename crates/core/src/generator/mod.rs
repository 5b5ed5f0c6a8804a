//! Synthetic ticket generation.
//!
//! One model call produces a whole batch. The response is parsed with the
//! structured extractor, each record is typed, and the batch is audited
//! against its constraints. Audit findings are reported next to the records
//! instead of discarding the batch.

mod audit;
mod config;
mod prompt;

use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::extract::{extract, ExtractError};
use crate::llm::{CompletionRequest, LlmClient, LlmError};
use crate::metrics;
use crate::ticket::Ticket;

pub use audit::{audit_batch, BatchReport, ValidationIssue};
pub use config::{GenerationConfig, GenerationConstraints};
pub use prompt::{build_user_prompt, GENERATION_SYSTEM_PROMPT};

/// Errors from a generation call.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("generation failed: {0}")]
    GenerationFailed(#[from] LlmError),

    #[error(transparent)]
    Malformed(#[from] ExtractError),

    /// The response parsed but holds no list of records.
    #[error("generation response is not a ticket list")]
    NotABatch { raw: String },
}

impl GenerateError {
    /// The raw model text, when the failure came after the call succeeded.
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            GenerateError::GenerationFailed(_) => None,
            GenerateError::Malformed(e) => Some(e.raw()),
            GenerateError::NotABatch { raw } => Some(raw),
        }
    }
}

/// A parsed generation response.
#[derive(Debug, Clone)]
pub struct GeneratedBatch {
    /// Every record exactly as the model returned it.
    pub records: Vec<Value>,
    /// Records that typed as tickets.
    pub tickets: Vec<Ticket>,
    pub report: BatchReport,
    /// Verbatim response text.
    pub raw_text: String,
}

/// Same as the `llm.max_tokens` default.
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Requests ticket batches from a model.
pub struct TicketGenerator {
    client: Arc<dyn LlmClient>,
    config: GenerationConfig,
    max_tokens: u32,
}

impl TicketGenerator {
    pub fn new(client: Arc<dyn LlmClient>, config: GenerationConfig) -> Self {
        Self {
            client,
            config,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Set the completion budget (`llm.max_tokens`).
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn build_request(&self, constraints: &GenerationConstraints) -> CompletionRequest {
        CompletionRequest::new(build_user_prompt(constraints))
            .with_system(GENERATION_SYSTEM_PROMPT)
            .with_temperature(self.config.temperature)
            .with_max_tokens(self.max_tokens)
    }

    /// Generate one batch.
    ///
    /// An unparseable response is re-requested up to `retry_malformed`
    /// times. API failures are returned as-is; the client layer owns
    /// transport retries.
    pub async fn generate_batch(
        &self,
        constraints: &GenerationConstraints,
    ) -> Result<GeneratedBatch, GenerateError> {
        let attempts = self.config.retry_malformed + 1;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let response = self.client.complete(self.build_request(constraints)).await?;
            debug!(
                attempt,
                response_len = response.text.len(),
                "Received generation response"
            );

            match parse_batch(response.text) {
                Ok((records, raw_text)) => {
                    let (tickets, report) = audit_batch(&records, constraints);
                    metrics::GENERATED_TICKETS.inc_by(records.len() as u64);

                    for issue in &report.issues {
                        warn!("Generated batch issue: {}", issue);
                    }
                    info!(
                        records = records.len(),
                        valid = tickets.len(),
                        issues = report.issues.len(),
                        "Generated ticket batch"
                    );

                    return Ok(GeneratedBatch {
                        records,
                        tickets,
                        report,
                        raw_text,
                    });
                }
                Err(e) if attempt < attempts => {
                    warn!(attempt, error = %e, "Unparseable generation response, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Accept a top-level array, or an object wrapping exactly one array.
fn parse_batch(raw_text: String) -> Result<(Vec<Value>, String), GenerateError> {
    let value = extract(&raw_text)?;

    let records = match value {
        Value::Array(items) => items,
        Value::Object(map) => {
            let mut arrays = map.into_iter().filter_map(|(_, v)| match v {
                Value::Array(items) => Some(items),
                _ => None,
            });
            match (arrays.next(), arrays.next()) {
                (Some(items), None) => items,
                _ => return Err(GenerateError::NotABatch { raw: raw_text }),
            }
        }
        _ => return Err(GenerateError::NotABatch { raw: raw_text }),
    };

    Ok((records, raw_text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockLlmClient};
    use crate::ticket::{AmbiguityLevel, RootCause};
    use serde_json::json;

    fn generator(client: Arc<MockLlmClient>) -> TicketGenerator {
        TicketGenerator::new(client, GenerationConfig::default())
    }

    #[tokio::test]
    async fn test_generate_valid_batch() {
        let client = Arc::new(MockLlmClient::new());
        client.push_text(fixtures::valid_batch_response());

        let gen = generator(client.clone());
        let batch = gen
            .generate_batch(&GenerationConstraints::default())
            .await
            .unwrap();

        assert_eq!(batch.records.len(), 12);
        assert_eq!(batch.tickets.len(), 12);
        assert!(batch.report.is_valid());
        assert!(batch.raw_text.starts_with("Sure, here are the tickets."));

        let recorded = client.recorded_requests();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].system.as_deref(), Some(GENERATION_SYSTEM_PROMPT));
        assert!((recorded[0].temperature - 0.7).abs() < f32::EPSILON);
        assert!(recorded[0].prompt.starts_with("Generate 12"));
        assert_eq!(recorded[0].max_tokens, 4096);
    }

    #[tokio::test]
    async fn test_max_tokens_reaches_request() {
        let client = Arc::new(MockLlmClient::new());
        client.push_text(fixtures::valid_batch_response());

        generator(client.clone())
            .with_max_tokens(8192)
            .generate_batch(&GenerationConstraints::default())
            .await
            .unwrap();

        assert_eq!(client.recorded_requests()[0].max_tokens, 8192);
    }

    #[tokio::test]
    async fn test_wrapped_object_is_unwrapped() {
        let records = vec![
            fixtures::ticket_record("A", RootCause::Unknown, AmbiguityLevel::High),
            fixtures::ticket_record("B", RootCause::CodeRegression, AmbiguityLevel::Low),
        ];
        let client = Arc::new(MockLlmClient::new());
        client.push_text(json!({ "tickets": records }).to_string());

        let batch = generator(client)
            .generate_batch(&GenerationConstraints::default())
            .await
            .unwrap();

        assert_eq!(batch.records.len(), 2);
        assert!(!batch.report.is_valid());
        assert!(batch.report.issues.contains(&ValidationIssue::SizeMismatch {
            expected: 12,
            actual: 2,
        }));
    }

    #[tokio::test]
    async fn test_object_without_single_array_is_rejected() {
        let client = Arc::new(MockLlmClient::new());
        client.push_text(r#"{"a": [], "b": []}"#);

        let result = generator(client)
            .generate_batch(&GenerationConstraints::default())
            .await;
        assert!(matches!(result, Err(GenerateError::NotABatch { .. })));
    }

    #[tokio::test]
    async fn test_malformed_response_keeps_raw_text() {
        let client = Arc::new(MockLlmClient::new());
        client.push_text("I cannot produce tickets today.");

        let err = generator(client)
            .generate_batch(&GenerationConstraints::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::Malformed(_)));
        assert_eq!(err.raw_output(), Some("I cannot produce tickets today."));
    }

    #[tokio::test]
    async fn test_malformed_response_is_retried_when_configured() {
        let client = Arc::new(MockLlmClient::new());
        client.push_text("```json\n[{\"ticket_id\": \"A\",]\n```");
        client.push_text(fixtures::valid_batch_response());

        let config = GenerationConfig {
            retry_malformed: 1,
            ..Default::default()
        };
        let gen = TicketGenerator::new(client.clone(), config);
        let batch = gen
            .generate_batch(&GenerationConstraints::default())
            .await
            .unwrap();

        assert_eq!(batch.tickets.len(), 12);
        assert_eq!(client.request_count(), 2);
    }

    #[tokio::test]
    async fn test_api_failure_is_not_retried_here() {
        let client = Arc::new(MockLlmClient::new());
        client.push_error(LlmError::Api {
            status: 500,
            message: "boom".to_string(),
        });

        let config = GenerationConfig {
            retry_malformed: 3,
            ..Default::default()
        };
        let result = TicketGenerator::new(client.clone(), config)
            .generate_batch(&GenerationConstraints::default())
            .await;

        assert!(matches!(result, Err(GenerateError::GenerationFailed(_))));
        assert_eq!(client.request_count(), 1);
    }
}
