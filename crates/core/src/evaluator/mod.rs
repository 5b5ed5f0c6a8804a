//! Evaluation invocation: one frozen-prompt model call per ticket run.
//!
//! Model text quality is an expected condition here. Text that cannot be
//! turned into a [`DiagnosticResult`] comes back as a [`ParseFailure`]
//! carrying the raw output; only a failed API call is an error.

mod prompt;
mod types;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::extract::extract_as;
use crate::llm::{CompletionRequest, LlmClient, LlmError};
use crate::ticket::Ticket;

pub use prompt::{build_user_prompt, prompt_fingerprint, EVALUATION_SYSTEM_PROMPT};
pub use types::{Confidence, DiagnosticResult, ModelOutput, ParseFailure};

/// Infrastructure failure during an evaluation call.
#[derive(Debug, Error)]
pub enum EvaluateError {
    #[error("evaluation failed: {0}")]
    EvaluationFailed(#[from] LlmError),
}

/// Configuration for evaluation calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Sampling temperature. Kept low to bias toward repeatable answers.
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 1024,
        }
    }
}

/// Runs the frozen evaluation prompt against tickets.
pub struct Evaluator {
    client: Arc<dyn LlmClient>,
    config: EvaluatorConfig,
}

impl Evaluator {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            config: EvaluatorConfig::default(),
        }
    }

    pub fn with_config(client: Arc<dyn LlmClient>, config: EvaluatorConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    pub fn client(&self) -> &dyn LlmClient {
        self.client.as_ref()
    }

    /// The exact request sent for `ticket`.
    pub fn build_request(&self, ticket: &Ticket) -> CompletionRequest {
        CompletionRequest::new(build_user_prompt(ticket))
            .with_system(EVALUATION_SYSTEM_PROMPT)
            .with_temperature(self.config.temperature)
            .with_max_tokens(self.config.max_tokens)
    }

    /// Evaluate one ticket.
    pub async fn evaluate(&self, ticket: &Ticket) -> Result<ModelOutput, EvaluateError> {
        let request = self.build_request(ticket);
        let response = self.client.complete(request).await?;
        Ok(interpret_response(&ticket.ticket_id, response.text))
    }
}

/// Turn raw model text into a diagnostic or a parse failure.
pub fn interpret_response(ticket_id: &str, text: String) -> ModelOutput {
    match extract_as::<DiagnosticResult>(&text) {
        Ok(result) => {
            debug!(ticket_id, root_cause = %result.root_cause, "Parsed diagnostic");
            ModelOutput::Diagnostic(result)
        }
        Err(e) => {
            warn!(ticket_id, "Unparseable evaluation output: {}", e.message());
            ModelOutput::ParseFailure(ParseFailure::new(text, Some(e.to_string())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockLlmClient};
    use crate::ticket::{AmbiguityLevel, RootCause, Severity};

    fn end_to_end_ticket() -> Ticket {
        Ticket {
            ticket_id: "T1".to_string(),
            short_description: "Calls dropping after 9pm".to_string(),
            detailed_notes: "CDR volume spike observed, no recent deploys".to_string(),
            severity: Severity::new(2).unwrap(),
            true_root_cause: RootCause::CapacityLoad,
            ambiguity_level: AmbiguityLevel::Low,
        }
    }

    #[tokio::test]
    async fn test_evaluate_fenced_response() {
        let client = Arc::new(MockLlmClient::new());
        client.push_text(
            "Here you go:\n```json\n{\"root_cause\":\"Capacity / Load Issue\",\"confidence\":\"Medium\",\"reasoning\":\"...\",\"recommended_next_action\":\"...\",\"similar_incidents\":[]}\n```",
        );

        let evaluator = Evaluator::new(client.clone());
        let output = evaluator.evaluate(&end_to_end_ticket()).await.unwrap();

        let result = output.diagnostic().expect("diagnostic");
        assert_eq!(result.root_cause, RootCause::CapacityLoad);
        assert_eq!(result.confidence, Confidence::Medium);
        assert!(result.similar_incidents.is_empty());
    }

    #[tokio::test]
    async fn test_unterminated_fence_becomes_parse_failure() {
        let raw = "Here you go:\n```json\n{\"root_cause\":\"Capacity / Load Issue\",\"confidence\":\"Medium\"";
        let client = Arc::new(MockLlmClient::new());
        client.push_text(raw);

        let evaluator = Evaluator::new(client);
        let output = evaluator.evaluate(&end_to_end_ticket()).await.unwrap();

        match output {
            ModelOutput::ParseFailure(failure) => {
                assert_eq!(failure.raw_output, raw);
                assert!(failure.error.is_some());
            }
            ModelOutput::Diagnostic(_) => panic!("expected parse failure"),
        }
    }

    #[tokio::test]
    async fn test_unknown_category_becomes_parse_failure() {
        let client = Arc::new(MockLlmClient::new());
        client.push_text(fixtures::diagnostic_response("Solar Flare", "High"));

        let evaluator = Evaluator::new(client);
        let output = evaluator.evaluate(&fixtures::ticket("T2")).await.unwrap();
        assert!(output.is_parse_failure());
    }

    #[tokio::test]
    async fn test_provider_error_is_surfaced() {
        let client = Arc::new(MockLlmClient::new());
        client.push_error(LlmError::Api {
            status: 401,
            message: "invalid key".to_string(),
        });

        let evaluator = Evaluator::new(client);
        let result = evaluator.evaluate(&fixtures::ticket("T3")).await;
        assert!(matches!(result, Err(EvaluateError::EvaluationFailed(_))));
    }

    #[tokio::test]
    async fn test_request_uses_frozen_prompt_and_low_temperature() {
        let client = Arc::new(MockLlmClient::new());
        client.push_text(fixtures::diagnostic_response("Code Regression", "Low"));

        let evaluator = Evaluator::new(client.clone());
        evaluator.evaluate(&end_to_end_ticket()).await.unwrap();

        let recorded = client.recorded_requests();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].system.as_deref(), Some(EVALUATION_SYSTEM_PROMPT));
        assert!((recorded[0].temperature - 0.3).abs() < f32::EPSILON);
        assert!(recorded[0].prompt.contains("Calls dropping after 9pm"));
        assert!(!recorded[0].prompt.contains("Capacity / Load Issue"));
        assert!(!recorded[0].prompt.contains("low"));
    }
}
