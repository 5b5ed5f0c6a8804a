//! Testing utilities and mock implementations.
//!
//! This module provides a mock model client and fixtures so the generator,
//! evaluator, and orchestrator can be exercised without a model endpoint.
//!
//! # Example
//!
//! ```rust,ignore
//! use incident_eval_core::testing::{fixtures, MockLlmClient};
//!
//! let client = Arc::new(MockLlmClient::new());
//! client.push_text(fixtures::diagnostic_response("Code Regression", "High"));
//!
//! let evaluator = Evaluator::new(client.clone());
//! let output = evaluator.evaluate(&fixtures::ticket("T1")).await?;
//! ```

mod mock_llm;

pub use mock_llm::{MockLlmClient, RecordedRequest};

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::{json, Value};

    use crate::ticket::{AmbiguityLevel, RootCause, Severity, Ticket};

    /// Create a ticket with reasonable defaults.
    pub fn ticket(ticket_id: &str) -> Ticket {
        Ticket {
            ticket_id: ticket_id.to_string(),
            short_description: format!("Intermittent CDR loss on mediation ({})", ticket_id),
            detailed_notes: "Probe shows gaps in CDR sequence numbers, KPIs otherwise nominal"
                .to_string(),
            severity: Severity::new(2).expect("2 is a valid severity"),
            true_root_cause: RootCause::DataQuality,
            ambiguity_level: AmbiguityLevel::Medium,
        }
    }

    /// Create a ticket with explicit ground truth.
    pub fn ticket_with(ticket_id: &str, cause: RootCause, ambiguity: AmbiguityLevel) -> Ticket {
        Ticket {
            true_root_cause: cause,
            ambiguity_level: ambiguity,
            ..ticket(ticket_id)
        }
    }

    /// Create `count` tickets with ids `T1..=Tcount`.
    pub fn tickets(count: usize) -> Vec<Ticket> {
        (1..=count).map(|i| ticket(&format!("T{}", i))).collect()
    }

    /// A well-formed diagnostic answer wrapped the way chat models usually reply.
    pub fn diagnostic_response(root_cause: &str, confidence: &str) -> String {
        let body = json!({
            "root_cause": root_cause,
            "confidence": confidence,
            "reasoning": "Symptoms line up with the notes provided.",
            "recommended_next_action": "Check mediation node logs for the affected window.",
            "similar_incidents": []
        });
        format!("Here is my assessment:\n```json\n{}\n```", body)
    }

    /// A ticket record as the generator would receive it.
    pub fn ticket_record(ticket_id: &str, cause: RootCause, ambiguity: AmbiguityLevel) -> Value {
        json!({
            "ticket_id": ticket_id,
            "short_description": format!("Call setup failures in region north ({})", ticket_id),
            "detailed_notes": "Signaling probes report elevated SIP 503s since the evening peak",
            "severity": 2,
            "true_root_cause": cause.as_str(),
            "ambiguity_level": ambiguity.as_str(),
        })
    }

    /// A generation response satisfying the default batch constraints
    /// (12 tickets, 3 high ambiguity, 2 unknown).
    pub fn valid_batch_response() -> String {
        let plan = [
            (RootCause::ConfigurationError, AmbiguityLevel::Low),
            (RootCause::CapacityLoad, AmbiguityLevel::Medium),
            (RootCause::CodeRegression, AmbiguityLevel::High),
            (RootCause::UpstreamDependency, AmbiguityLevel::Low),
            (RootCause::DataQuality, AmbiguityLevel::Medium),
            (RootCause::Environmental, AmbiguityLevel::High),
            (RootCause::Unknown, AmbiguityLevel::High),
            (RootCause::Unknown, AmbiguityLevel::Medium),
            (RootCause::CodeRegression, AmbiguityLevel::Low),
            (RootCause::ConfigurationError, AmbiguityLevel::Medium),
            (RootCause::CapacityLoad, AmbiguityLevel::Low),
            (RootCause::DataQuality, AmbiguityLevel::Low),
        ];
        let records: Vec<Value> = plan
            .iter()
            .enumerate()
            .map(|(i, (cause, ambiguity))| {
                ticket_record(&format!("INC-{:03}", i + 1), *cause, *ambiguity)
            })
            .collect();
        format!(
            "Sure, here are the tickets.\n```json\n{}\n```",
            serde_json::to_string_pretty(&records).unwrap_or_default()
        )
    }
}
