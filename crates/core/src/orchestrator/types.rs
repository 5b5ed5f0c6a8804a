//! Types for the baseline runner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

use crate::evaluator::ModelOutput;
use crate::store::{RejectedTicket, StoreError};

/// Errors that stop a baseline batch.
///
/// Individual run failures never appear here; they are recorded in the
/// [`BatchSummary`].
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The ticket collection repeats an id, so run records would be ambiguous.
    #[error("duplicate ticket id in collection: {0}")]
    DuplicateTicketId(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// One evaluation attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub ticket_id: String,
    /// 1-based, unique per ticket within a batch.
    pub run_id: u32,
    pub model_output: ModelOutput,
}

/// A run that could not reach the model. No record is written for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunFailure {
    pub ticket_id: String,
    pub run_id: u32,
    pub error: String,
}

/// Per-ticket outcome counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRunCounts {
    pub diagnostics: usize,
    pub parse_failures: usize,
    pub failed: usize,
}

/// Outcome counts for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Runs in the plan.
    pub planned: usize,
    /// Runs executed in this invocation that produced a record.
    pub completed: usize,
    /// Runs skipped because a record already existed.
    pub skipped: usize,
    /// Completed runs whose output did not parse.
    pub parse_failures: usize,
    /// Runs whose model call failed.
    pub failures: Vec<RunFailure>,
    /// Stored records that could not be typed and were not evaluated.
    #[serde(default)]
    pub rejected_tickets: Vec<RejectedTicket>,
    pub per_ticket: BTreeMap<String, TicketRunCounts>,
}

impl BatchSummary {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn diagnostics(&self) -> usize {
        self.completed - self.parse_failures
    }

    pub(crate) fn record_output(&mut self, ticket_id: &str, output: &ModelOutput) {
        self.completed += 1;
        let counts = self.per_ticket.entry(ticket_id.to_string()).or_default();
        match output {
            ModelOutput::Diagnostic(_) => counts.diagnostics += 1,
            ModelOutput::ParseFailure(_) => {
                counts.parse_failures += 1;
                self.parse_failures += 1;
            }
        }
    }

    pub(crate) fn record_failure(&mut self, failure: RunFailure) {
        self.per_ticket
            .entry(failure.ticket_id.clone())
            .or_default()
            .failed += 1;
        self.failures.push(failure);
    }
}

/// Provenance written next to the run output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub batch_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub provider: String,
    pub model: String,
    pub temperature: f32,
    /// SHA-256 of the evaluation system prompt.
    pub prompt_fingerprint: String,
    pub tickets_selected: usize,
    pub planned: usize,
    pub completed: usize,
    pub skipped: usize,
    pub parse_failures: usize,
    pub failed: usize,
    #[serde(default)]
    pub rejected_tickets: usize,
}

/// Everything a batch produced.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// Records in plan order, including resumed ones.
    pub records: Vec<RunRecord>,
    pub summary: BatchSummary,
    pub manifest: RunManifest,
}
