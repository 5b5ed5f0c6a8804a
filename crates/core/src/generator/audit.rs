//! Structural validation of a generated batch.
//!
//! Problems are collected, never raised: the parsed records are persisted
//! regardless so a human can inspect what the model produced.

use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

use super::config::GenerationConstraints;
use crate::ticket::{AmbiguityLevel, RootCause, Ticket};

/// One way a generated batch fails its schema or constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationIssue {
    #[error("record {index} ({}): {message}", ticket_id.as_deref().unwrap_or("no ticket_id"))]
    InvalidRecord {
        index: usize,
        ticket_id: Option<String>,
        message: String,
    },

    #[error("ticket {ticket_id} uses category {category} outside the allowed set")]
    CategoryNotAllowed { ticket_id: String, category: RootCause },

    #[error("ticket id {ticket_id} appears more than once")]
    DuplicateTicketId { ticket_id: String },

    #[error("expected {expected} tickets, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("category {category} has {actual} tickets, at least {required} required")]
    CategoryBelowMinimum {
        category: RootCause,
        required: usize,
        actual: usize,
    },

    #[error("{actual} high-ambiguity tickets, at least {required} required")]
    HighAmbiguityBelowMinimum { required: usize, actual: usize },
}

/// Outcome of auditing a batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// Records returned by the model.
    pub record_count: usize,
    /// Records that deserialized into a [`Ticket`].
    pub valid_ticket_count: usize,
    pub category_counts: BTreeMap<RootCause, usize>,
    pub high_ambiguity_count: usize,
    pub issues: Vec<ValidationIssue>,
}

impl BatchReport {
    /// True when the batch meets its schema and every minimum count.
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Type every record and check the batch against `constraints`.
///
/// Returns the records that typed successfully alongside the report.
pub fn audit_batch(records: &[Value], constraints: &GenerationConstraints) -> (Vec<Ticket>, BatchReport) {
    let mut report = BatchReport {
        record_count: records.len(),
        ..Default::default()
    };
    let mut tickets = Vec::with_capacity(records.len());
    let mut seen_ids = HashSet::new();

    for (index, record) in records.iter().enumerate() {
        let ticket_id = record
            .get("ticket_id")
            .and_then(Value::as_str)
            .map(str::to_string);

        let ticket: Ticket = match serde_json::from_value(record.clone()) {
            Ok(ticket) => ticket,
            Err(e) => {
                report.issues.push(ValidationIssue::InvalidRecord {
                    index,
                    ticket_id,
                    message: e.to_string(),
                });
                continue;
            }
        };

        if !seen_ids.insert(ticket.ticket_id.clone()) {
            report.issues.push(ValidationIssue::DuplicateTicketId {
                ticket_id: ticket.ticket_id.clone(),
            });
        }

        if !constraints.categories.contains(&ticket.true_root_cause) {
            report.issues.push(ValidationIssue::CategoryNotAllowed {
                ticket_id: ticket.ticket_id.clone(),
                category: ticket.true_root_cause,
            });
        }

        *report.category_counts.entry(ticket.true_root_cause).or_insert(0) += 1;
        if ticket.ambiguity_level == AmbiguityLevel::High {
            report.high_ambiguity_count += 1;
        }

        tickets.push(ticket);
    }

    report.valid_ticket_count = tickets.len();

    if records.len() != constraints.batch_size {
        report.issues.push(ValidationIssue::SizeMismatch {
            expected: constraints.batch_size,
            actual: records.len(),
        });
    }

    for (category, required) in &constraints.min_per_category {
        let actual = report.category_counts.get(category).copied().unwrap_or(0);
        if actual < *required {
            report.issues.push(ValidationIssue::CategoryBelowMinimum {
                category: *category,
                required: *required,
                actual,
            });
        }
    }

    if report.high_ambiguity_count < constraints.min_high_ambiguity {
        report.issues.push(ValidationIssue::HighAmbiguityBelowMinimum {
            required: constraints.min_high_ambiguity,
            actual: report.high_ambiguity_count,
        });
    }

    (tickets, report)
}
