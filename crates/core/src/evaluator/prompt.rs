//! The frozen evaluation prompt.
//!
//! Changing the system prompt changes what a baseline measures. Its SHA-256
//! fingerprint is stored alongside every run output.

use sha2::{Digest, Sha256};

use crate::ticket::Ticket;

pub const EVALUATION_SYSTEM_PROMPT: &str = r#"You are a senior telecom incident triage assistant.

Given an incident ticket, identify the most likely root cause using only the information in the ticket.

Rules:
- Choose exactly ONE root cause from the allowed list.
- If the information is insufficient, answer "Unknown / Insufficient Data".
- Do not speculate or assume facts that are not in the ticket.
- Avoid generic advice.
- Follow the output format exactly.

Allowed Root Causes:
- Configuration Error
- Capacity / Load Issue
- Code Regression
- Upstream Dependency Failure
- Data Quality / Inconsistency
- Environmental / Infrastructure Issue
- Unknown / Insufficient Data

Output Format (JSON only):
{
  "root_cause": "",
  "confidence": "High | Medium | Low",
  "reasoning": "",
  "recommended_next_action": "",
  "similar_incidents": []
}"#;

/// Render the user message for a ticket.
///
/// Only the description, notes, and severity are included. Ground-truth
/// fields stay out of the request.
pub fn build_user_prompt(ticket: &Ticket) -> String {
    format!(
        "Incident Ticket:\nShort Description: {}\nDetails: {}\nSeverity: {}\n",
        ticket.short_description, ticket.detailed_notes, ticket.severity
    )
}

/// Hex SHA-256 of [`EVALUATION_SYSTEM_PROMPT`].
pub fn prompt_fingerprint() -> String {
    format!("{:x}", Sha256::digest(EVALUATION_SYSTEM_PROMPT.as_bytes()))
}
