//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Model API calls (counts, latency, tokens)
//! - Ticket generation
//! - Evaluation runs by outcome

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Model API
// =============================================================================

/// Model API calls by provider and result.
pub static LLM_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("incident_eval_llm_requests_total", "Total model API calls"),
        &["provider", "result"], // result: "ok", "error"
    )
    .unwrap()
});

/// Model API call latency.
pub static LLM_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "incident_eval_llm_request_duration_seconds",
            "Duration of model API calls",
        )
        .buckets(vec![0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["provider"],
    )
    .unwrap()
});

/// Tokens used.
pub static LLM_TOKENS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("incident_eval_llm_tokens_total", "Total model tokens used"),
        &["provider", "direction"], // direction: "input", "output"
    )
    .unwrap()
});

/// Retried model API calls.
pub static LLM_RETRIES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("incident_eval_llm_retries_total", "Model API calls retried"),
        &["provider"],
    )
    .unwrap()
});

// =============================================================================
// Generation and Evaluation
// =============================================================================

/// Ticket records returned by the generator.
pub static GENERATED_TICKETS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "incident_eval_generated_tickets_total",
        "Ticket records parsed from generation responses",
    )
    .unwrap()
});

/// Evaluation runs by outcome.
pub static EVALUATION_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("incident_eval_evaluation_runs_total", "Evaluation runs"),
        &["outcome"], // "diagnostic", "parse_failure", "failed"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(LLM_REQUESTS.clone()),
        Box::new(LLM_REQUEST_DURATION.clone()),
        Box::new(LLM_TOKENS.clone()),
        Box::new(LLM_RETRIES.clone()),
        Box::new(GENERATED_TICKETS.clone()),
        Box::new(EVALUATION_RUNS.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::Registry;

    #[test]
    fn test_all_metrics_register_cleanly() {
        let registry = Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }
        EVALUATION_RUNS.with_label_values(&["diagnostic"]).inc();
        let families = registry.gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "incident_eval_evaluation_runs_total"));
    }
}
