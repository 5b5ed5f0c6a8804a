//! Baseline lifecycle integration tests.
//!
//! These tests drive the runner from a persisted ticket collection:
//! load -> plan -> evaluate -> flush -> manifest, including resume after an
//! interrupted batch.

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use incident_eval_core::{
    evaluator::ParseFailure,
    load_tickets, read_json,
    testing::{fixtures, MockLlmClient},
    write_json_atomic, BaselineConfig, BaselineRunner, LlmClient, LlmError, ModelOutput,
    RepeatPolicy, RetryConfig, RetryingClient, RunManifest, RunRecord, SelectionPolicy,
};

/// Test helper holding the on-disk layout of one baseline batch.
struct TestHarness {
    tickets_path: PathBuf,
    output_path: PathBuf,
    _temp_dir: TempDir,
}

impl TestHarness {
    async fn new(ticket_count: usize) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let tickets_path = temp_dir.path().join("data/synthetic_incidents.json");
        let output_path = temp_dir.path().join("data/baseline_outputs.json");

        write_json_atomic(&tickets_path, &fixtures::tickets(ticket_count))
            .await
            .expect("Failed to write tickets");

        Self {
            tickets_path,
            output_path,
            _temp_dir: temp_dir,
        }
    }

    fn config(&self) -> BaselineConfig {
        BaselineConfig {
            tickets_path: Some(self.tickets_path.clone()),
            output_path: self.output_path.clone(),
            ..Default::default()
        }
    }

    async fn persisted_runs(&self) -> Vec<RunRecord> {
        read_json(&self.output_path)
            .await
            .expect("Failed to read run output")
    }
}

fn run_keys(records: &[RunRecord]) -> Vec<(String, u32)> {
    records
        .iter()
        .map(|r| (r.ticket_id.clone(), r.run_id))
        .collect()
}

#[tokio::test]
async fn test_full_baseline_from_ticket_file() {
    let harness = TestHarness::new(12).await;
    let client = Arc::new(MockLlmClient::with_default(fixtures::diagnostic_response(
        "Data Quality / Inconsistency",
        "High",
    )));

    let tickets = load_tickets(&harness.tickets_path).await.unwrap();
    let runner = BaselineRunner::new(client.clone(), harness.config());
    let outcome = runner.run_batch(&tickets).await.unwrap();

    assert_eq!(outcome.summary.planned, 14);
    assert_eq!(outcome.summary.completed, 14);
    assert_eq!(outcome.summary.diagnostics(), 14);
    assert_eq!(client.request_count(), 14);

    let persisted = harness.persisted_runs().await;
    assert_eq!(persisted, outcome.records);
    assert_eq!(
        run_keys(&persisted)[..4],
        [
            ("T1".to_string(), 1),
            ("T1".to_string(), 2),
            ("T1".to_string(), 3),
            ("T2".to_string(), 1)
        ]
    );

    let manifest: RunManifest = read_json(&harness.output_path.with_extension("manifest.json"))
        .await
        .unwrap();
    assert_eq!(manifest.tickets_selected, 10);
    assert_eq!(manifest.completed, 14);
    assert_eq!(manifest.temperature, 0.3);
}

#[tokio::test]
async fn test_resume_after_interrupted_batch() {
    let harness = TestHarness::new(3).await;

    // A previous invocation completed T1 and recorded a run the plan no longer has.
    let previous = vec![
        RunRecord {
            ticket_id: "T1".to_string(),
            run_id: 1,
            model_output: ModelOutput::ParseFailure(ParseFailure::new("garbled", None)),
        },
        RunRecord {
            ticket_id: "T9".to_string(),
            run_id: 1,
            model_output: ModelOutput::ParseFailure(ParseFailure::new("stale", None)),
        },
    ];
    write_json_atomic(&harness.output_path, &previous)
        .await
        .unwrap();

    let client = Arc::new(MockLlmClient::with_default(fixtures::diagnostic_response(
        "Environmental / Infrastructure Issue",
        "Low",
    )));
    let config = BaselineConfig {
        selection: SelectionPolicy::All,
        repeat: RepeatPolicy::None,
        resume: true,
        ..harness.config()
    };

    let tickets = load_tickets(&harness.tickets_path).await.unwrap();
    let outcome = BaselineRunner::new(client.clone(), config)
        .run_batch(&tickets)
        .await
        .unwrap();

    assert_eq!(client.request_count(), 2);
    assert_eq!(outcome.summary.skipped, 1);
    assert_eq!(
        run_keys(&outcome.records),
        vec![
            ("T1".to_string(), 1),
            ("T2".to_string(), 1),
            ("T3".to_string(), 1),
            ("T9".to_string(), 1)
        ]
    );
    // The resumed record is kept as it was, not re-evaluated.
    assert!(outcome.records[0].model_output.is_parse_failure());
    assert_eq!(harness.persisted_runs().await, outcome.records);
}

#[tokio::test]
async fn test_without_resume_previous_output_is_replaced() {
    let harness = TestHarness::new(2).await;
    let stale = vec![RunRecord {
        ticket_id: "T9".to_string(),
        run_id: 1,
        model_output: ModelOutput::ParseFailure(ParseFailure::new("stale", None)),
    }];
    write_json_atomic(&harness.output_path, &stale).await.unwrap();

    let client = Arc::new(MockLlmClient::with_default(fixtures::diagnostic_response(
        "Code Regression",
        "High",
    )));
    let config = BaselineConfig {
        repeat: RepeatPolicy::None,
        ..harness.config()
    };
    let tickets = load_tickets(&harness.tickets_path).await.unwrap();
    BaselineRunner::new(client, config)
        .run_batch(&tickets)
        .await
        .unwrap();

    let persisted = harness.persisted_runs().await;
    assert_eq!(
        run_keys(&persisted),
        vec![("T1".to_string(), 1), ("T2".to_string(), 1)]
    );
}

#[tokio::test]
async fn test_transient_provider_errors_are_retried() {
    let harness = TestHarness::new(2).await;

    let mock = MockLlmClient::with_default(fixtures::diagnostic_response(
        "Capacity / Load Issue",
        "Medium",
    ));
    mock.push_error(LlmError::Api {
        status: 429,
        message: "rate limited".to_string(),
    });
    mock.push_error(LlmError::Timeout(std::time::Duration::from_secs(60)));

    let retrying = Arc::new(RetryingClient::new(
        mock,
        RetryConfig {
            max_attempts: 3,
            initial_delay_ms: 1,
            max_delay_ms: 5,
            backoff_multiplier: 2.0,
        },
    ));
    let client: Arc<dyn LlmClient> = retrying.clone();

    let config = BaselineConfig {
        repeat: RepeatPolicy::None,
        ..harness.config()
    };
    let tickets = load_tickets(&harness.tickets_path).await.unwrap();
    let outcome = BaselineRunner::new(client, config)
        .run_batch(&tickets)
        .await
        .unwrap();

    assert_eq!(outcome.summary.failed(), 0);
    assert_eq!(outcome.records.len(), 2);
    assert_eq!(retrying.inner().request_count(), 4);
}
