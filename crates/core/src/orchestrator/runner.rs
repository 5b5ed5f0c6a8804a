//! Baseline runner implementation.

use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::config::{BaselineConfig, RepeatPolicy, SelectionPolicy};
use super::types::{
    BatchOutcome, BatchSummary, OrchestratorError, RunFailure, RunManifest, RunRecord,
};
use crate::evaluator::{prompt_fingerprint, Evaluator, EvaluatorConfig};
use crate::llm::LlmClient;
use crate::metrics;
use crate::store::{self, RejectedTicket, TicketCollection};
use crate::ticket::Ticket;

/// One (ticket, run) pair in a batch plan.
#[derive(Debug, Clone, Copy)]
pub struct PlannedRun<'a> {
    pub ticket: &'a Ticket,
    pub run_id: u32,
}

/// Expand the selection into runs, in execution order.
///
/// Each selected ticket gets run 1; a repeated ticket's extra runs follow it
/// immediately.
pub fn plan_runs<'a>(
    tickets: &'a [Ticket],
    selection: &SelectionPolicy,
    repeat: &RepeatPolicy,
    runs_per_repeated_ticket: u32,
) -> Result<Vec<PlannedRun<'a>>, OrchestratorError> {
    let mut seen = HashSet::new();
    let mut plan = Vec::new();

    for (position, ticket) in selection.select(tickets).into_iter().enumerate() {
        if !seen.insert(ticket.ticket_id.as_str()) {
            return Err(OrchestratorError::DuplicateTicketId(ticket.ticket_id.clone()));
        }

        let runs = if repeat.repeats(position, ticket) {
            runs_per_repeated_ticket.max(1)
        } else {
            1
        };
        plan.extend((1..=runs).map(|run_id| PlannedRun { ticket, run_id }));
    }

    Ok(plan)
}

/// Path of the manifest written next to `output_path`.
pub fn manifest_path(output_path: &Path) -> PathBuf {
    output_path.with_extension("manifest.json")
}

/// Drives evaluation runs over a ticket collection and persists the results.
///
/// Runs are independent: a parse failure becomes a record, an API failure is
/// logged and counted, and neither stops the remaining runs.
pub struct BaselineRunner {
    evaluator: Evaluator,
    config: BaselineConfig,
}

impl BaselineRunner {
    pub fn new(client: Arc<dyn LlmClient>, config: BaselineConfig) -> Self {
        let evaluator = Evaluator::with_config(
            client,
            EvaluatorConfig {
                temperature: config.temperature,
                max_tokens: config.max_tokens,
            },
        );
        Self { evaluator, config }
    }

    pub fn plan<'a>(&self, tickets: &'a [Ticket]) -> Result<Vec<PlannedRun<'a>>, OrchestratorError> {
        plan_runs(
            tickets,
            &self.config.selection,
            &self.config.repeat,
            self.config.runs_per_repeated_ticket,
        )
    }

    /// Evaluate the selected tickets and write the output collection.
    pub async fn run_batch(&self, tickets: &[Ticket]) -> Result<BatchOutcome, OrchestratorError> {
        self.execute(tickets, Vec::new()).await
    }

    /// Like [`run_batch`](Self::run_batch) over a loaded collection; its
    /// rejected records are carried into the summary and manifest.
    pub async fn run_collection(
        &self,
        collection: &TicketCollection,
    ) -> Result<BatchOutcome, OrchestratorError> {
        self.execute(&collection.tickets, collection.rejected.clone())
            .await
    }

    async fn execute(
        &self,
        tickets: &[Ticket],
        rejected_tickets: Vec<RejectedTicket>,
    ) -> Result<BatchOutcome, OrchestratorError> {
        let started_at = Utc::now();
        let batch_id = Uuid::new_v4();
        let output_path = &self.config.output_path;

        let plan = self.plan(tickets)?;
        let tickets_selected = plan.iter().filter(|run| run.run_id == 1).count();

        // Slot per planned run, pre-filled from a previous invocation when resuming.
        let mut slots: Vec<Option<RunRecord>> = vec![None; plan.len()];
        let mut extras = Vec::new();
        if self.config.resume {
            let positions: HashMap<(String, u32), usize> = plan
                .iter()
                .enumerate()
                .map(|(i, run)| ((run.ticket.ticket_id.clone(), run.run_id), i))
                .collect();

            let previous: Vec<RunRecord> =
                store::read_json_if_exists(output_path).await?.unwrap_or_default();
            for record in previous {
                let position = positions
                    .get(&(record.ticket_id.clone(), record.run_id))
                    .copied();
                match position {
                    Some(i) if slots[i].is_none() => slots[i] = Some(record),
                    _ => extras.push(record),
                }
            }
        }

        let mut summary = BatchSummary {
            planned: plan.len(),
            skipped: slots.iter().filter(|s| s.is_some()).count(),
            rejected_tickets,
            ..Default::default()
        };

        info!(
            %batch_id,
            tickets = tickets_selected,
            planned = summary.planned,
            skipped = summary.skipped,
            rejected = summary.rejected_tickets.len(),
            concurrency = self.config.concurrency,
            "Starting baseline batch"
        );

        let pending: Vec<(usize, PlannedRun<'_>)> = plan
            .iter()
            .copied()
            .enumerate()
            .filter(|(i, _)| slots[*i].is_none())
            .collect();

        let evaluator = &self.evaluator;
        let mut results = stream::iter(pending)
            .map(|(position, run)| async move {
                let result = evaluator.evaluate(run.ticket).await;
                (position, run, result)
            })
            .buffered(self.config.concurrency.max(1));

        while let Some((position, run, result)) = results.next().await {
            let ticket_id = &run.ticket.ticket_id;
            match result {
                Ok(model_output) => {
                    metrics::EVALUATION_RUNS
                        .with_label_values(&[model_output.outcome()])
                        .inc();
                    debug!(
                        ticket_id = %ticket_id,
                        run_id = run.run_id,
                        outcome = model_output.outcome(),
                        "Run completed"
                    );
                    summary.record_output(ticket_id, &model_output);
                    slots[position] = Some(RunRecord {
                        ticket_id: ticket_id.clone(),
                        run_id: run.run_id,
                        model_output,
                    });

                    if self.config.flush_each_run {
                        // A persistent write failure surfaces at the final write.
                        if let Err(e) =
                            store::write_json_atomic(output_path, &assemble(&slots, &extras)).await
                        {
                            warn!(error = %e, "Failed to flush run output");
                        }
                    }
                }
                Err(e) => {
                    metrics::EVALUATION_RUNS.with_label_values(&["failed"]).inc();
                    warn!(
                        ticket_id = %ticket_id,
                        run_id = run.run_id,
                        error = %e,
                        "Run failed"
                    );
                    summary.record_failure(RunFailure {
                        ticket_id: ticket_id.clone(),
                        run_id: run.run_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        let records = assemble(&slots, &extras);

        let manifest = RunManifest {
            batch_id,
            started_at,
            finished_at: Utc::now(),
            provider: evaluator.client().provider().to_string(),
            model: evaluator.client().model().to_string(),
            temperature: evaluator.config().temperature,
            prompt_fingerprint: prompt_fingerprint(),
            tickets_selected,
            planned: summary.planned,
            completed: summary.completed,
            skipped: summary.skipped,
            parse_failures: summary.parse_failures,
            failed: summary.failed(),
            rejected_tickets: summary.rejected_tickets.len(),
        };

        // Output from an earlier batch is kept when every executed run failed.
        if summary.completed == 0 && summary.failed() > 0 {
            warn!(
                %batch_id,
                failed = summary.failed(),
                output = %output_path.display(),
                "No run succeeded; existing output left untouched"
            );
        } else {
            store::write_json_atomic(output_path, &records).await?;
            store::write_json_atomic(&manifest_path(output_path), &manifest).await?;
        }

        info!(
            %batch_id,
            completed = summary.completed,
            diagnostics = summary.diagnostics(),
            parse_failures = summary.parse_failures,
            failed = summary.failed(),
            skipped = summary.skipped,
            output = %output_path.display(),
            "Baseline batch finished"
        );

        Ok(BatchOutcome {
            records,
            summary,
            manifest,
        })
    }
}

/// Records in plan order, then any resumed records the plan no longer covers.
fn assemble(slots: &[Option<RunRecord>], extras: &[RunRecord]) -> Vec<RunRecord> {
    slots.iter().flatten().chain(extras).cloned().collect()
}
