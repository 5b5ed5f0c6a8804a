//! Baseline run orchestration.
//!
//! The runner selects tickets, expands repeated runs, drives evaluation
//! calls with bounded concurrency, and persists the output collection:
//! - **Plan**: selection policy, then repeat policy, in collection order
//! - **Execute**: one evaluation per (ticket, run); results are kept in plan order
//! - **Persist**: atomic rewrite after each run (optional) and at the end, plus a manifest

mod config;
mod runner;
mod types;

pub use config::{BaselineConfig, RepeatPolicy, SelectionPolicy};
pub use runner::{manifest_path, plan_runs, BaselineRunner, PlannedRun};
pub use types::{
    BatchOutcome, BatchSummary, OrchestratorError, RunFailure, RunManifest, RunRecord,
    TicketRunCounts,
};
