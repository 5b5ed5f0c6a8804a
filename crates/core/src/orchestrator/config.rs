//! Baseline run configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ticket::Ticket;

/// Which tickets from the collection are evaluated.
///
/// Selection always keeps the order of the ticket collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Every ticket.
    All,
    /// The first `count` tickets.
    First { count: usize },
    /// Tickets whose id is listed. Unknown ids are ignored.
    Ids { ids: Vec<String> },
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        SelectionPolicy::First { count: 10 }
    }
}

impl SelectionPolicy {
    pub fn select<'a>(&self, tickets: &'a [Ticket]) -> Vec<&'a Ticket> {
        match self {
            SelectionPolicy::All => tickets.iter().collect(),
            SelectionPolicy::First { count } => tickets.iter().take(*count).collect(),
            SelectionPolicy::Ids { ids } => tickets
                .iter()
                .filter(|t| ids.iter().any(|id| id == &t.ticket_id))
                .collect(),
        }
    }
}

/// Which selected tickets receive additional runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RepeatPolicy {
    /// One run per ticket.
    None,
    /// The first `count` selected tickets.
    FirstSelected { count: usize },
    /// Selected tickets whose id is listed.
    Ids { ids: Vec<String> },
}

impl Default for RepeatPolicy {
    fn default() -> Self {
        RepeatPolicy::FirstSelected { count: 2 }
    }
}

impl RepeatPolicy {
    /// Whether the ticket at `position` in the selection is repeated.
    pub fn repeats(&self, position: usize, ticket: &Ticket) -> bool {
        match self {
            RepeatPolicy::None => false,
            RepeatPolicy::FirstSelected { count } => position < *count,
            RepeatPolicy::Ids { ids } => ids.iter().any(|id| id == &ticket.ticket_id),
        }
    }
}

/// `[baseline]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineConfig {
    /// Ticket collection to evaluate. Defaults to the generation output.
    #[serde(default)]
    pub tickets_path: Option<PathBuf>,

    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Evaluation sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default)]
    pub selection: SelectionPolicy,

    #[serde(default)]
    pub repeat: RepeatPolicy,

    /// Total runs for a repeated ticket, including the first.
    #[serde(default = "default_runs_per_repeated_ticket")]
    pub runs_per_repeated_ticket: u32,

    /// Evaluation calls in flight at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Rewrite the output file after every completed run.
    #[serde(default = "default_flush_each_run")]
    pub flush_each_run: bool,

    /// Skip (ticket_id, run_id) pairs already present in the output file.
    #[serde(default)]
    pub resume: bool,
}

fn default_output_path() -> PathBuf {
    PathBuf::from("data/baseline_outputs.json")
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_runs_per_repeated_ticket() -> u32 {
    3
}

fn default_concurrency() -> usize {
    1
}

fn default_flush_each_run() -> bool {
    true
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            tickets_path: None,
            output_path: default_output_path(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            selection: SelectionPolicy::default(),
            repeat: RepeatPolicy::default(),
            runs_per_repeated_ticket: default_runs_per_repeated_ticket(),
            concurrency: default_concurrency(),
            flush_each_run: default_flush_each_run(),
            resume: false,
        }
    }
}
