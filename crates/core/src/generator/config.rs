//! Ticket generation configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::ticket::RootCause;

/// Batch-level requirements given to the model and audited afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConstraints {
    /// Exact number of tickets requested.
    pub batch_size: usize,
    /// Categories the batch may use.
    pub categories: Vec<RootCause>,
    /// Minimum tickets with `ambiguity_level = high`.
    pub min_high_ambiguity: usize,
    /// Minimum tickets describing post-change symptoms. Prompt only; no
    /// ticket field records it.
    pub min_post_change: usize,
    /// Minimum tickets per category.
    pub min_per_category: BTreeMap<RootCause, usize>,
}

impl Default for GenerationConstraints {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            categories: RootCause::ALL.to_vec(),
            min_high_ambiguity: default_min_high_ambiguity(),
            min_post_change: default_min_post_change(),
            min_per_category: default_min_per_category(),
        }
    }
}

/// `[generation]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Where the ticket collection is written.
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_categories")]
    pub categories: Vec<RootCause>,
    #[serde(default = "default_min_high_ambiguity")]
    pub min_high_ambiguity: usize,
    #[serde(default = "default_min_post_change")]
    pub min_post_change: usize,
    #[serde(default = "default_min_per_category")]
    pub min_per_category: BTreeMap<RootCause, usize>,
    /// Extra attempts when the response cannot be parsed at all.
    #[serde(default)]
    pub retry_malformed: u32,
}

fn default_output_path() -> PathBuf {
    PathBuf::from("data/synthetic_incidents.json")
}

fn default_temperature() -> f32 {
    0.7
}

fn default_batch_size() -> usize {
    12
}

fn default_categories() -> Vec<RootCause> {
    RootCause::ALL.to_vec()
}

fn default_min_high_ambiguity() -> usize {
    3
}

fn default_min_post_change() -> usize {
    2
}

fn default_min_per_category() -> BTreeMap<RootCause, usize> {
    BTreeMap::from([(RootCause::Unknown, 2)])
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            temperature: default_temperature(),
            batch_size: default_batch_size(),
            categories: default_categories(),
            min_high_ambiguity: default_min_high_ambiguity(),
            min_post_change: default_min_post_change(),
            min_per_category: default_min_per_category(),
            retry_malformed: 0,
        }
    }
}

impl GenerationConfig {
    pub fn constraints(&self) -> GenerationConstraints {
        GenerationConstraints {
            batch_size: self.batch_size,
            categories: self.categories.clone(),
            min_high_ambiguity: self.min_high_ambiguity,
            min_post_change: self.min_post_change,
            min_per_category: self.min_per_category.clone(),
        }
    }
}
