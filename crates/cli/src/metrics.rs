//! Prometheus registry for the command-line tools.
//!
//! The tools are short-lived, so instead of serving a scrape endpoint the
//! text exposition is written to a file (node-exporter textfile style) when
//! `metrics.textfile_path` is configured.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use prometheus::{Encoder, Registry, TextEncoder};
use std::path::Path;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

fn register_metrics(registry: &Registry) {
    for metric in incident_eval_core::metrics::all_metrics() {
        // Registration only fails for duplicate descriptors, which all_metrics never yields.
        let _ = registry.register(metric);
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .context("Failed to encode metrics")?;
    String::from_utf8(buffer).context("Metrics exposition is not UTF-8")
}

/// Write the text exposition to `path`, creating parent directories.
pub fn write_textfile(path: &Path) -> Result<()> {
    let text = encode_metrics()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {:?}", parent))?;
    }
    std::fs::write(path, text).with_context(|| format!("Failed to write metrics to {:?}", path))
}
