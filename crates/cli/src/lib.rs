//! Shared bootstrap for the `generate-incidents` and `run-baseline` tools.
//!
//! Both binaries take no arguments. Configuration comes from the TOML file
//! named by `INCIDENT_EVAL_CONFIG` (default `incident-eval.toml`) layered
//! with `INCIDENT_EVAL_*` environment variables.

pub mod metrics;

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use incident_eval_core::{
    build_client, load_config, load_ticket_collection, prompt_fingerprint, validate_config,
    write_json_atomic, BaselineRunner, BatchOutcome, Config, GeneratedBatch, LlmClient,
    SanitizedConfig, TicketGenerator,
};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "INCIDENT_EVAL_CONFIG";

/// Config file used when `INCIDENT_EVAL_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "incident-eval.toml";

/// Install the global tracing subscriber (`RUST_LOG`, default `info`).
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub fn config_path() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Load and validate the configuration.
pub fn load_validated_config() -> Result<Config> {
    let config_path = config_path();
    info!("Loading configuration from {:?}", config_path);

    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    let sanitized = serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default();
    info!(config = %sanitized, "Configuration loaded successfully");
    Ok(config)
}

/// Construct the configured model client. A missing credential is fatal.
pub fn create_client(config: &Config) -> Result<Arc<dyn LlmClient>> {
    let client = build_client(&config.llm).context("Failed to create model client")?;
    info!(
        provider = client.provider(),
        model = client.model(),
        "Model client initialized"
    );
    Ok(client)
}

/// Generate one ticket batch and persist the parsed records.
///
/// Records are written verbatim even when the batch fails its audit; the
/// audit findings are logged.
pub async fn run_generate(config: &Config, client: Arc<dyn LlmClient>) -> Result<GeneratedBatch> {
    let generation = &config.generation;
    let constraints = generation.constraints();
    let generator =
        TicketGenerator::new(client, generation.clone()).with_max_tokens(config.llm.max_tokens);

    info!(
        batch_size = constraints.batch_size,
        min_high_ambiguity = constraints.min_high_ambiguity,
        min_post_change = constraints.min_post_change,
        "Requesting synthetic incident batch"
    );

    let batch = match generator.generate_batch(&constraints).await {
        Ok(batch) => batch,
        Err(e) => {
            if let Some(raw) = e.raw_output() {
                error!("Raw model output was:\n{}", raw);
            }
            return Err(e).context("Ticket generation failed");
        }
    };

    write_json_atomic(&generation.output_path, &batch.records)
        .await
        .with_context(|| format!("Failed to write tickets to {:?}", generation.output_path))?;

    if batch.report.is_valid() {
        info!(
            tickets = batch.records.len(),
            output = %generation.output_path.display(),
            "Generated synthetic incidents"
        );
    } else {
        warn!(
            tickets = batch.records.len(),
            issues = batch.report.issues.len(),
            output = %generation.output_path.display(),
            "Generated synthetic incidents with validation issues"
        );
    }

    Ok(batch)
}

/// Evaluate the ticket collection with the frozen prompt and persist the runs.
///
/// Records that do not type as tickets are skipped and listed in the summary.
pub async fn run_baseline(config: &Config, client: Arc<dyn LlmClient>) -> Result<BatchOutcome> {
    let tickets_path = config.tickets_path();
    let collection = load_ticket_collection(&tickets_path)
        .await
        .with_context(|| format!("Failed to load tickets from {:?}", tickets_path))?;
    info!(
        tickets = collection.tickets.len(),
        rejected = collection.rejected.len(),
        prompt_fingerprint = %prompt_fingerprint(),
        "Loaded ticket collection"
    );

    let runner = BaselineRunner::new(client, config.baseline.clone());
    let outcome = runner
        .run_collection(&collection)
        .await
        .context("Baseline run failed")?;

    for failure in &outcome.summary.failures {
        error!(
            ticket_id = %failure.ticket_id,
            run_id = failure.run_id,
            "Run not recorded: {}",
            failure.error
        );
    }

    Ok(outcome)
}

/// Write the metrics textfile when one is configured.
pub fn export_metrics(config: &Config) -> Result<()> {
    if let Some(path) = &config.metrics.textfile_path {
        metrics::write_textfile(path)?;
        info!("Metrics written to {:?}", path);
    }
    Ok(())
}
