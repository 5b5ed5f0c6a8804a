use anyhow::Result;
use tracing::error;

use incident_eval_cli::{create_client, export_metrics, init_tracing, load_validated_config, run_baseline};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = load_validated_config()?;
    let client = create_client(&config)?;

    let outcome = run_baseline(&config, client).await;
    export_metrics(&config)?;

    let outcome = outcome?;
    if outcome.summary.failed() > 0 {
        anyhow::bail!(
            "{} of {} runs failed and were not recorded; rerun with baseline.resume = true",
            outcome.summary.failed(),
            outcome.summary.planned
        );
    }
    Ok(())
}
