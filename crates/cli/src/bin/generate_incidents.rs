use anyhow::Result;
use tracing::error;

use incident_eval_cli::{create_client, export_metrics, init_tracing, load_validated_config, run_generate};

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

    let result = run_generate(&config, client).await;
    export_metrics(&config)?;
    result.map(|_| ())
}
