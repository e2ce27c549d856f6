//! Escalation Pager - Main Entry Point

use api::telemetry::init_logging;
use api::{run_server, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_logging(&config.logging).map_err(|e| e as Box<dyn std::error::Error>)?;

    info!("=== Escalation Pager v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        "Loaded {} escalation policies (ack timeout {}s)",
        config.policies.len(),
        config.engine.ack_timeout_secs
    );

    run_server(config).await?;

    Ok(())
}
