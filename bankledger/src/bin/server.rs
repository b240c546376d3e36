//! Standalone ledger process
//!
//! Opens the ledger and holds it until interrupted. Configuration comes
//! from the file named by `BANKLEDGER_CONFIG`, falling back to
//! environment variables and defaults.

use anyhow::Context;
use bankledger::{Config, Ledger};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::var("BANKLEDGER_CONFIG") {
        Ok(path) => Config::from_file(&path)
            .with_context(|| format!("failed to load config from {}", path))?,
        Err(_) => Config::from_env().context("failed to load config from environment")?,
    };

    let ledger = Ledger::open(config)
        .await
        .context("failed to open ledger")?;

    info!("ledger running, press Ctrl-C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    info!(
        commits = ledger.metrics().commits_total.get(),
        aborts = ledger.metrics().aborts_total.get(),
        "shutting down"
    );
    Ok(())
}
