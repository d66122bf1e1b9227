//! gembridge Server - Headless Daemon
//!
//! Serves the OpenAI-compatible surface (`/v1/chat/completions`,
//! `/v1/embeddings`, `/v1/models`) backed by a pool of Gemini API keys.
//!
//! Access via: http://localhost:4949

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

mod cli;

use cli::Cli;
use gembridge_core::modules::{config::load_config, logger::init_logger};
use gembridge_core::proxy::{AppState, AxumServer, ServerStartConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logger(&cli.log_level).map_err(|e| anyhow::anyhow!("Failed to init logging: {}", e))?;

    let mut config = load_config(&cli.config)
        .with_context(|| format!("Failed to load config {}", cli.config.display()))?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let state = AppState::from_config(&config).context("Failed to build proxy state")?;
    info!(
        "Starting gembridge v{} with {} credential(s)",
        env!("CARGO_PKG_VERSION"),
        state.pool.len()
    );

    let server = AxumServer::new(ServerStartConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        body_limit_bytes: config.server.body_limit_bytes,
        state,
    });
    server.run().await.map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("gembridge stopped");
    Ok(())
}
