use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use crate::application::LedgerService;
use crate::config::ServerConfig;

use super::build_router;

/// Serve the ledger API until Ctrl-C.
pub async fn serve(config: &ServerConfig, service: LedgerService) -> Result<()> {
    let app = build_router(service.clone());
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    info!("chinmudra listening on {}", config.bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    service.repository().close().await;
    info!("shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {e}");
    }
}
