//! wxgate server entry point.
//!
//! Loads configuration, starts the cache sweeper and serves the HTTP API
//! until Ctrl-C. Logs are emitted as JSON; `RUST_LOG` overrides the default
//! `info` level.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use wxgate_core::AppConfig;
use wxgate_core::cache::spawn_sweeper;

mod error;
mod routes;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let state = AppState::new(config)?;

    let sweeper = spawn_sweeper(Arc::clone(&state.cache));

    let addr = format!("{}:{}", state.config.host, state.config.port);
    let listener = TcpListener::bind(&addr).await.with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        %addr,
        source_mode = ?state.config.source_mode,
        cache_ttl_secs = state.config.cache_ttl_secs,
        "wxgate listening"
    );

    axum::serve(listener, routes::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    tracing::info!("wxgate stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
