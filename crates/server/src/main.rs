//! stellar-photos server entry point.
//!
//! Boots the HTTP relay used by the Stellar Photos extension. Logs are JSON
//! on stderr, filtered through `RUST_LOG`.

use std::net::{Ipv4Addr, SocketAddr};

use anyhow::{Context, Result};
use stellar_core::AppConfig;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod routes;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));

    tracing::info!(
        %addr,
        cache_dir = %config.cache_dir.display(),
        image_hosts = ?config.image_hosts,
        "starting stellar-photos server"
    );

    let state = handler::AppState::new(config)?;
    let app = handler::router(state);

    let listener = TcpListener::bind(addr).await.with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
