use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ruralcart_server::{router, serve, AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ruralcart_server=info,tower_http=info")),
        )
        .init();

    let config = ServerConfig::parse();
    let state = AppState::from_config(&config).context("failed to open store")?;
    let counts = state.store.counts();
    match &config.data_file {
        Some(path) => tracing::info!(path = %path.display(), ?counts, "using file storage"),
        None => tracing::info!(?counts, "using in-memory storage"),
    }

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "ruralcart listening");

    serve(listener, router(Arc::new(state)))
        .await
        .context("server failed")
}
