//! pplx-bridge server entry point.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pplx_bridge::config::ServerConfig;
use pplx_bridge::keys::ApiKeyStore;
use pplx_bridge::routes::router;
use pplx_bridge::state::AppState;
use pplx_bridge_client::{ClientConfig, PerplexityClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = ServerConfig::from_env().context("loading configuration")?;
    if config.cookie.is_some() {
        tracing::info!("using cookie authentication for the backend");
    } else {
        tracing::info!("running in anonymous mode (no cookie)");
    }

    let client = PerplexityClient::new(ClientConfig {
        cookie: config.cookie.clone(),
        base_url: None,
    });
    let keys = Arc::new(ApiKeyStore::open(config.keys_path.clone()));
    let state = AppState::new(client, keys);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "pplx-bridge listening");
    tracing::info!("API endpoint: http://localhost:{}/chat/completions", config.port);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("binding listen address")?;
    axum::serve(listener, router(state))
        .await
        .context("serving")?;
    Ok(())
}
