use std::sync::Arc;

use anyhow::Context;
use oidc_probe::{app, AppState, Config, MemoryRegistry, OidcClient};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    tracing::info!(issuer = %config.issuer, client_id = %config.client_id, "discovering identity provider");
    let oidc = OidcClient::discover(&config)
        .await
        .context("identity provider discovery failed")?;

    let state = AppState {
        oidc,
        registry: Arc::new(MemoryRegistry::default()),
    };

    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;
    tracing::info!(port = config.port, "listening");

    axum::serve(listener, app(state).into_make_service())
        .await
        .context("server error")?;
    Ok(())
}
