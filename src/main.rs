use anyhow::Context;
use tracing_subscriber::EnvFilter;

use cert_portal::app::{app, AppState};
use cert_portal::config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up CERT_STORE_URL, ADMIN_EMAIL, etc.
    let env_file_error = config::load_env_file();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Some(e) = env_file_error {
        tracing::warn!("ignoring unreadable .env file: {}", e);
    }

    let config = config::config();
    tracing::info!("Starting certificate portal in {:?} mode", config.environment);

    let state = AppState::from_config(config).context("failed to set up certificate store")?;
    let router = app(state, config);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Certificate portal listening on http://{}", bind_addr);

    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
