use anyhow::Context;
use tracing_subscriber::EnvFilter;

use spaces_api::{app, config::AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, LICENSE_STATE, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config: AppConfig = spaces_api::config::config().clone();
    tracing::info!("Starting Spaces API in {:?} mode", config.environment);

    config.validate()?;

    let port = config.api.port;
    let state = AppState::from_config(config)
        .await
        .context("failed to initialise saved objects repository")?;

    if state.spaces.ensure_default_space().await? {
        tracing::info!("Bootstrapped the default space");
    }

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Spaces API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}
