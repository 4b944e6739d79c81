use anyhow::{Context, Result};
use newsstand::{
    app_state::AppState, config::Config, routes, sources::SourceRegistry, telemetry,
};
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    telemetry::init_tracing(config.log_format());

    let sources = SourceRegistry::load(config.sources_path())
        .with_context(|| format!("loading sources from {}", config.sources_path().display()))?;
    let state = AppState::from_config(&config, sources)?;
    let app = routes::app(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("binding {}", config.bind_addr()))?;
    info!("Listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Received shutdown signal, initiating graceful shutdown...");
}
