//! Session service entrypoint.
//!
//! Startup order: load and validate configuration, install tracing,
//! connect the session store, assemble the router, serve until a
//! shutdown signal arrives.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use session_service::adapters::http::{api_router, SessionState};
use session_service::adapters::RedisKeyValueStore;
use session_service::application::SessionManager;
use session_service::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.server.log_level))
        .init();

    info!(
        environment = ?config.server.environment,
        "Starting session service v{}",
        env!("CARGO_PKG_VERSION")
    );

    let store = RedisKeyValueStore::connect(&config.redis).await?;
    let manager = SessionManager::new(Arc::new(store), config.session.clone());
    let state = SessionState::new(Arc::new(manager), config.session.clone());

    let app = api_router(state, &config.server);

    let addr = config.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Session service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
}
