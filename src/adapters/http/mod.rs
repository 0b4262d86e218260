//! HTTP adapters - REST API implementation.

pub mod middleware;
pub mod session;

// Re-export key types for convenience
pub use session::SessionState;
pub use session::session_routes;

use std::time::Duration;

use axum::{response::IntoResponse, routing::get, Json, Router};
use http::HeaderValue;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

/// Assembles the full API router: health endpoint, versioned session
/// routes, and the CORS / trace / timeout layers.
pub fn api_router(state: SessionState, server: &ServerConfig) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1/sessions", session_routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            server.request_timeout_secs,
        )))
        .layer(cors_layer(server))
}

/// GET /health - liveness probe
async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "session-service",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Builds the CORS layer from configuration.
///
/// With no configured origins every origin is allowed (development
/// default); otherwise only the configured origins are.
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
