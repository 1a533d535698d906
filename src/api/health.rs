//! Liveness probe. Constant success, independent of tracker state.

use axum::{response::Json, routing::get, Router};
use serde::Serialize;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Create health router; the root path doubles as a liveness alias
pub fn create_health_router() -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
