// HTTP and SSE APIs

mod health;
mod ingestion;
mod query;
mod stream;

pub use ingestion::AppState;

use crate::config::CorsConfig;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

/// Assemble the full application router, with the cross-origin policy applied
/// to every response, preflight included.
pub fn create_router(state: AppState, cors: &CorsConfig) -> Router {
    let state = Arc::new(state);

    Router::new()
        .merge(health::create_health_router())
        .merge(ingestion::create_ingestion_router(state.clone()))
        .merge(query::create_query_router(state.clone()))
        .merge(stream::create_stream_router(state))
        .layer(cors_layer(cors))
}

/// Build the CORS layer: explicit allow-list when origins are configured,
/// allow-any in unconfigured/development mode.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(86400));

    if config.allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring unparseable allowed origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}
