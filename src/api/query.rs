use crate::api::ingestion::AppState;
use crate::position::PositionUpdate;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    reason: &'static str,
}

/// Create query API router
pub fn create_query_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/latest", get(get_latest))
        .route("/history", get(get_history))
        .with_state(state)
}

/// GET /latest - current position, or 404 before the first accepted update
async fn get_latest(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PositionUpdate>, QueryError> {
    state
        .engine
        .latest()
        .map(Json)
        .ok_or(QueryError::NotYetAvailable)
}

/// GET /history - bounded recent history, oldest first
async fn get_history(State(state): State<Arc<AppState>>) -> Json<Vec<PositionUpdate>> {
    Json(state.engine.history())
}

/// Query error types
#[derive(Debug)]
enum QueryError {
    NotYetAvailable,
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let (status, reason, message) = match self {
            QueryError::NotYetAvailable => (
                StatusCode::NOT_FOUND,
                "not_yet_available",
                "no position received yet",
            ),
        };

        let body = Json(ErrorResponse {
            error: message.to_string(),
            reason,
        });

        (status, body).into_response()
    }
}
