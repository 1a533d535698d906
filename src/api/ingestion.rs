use crate::config::{LimitsConfig, StreamConfig};
use crate::position::{admit, AdmissionError};
use crate::state::TrackerEngine;
use axum::{
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<TrackerEngine>,
    pub stream: StreamConfig,
    pub limits: LimitsConfig,
}

/// Success acknowledgment for an accepted position
#[derive(Serialize)]
struct AckResponse {
    ok: bool,
}

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    reason: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<&'static str>>,
}

/// Create API router with the ingestion endpoint
pub fn create_ingestion_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/collect", post(collect))
        .with_state(state)
}

/// POST /collect - Submit a single position update
///
/// ConnectInfo is optional so the router also runs under test harnesses that
/// don't provide a peer address.
async fn collect(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<AckResponse>, AppError> {
    if body.len() > state.limits.body_limit_bytes {
        return Err(AppError::PayloadTooLarge);
    }

    let ip = client_ip(&headers, connect_info.map(|ConnectInfo(addr)| addr));
    let update = admit(&body, ip)?;

    info!(
        lat = update.lat,
        lng = update.lng,
        ip = update.ip.as_deref().unwrap_or("-"),
        "Ingesting position update"
    );

    state.engine.accept(update);

    Ok(Json(AckResponse { ok: true }))
}

/// Best-effort originating address: first non-empty forwarded-for value wins,
/// then the raw peer address. Never fails.
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        let first = forwarded.split(',').next().unwrap_or("").trim();
        if !first.is_empty() {
            return Some(first.to_string());
        }
    }
    peer.map(|addr| addr.ip().to_string())
}

/// Application error types
enum AppError {
    Rejected(AdmissionError),
    PayloadTooLarge,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Rejected(err) => {
                let fields = match &err {
                    AdmissionError::InvalidFields(fields) => Some(fields.clone()),
                    AdmissionError::MalformedPayload(_) => None,
                };
                let body = Json(ErrorResponse {
                    error: err.to_string(),
                    reason: err.reason(),
                    fields,
                });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            AppError::PayloadTooLarge => {
                let body = Json(ErrorResponse {
                    error: "payload too large".to_string(),
                    reason: "payload_too_large",
                    fields: None,
                });
                (StatusCode::PAYLOAD_TOO_LARGE, body).into_response()
            }
        }
    }
}

impl From<AdmissionError> for AppError {
    fn from(e: AdmissionError) -> Self {
        AppError::Rejected(e)
    }
}
