use crate::api::ingestion::AppState;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures::stream::{self, Stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Create the live-stream router
pub fn create_stream_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/stream", get(stream_positions))
        .with_state(state)
}

/// GET /stream - live position feed over Server-Sent Events.
///
/// Opens with a reconnect back-off hint, replays the current latest position
/// (if any) as the first `position` event, then forwards every subsequently
/// accepted update under the same event name. Keep-alive comments hold idle
/// connections open through intermediaries. Dropping the response stream on
/// client disconnect detaches the subscription.
async fn stream_positions(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let subscription = state.engine.attach();
    info!(
        subscriber_id = %subscription.id(),
        subscribers = state.engine.subscriber_count(),
        "Stream subscriber attached"
    );

    let retry = Duration::from_millis(state.stream.retry_ms);
    let keep_alive = Duration::from_secs(state.stream.keep_alive_seconds);

    let frames = stream::once(async move { Ok::<Event, axum::Error>(Event::default().retry(retry)) })
        .chain(subscription.map(|update| Event::default().event("position").json_data(&update)));

    Sse::new(frames).keep_alive(KeepAlive::new().interval(keep_alive).text("keep-alive"))
}
