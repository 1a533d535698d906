use anyhow::{Context, Result};
use beacon::api::{self, AppState};
use beacon::config::{self, BeaconConfig};
use beacon::state::TrackerEngine;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "beacon=info".into()),
        )
        .init();

    info!("Beacon starting...");

    // Config file is optional; env vars override either way
    let mut config = match std::env::var("BEACON_CONFIG") {
        Ok(path) => config::load_config(&path)?,
        Err(_) => BeaconConfig::default(),
    };
    config.apply_env();

    let engine = Arc::new(TrackerEngine::with_channel_capacity(
        config.history.capacity,
        config.stream.channel_capacity,
    ));

    let state = AppState {
        engine,
        stream: config.stream.clone(),
        limits: config.limits.clone(),
    };
    let app = api::create_router(state, &config.cors);

    let addr = config.server.bind_addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!(
        addr = %addr,
        history_capacity = config.history.capacity,
        "Beacon listening"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server error")?;

    Ok(())
}
