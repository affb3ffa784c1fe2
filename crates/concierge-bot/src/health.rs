//! Liveness endpoint for uptime monitors.

use crate::error::{BotError, BotResult};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::info;

/// Shared state of the endpoint.
#[derive(Clone)]
pub struct HealthState {
    /// Process start, for uptime.
    pub started: Instant,
}

impl HealthState {
    /// State starting the uptime clock now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

/// Body of `GET /health`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    /// Always `ok` while the process serves requests.
    pub status: String,
    /// Seconds since start.
    pub uptime_seconds: u64,
}

async fn alive() -> &'static str {
    "Bot is alive!"
}

async fn health(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_seconds: state.started.elapsed().as_secs(),
    })
}

/// Routes of the endpoint.
pub fn router(state: HealthState) -> Router {
    Router::new()
        .route("/", get(alive))
        .route("/health", get(health))
        .with_state(state)
}

/// Binds the listener.
///
/// # Errors
///
/// Returns [`BotError::Health`] if the address cannot be bound.
pub async fn bind(addr: SocketAddr) -> BotResult<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| BotError::Health(format!("failed to bind {addr}: {e}")))
}

/// Serves the endpoint until the process exits.
///
/// # Errors
///
/// Returns [`BotError::Health`] if the server stops with an error.
pub async fn serve(listener: TcpListener, state: HealthState) -> BotResult<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Health endpoint listening on {addr}");
    }
    axum::serve(listener, router(state))
        .await
        .map_err(|e| BotError::Health(format!("server error: {e}")))
}
