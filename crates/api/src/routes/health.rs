//! Health and readiness endpoints.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use queue::QueueStats;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub queue: QueueStats,
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.queue.stats();
    let status = if stats.closed { "draining" } else { "ok" };
    Json(HealthResponse {
        status,
        queue: stats,
    })
}

/// Ready once the queue is accepting work. Returns 503 while draining.
pub async fn ready_handler(State(state): State<AppState>) -> StatusCode {
    if state.queue.is_closed() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}

pub async fn live_handler() -> StatusCode {
    StatusCode::OK
}
