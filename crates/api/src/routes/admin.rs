//! Operator endpoints: dead-letter inspection and metrics.

use axum::{extract::State, Json};
use serde::Serialize;

use queue::DeadLetter;
use telemetry::{metrics, MetricsSnapshot};

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadLettersResponse {
    pub count: usize,
    pub dead_letters: Vec<DeadLetter>,
}

/// Jobs that exhausted their retries, oldest first.
pub async fn dead_letters_handler(State(state): State<AppState>) -> Json<DeadLettersResponse> {
    let dead_letters = state.queue.dead_letters();
    Json(DeadLettersResponse {
        count: dead_letters.len(),
        dead_letters,
    })
}

pub async fn metrics_handler() -> Json<MetricsSnapshot> {
    Json(metrics().snapshot())
}
