//! Product rating read endpoint.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use telemetry::metrics;
use tracing::debug;

use crate::response::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingResponse {
    pub product_id: String,
    pub average_rating: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_count: Option<usize>,
    pub source: &'static str,
}

/// Serves the current rating: cache first, then the latest persisted
/// snapshot. The snapshot fallback returns the last aggregate even
/// while a fresher recompute is still in flight.
pub async fn get_rating(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<RatingResponse>, ApiError> {
    if let Some(cached) = state.cache.get(&product_id).await? {
        metrics().cache_hits.inc();
        debug!(product_id = %product_id, "Rating served from cache");
        return Ok(Json(RatingResponse {
            product_id,
            average_rating: cached.average_rating,
            review_count: None,
            source: "cache",
        }));
    }
    metrics().cache_misses.inc();

    match state.store.latest_snapshot(&product_id).await? {
        Some(snapshot) => {
            debug!(product_id = %product_id, "Rating served from snapshot");
            Ok(Json(RatingResponse {
                product_id,
                average_rating: snapshot.average_rating,
                review_count: Some(snapshot.review_count),
                source: "snapshot",
            }))
        }
        None => Err(ApiError::not_found(format!(
            "no rating recorded for product {product_id}"
        ))),
    }
}
