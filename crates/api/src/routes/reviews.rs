//! Review mutation endpoints.
//!
//! Each handler commits the store mutation first, then publishes the
//! matching event. Publish failure after a committed write surfaces as
//! 503 so the caller can reconcile; the write itself is not rolled back.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use pipeline_core::{JobId, ReviewEvent};
use review_store::Review;

use crate::response::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
    #[validate(length(max = 2000))]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
    #[validate(length(max = 2000))]
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    #[serde(flatten)]
    pub review: Review,
    pub job_id: JobId,
}

pub async fn create_review(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Json(req): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), ApiError> {
    req.validate()?;

    let review = Review::new(Uuid::new_v4().to_string(), &product_id, req.rating, req.content);
    let review = state.store.insert_review(review).await?;

    let event = ReviewEvent::created(&review.product_id, &review.id, review.rating);
    let job_id = state.publisher.publish(&event)?;

    info!(
        product_id = %review.product_id,
        review_id = %review.id,
        job_id = %job_id,
        "Review created"
    );
    Ok((StatusCode::CREATED, Json(ReviewResponse { review, job_id })))
}

pub async fn update_review(
    State(state): State<AppState>,
    Path((product_id, review_id)): Path<(String, String)>,
    Json(req): Json<UpdateReviewRequest>,
) -> Result<Json<ReviewResponse>, ApiError> {
    req.validate()?;

    let previous = fetch_owned(&state, &product_id, &review_id).await?;
    let review = state
        .store
        .update_review(&review_id, req.rating, req.content)
        .await?;

    let event = ReviewEvent::updated(&product_id, &review_id, review.rating, previous.rating);
    let job_id = state.publisher.publish(&event)?;

    info!(
        product_id = %product_id,
        review_id = %review_id,
        old_rating = previous.rating,
        new_rating = review.rating,
        job_id = %job_id,
        "Review updated"
    );
    Ok(Json(ReviewResponse { review, job_id }))
}

pub async fn delete_review(
    State(state): State<AppState>,
    Path((product_id, review_id)): Path<(String, String)>,
) -> Result<Json<ReviewResponse>, ApiError> {
    fetch_owned(&state, &product_id, &review_id).await?;
    let removed = state.store.delete_review(&review_id).await?;

    let event = ReviewEvent::deleted(&product_id, &review_id, removed.rating);
    let job_id = state.publisher.publish(&event)?;

    info!(
        product_id = %product_id,
        review_id = %review_id,
        rating = removed.rating,
        job_id = %job_id,
        "Review deleted"
    );
    Ok(Json(ReviewResponse {
        review: removed,
        job_id,
    }))
}

/// Resolves a review and checks it belongs to the addressed product.
async fn fetch_owned(
    state: &AppState,
    product_id: &str,
    review_id: &str,
) -> Result<Review, ApiError> {
    match state.store.get_review(review_id).await? {
        Some(review) if review.product_id == product_id => Ok(review),
        _ => Err(ApiError::not_found(format!(
            "review {review_id} not found for product {product_id}"
        ))),
    }
}
