//! Test fixtures and event generators.

use chrono::Utc;
use uuid::Uuid;

use pipeline_core::ReviewEvent;
use review_store::Review;

/// A review with a fresh id for the given product.
pub fn review(product_id: &str, rating: u8) -> Review {
    Review::new(Uuid::new_v4().to_string(), product_id, rating, None)
}

/// A `review.created` event for an existing review row.
pub fn created_event(review: &Review) -> ReviewEvent {
    ReviewEvent::created(&review.product_id, &review.id, review.rating)
}

/// A wire payload with an unrecognized `type` tag. Schema-valid JSON,
/// rejected only at kind parsing.
pub fn unknown_kind_payload(product_id: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "review.flagged",
        "productId": product_id,
        "reviewId": Uuid::new_v4().to_string(),
        "timestamp": Utc::now().to_rfc3339(),
    })
}

/// A wire payload missing the `type` tag entirely.
pub fn untagged_payload(product_id: &str) -> serde_json::Value {
    serde_json::json!({
        "productId": product_id,
        "reviewId": Uuid::new_v4().to_string(),
        "timestamp": Utc::now().to_rfc3339(),
    })
}

/// Request body for the create/update review endpoints.
pub fn review_body(rating: u8) -> serde_json::Value {
    serde_json::json!({ "rating": rating })
}

/// Request body with review content attached.
pub fn review_body_with_content(rating: u8, content: &str) -> serde_json::Value {
    serde_json::json!({ "rating": rating, "content": content })
}
