//! API routes.

pub mod admin;
pub mod health;
pub mod ratings;
pub mod reviews;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Creates the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/products/:product_id/reviews",
            post(reviews::create_review),
        )
        .route(
            "/products/:product_id/reviews/:review_id",
            put(reviews::update_review).delete(reviews::delete_review),
        )
        .route("/products/:product_id/rating", get(ratings::get_rating))
        .route("/health", get(health::health_handler))
        .route("/health/ready", get(health::ready_handler))
        .route("/health/live", get(health::live_handler))
        .route("/queue/dead-letters", get(admin::dead_letters_handler))
        .route("/metrics", get(admin::metrics_handler))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
