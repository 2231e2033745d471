//! The `ReviewStore` trait: persistence interface consumed by the pipeline.

use async_trait::async_trait;
use pipeline_core::{RatingSnapshot, Result};

use crate::review::Review;

/// Persistence interface for reviews and rating snapshots.
///
/// The aggregator consumes the read path plus `create_rating_snapshot`;
/// the review CRUD boundary consumes the mutation methods. Snapshot rows
/// are append-only: `create_rating_snapshot` never overwrites, and the
/// latest row by `created_at` is authoritative.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// All reviews currently associated with a product.
    async fn find_reviews_by_product(&self, product_id: &str) -> Result<Vec<Review>>;

    /// Appends a new snapshot row, stamping `created_at` at insert so that
    /// row order and timestamp order agree under concurrent recomputes.
    async fn create_rating_snapshot(
        &self,
        product_id: &str,
        average_rating: f64,
        review_count: usize,
    ) -> Result<RatingSnapshot>;

    /// Most recent snapshot for a product, if any.
    async fn latest_snapshot(&self, product_id: &str) -> Result<Option<RatingSnapshot>>;

    /// Inserts a review. Fails if the id already exists.
    async fn insert_review(&self, review: Review) -> Result<Review>;

    /// Replaces the rating (and content) of an existing review, returning
    /// the previous version.
    async fn update_review(
        &self,
        review_id: &str,
        rating: u8,
        content: Option<String>,
    ) -> Result<Review>;

    /// Deletes a review, returning the removed version.
    async fn delete_review(&self, review_id: &str) -> Result<Review>;

    /// Looks up a single review.
    async fn get_review(&self, review_id: &str) -> Result<Option<Review>>;
}
