//! In-memory reference implementation of `ReviewStore`.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use pipeline_core::{Error, RatingSnapshot, Result};
use std::collections::HashMap;

use crate::review::Review;
use crate::store::ReviewStore;

#[derive(Default)]
struct Inner {
    /// Reviews keyed by review id.
    reviews: HashMap<String, Review>,
    /// Append-only snapshot rows per product.
    snapshots: HashMap<String, Vec<RatingSnapshot>>,
}

/// In-memory review store. Interior mutability via a single RwLock; the
/// aggregator's full-recompute design needs no finer-grained locking.
#[derive(Default)]
pub struct MemoryReviewStore {
    inner: RwLock<Inner>,
}

impl MemoryReviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All snapshot rows for a product, oldest first. Test/operator helper.
    pub fn snapshots_for(&self, product_id: &str) -> Vec<RatingSnapshot> {
        self.inner
            .read()
            .snapshots
            .get(product_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Total review count across all products.
    pub fn review_count(&self) -> usize {
        self.inner.read().reviews.len()
    }
}

#[async_trait]
impl ReviewStore for MemoryReviewStore {
    async fn find_reviews_by_product(&self, product_id: &str) -> Result<Vec<Review>> {
        let inner = self.inner.read();
        Ok(inner
            .reviews
            .values()
            .filter(|r| r.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn create_rating_snapshot(
        &self,
        product_id: &str,
        average_rating: f64,
        review_count: usize,
    ) -> Result<RatingSnapshot> {
        let snapshot = RatingSnapshot {
            product_id: product_id.to_string(),
            average_rating,
            review_count,
            // Stamped under the write lock: append order == timestamp order.
            created_at: Utc::now(),
        };

        let mut inner = self.inner.write();
        inner
            .snapshots
            .entry(product_id.to_string())
            .or_default()
            .push(snapshot.clone());
        Ok(snapshot)
    }

    async fn latest_snapshot(&self, product_id: &str) -> Result<Option<RatingSnapshot>> {
        let inner = self.inner.read();
        Ok(inner
            .snapshots
            .get(product_id)
            .and_then(|rows| rows.last())
            .cloned())
    }

    async fn insert_review(&self, review: Review) -> Result<Review> {
        let mut inner = self.inner.write();
        if inner.reviews.contains_key(&review.id) {
            return Err(Error::store(format!("review {} already exists", review.id)));
        }
        inner.reviews.insert(review.id.clone(), review.clone());
        Ok(review)
    }

    async fn update_review(
        &self,
        review_id: &str,
        rating: u8,
        content: Option<String>,
    ) -> Result<Review> {
        let mut inner = self.inner.write();
        let review = inner
            .reviews
            .get_mut(review_id)
            .ok_or_else(|| Error::not_found(format!("review {review_id} not found")))?;

        let previous = review.clone();
        review.rating = rating;
        if content.is_some() {
            review.content = content;
        }
        Ok(previous)
    }

    async fn delete_review(&self, review_id: &str) -> Result<Review> {
        let mut inner = self.inner.write();
        inner
            .reviews
            .remove(review_id)
            .ok_or_else(|| Error::not_found(format!("review {review_id} not found")))
    }

    async fn get_review(&self, review_id: &str) -> Result<Option<Review>> {
        Ok(self.inner.read().reviews.get(review_id).cloned())
    }
}
