//! Mock implementations for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use pipeline_core::{Error, JobOutcomeEvent, RatingSnapshot, Result};
use review_store::{MemoryReviewStore, Review, ReviewStore};
use worker::OutcomeHook;

/// Store wrapper with switchable read/write failures.
///
/// Delegates to the in-memory store so tests exercise the real persistence
/// paths, but can simulate a backend outage on either side of the
/// aggregation (review reads vs. snapshot writes) independently.
pub struct FlakyStore {
    inner: MemoryReviewStore,
    fail_reads: Mutex<bool>,
    fail_writes: Mutex<bool>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryReviewStore::new(),
            fail_reads: Mutex::new(false),
            fail_writes: Mutex::new(false),
        }
    }

    /// Makes `find_reviews_by_product` fail until disabled.
    pub fn set_fail_reads(&self, fail: bool) {
        *self.fail_reads.lock() = fail;
    }

    /// Makes `create_rating_snapshot` fail until disabled.
    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock() = fail;
    }
}

impl Default for FlakyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReviewStore for FlakyStore {
    async fn find_reviews_by_product(&self, product_id: &str) -> Result<Vec<Review>> {
        if *self.fail_reads.lock() {
            return Err(Error::store("simulated read outage"));
        }
        self.inner.find_reviews_by_product(product_id).await
    }

    async fn create_rating_snapshot(
        &self,
        product_id: &str,
        average_rating: f64,
        review_count: usize,
    ) -> Result<RatingSnapshot> {
        if *self.fail_writes.lock() {
            return Err(Error::store("simulated write outage"));
        }
        self.inner
            .create_rating_snapshot(product_id, average_rating, review_count)
            .await
    }

    async fn latest_snapshot(&self, product_id: &str) -> Result<Option<RatingSnapshot>> {
        self.inner.latest_snapshot(product_id).await
    }

    async fn insert_review(&self, review: Review) -> Result<Review> {
        self.inner.insert_review(review).await
    }

    async fn update_review(
        &self,
        review_id: &str,
        rating: u8,
        content: Option<String>,
    ) -> Result<Review> {
        self.inner.update_review(review_id, rating, content).await
    }

    async fn delete_review(&self, review_id: &str) -> Result<Review> {
        self.inner.delete_review(review_id).await
    }

    async fn get_review(&self, review_id: &str) -> Result<Option<Review>> {
        self.inner.get_review(review_id).await
    }
}

/// Outcome hook that captures every job disposition in memory.
#[derive(Clone, Default)]
pub struct RecordingHook {
    events: Arc<Mutex<Vec<JobOutcomeEvent>>>,
}

impl RecordingHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<JobOutcomeEvent> {
        self.events.lock().clone()
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().len()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl OutcomeHook for RecordingHook {
    fn on_outcome(&self, event: &JobOutcomeEvent) {
        self.events.lock().push(event.clone());
    }
}
