//! Rating aggregator: recomputes the authoritative average from the full
//! review set.
//!
//! Always derives from current state rather than applying event deltas, so
//! re-running any number of times (duplicate delivery, concurrent workers,
//! out-of-order events) converges to the same result. O(N) per event is the
//! accepted cost; review counts are moderate.

use pipeline_core::{Error, RatingSnapshot, Result};
use rating_cache::RatingCache;
use review_store::ReviewStore;
use std::sync::Arc;
use telemetry::metrics;
use tracing::{debug, info, warn};

/// Recomputes and persists rating snapshots. Sole creator of snapshot rows
/// and sole writer of cache entries.
pub struct RatingAggregator {
    store: Arc<dyn ReviewStore>,
    cache: Arc<dyn RatingCache>,
}

impl RatingAggregator {
    pub fn new(store: Arc<dyn ReviewStore>, cache: Arc<dyn RatingCache>) -> Self {
        Self { store, cache }
    }

    /// Recomputes the aggregate for a product and persists a new snapshot.
    ///
    /// Store failures abort before any cache write, so the cache never gets
    /// ahead of the durable store; the error surfaces as `AggregationFailed`
    /// for the worker pool to retry. A cache write failure after a
    /// successful snapshot write is logged and counted, never propagated.
    pub async fn recompute(&self, product_id: &str) -> Result<RatingSnapshot> {
        debug!(product_id = %product_id, "Calculating average rating");
        let started = std::time::Instant::now();

        let reviews = self
            .store
            .find_reviews_by_product(product_id)
            .await
            .map_err(|e| Error::aggregation(format!("review read failed: {e}")))?;

        let ratings: Vec<u8> = reviews.iter().map(|r| r.rating).collect();
        let computed = RatingSnapshot::compute(product_id, &ratings);

        let snapshot = self
            .store
            .create_rating_snapshot(product_id, computed.average_rating, computed.review_count)
            .await
            .map_err(|e| Error::aggregation(format!("snapshot write failed: {e}")))?;

        metrics().snapshots_written.inc();

        match self.cache.set(product_id, snapshot.average_rating).await {
            Ok(()) => metrics().cache_writes.inc(),
            Err(e) => {
                metrics().cache_write_errors.inc();
                warn!(
                    product_id = %product_id,
                    error = %e,
                    "Cache write failed after snapshot, serving from store until next recompute"
                );
            }
        }

        metrics()
            .recompute_latency_ms
            .observe(started.elapsed().as_millis() as u64);
        info!(
            product_id = %product_id,
            average_rating = snapshot.average_rating,
            review_count = snapshot.review_count,
            "Rating calculation completed"
        );
        Ok(snapshot)
    }
}
