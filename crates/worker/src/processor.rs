//! Event processor: decodes queued payloads and dispatches by kind.

use pipeline_core::{EventKind, Result, ReviewEvent};
use tracing::{debug, error, info};

use crate::aggregator::RatingAggregator;

/// Dispatches dequeued events to the correct handler by kind.
///
/// All kinds currently converge on full rating recomputation; the per-kind
/// handlers exist so the audit logging differs and so a future kind is a
/// compile-time-checked addition. `rating`/`old_rating` are never applied
/// as deltas, which is what makes re-running safe under at-least-once
/// delivery.
pub struct EventProcessor {
    aggregator: RatingAggregator,
}

impl EventProcessor {
    pub fn new(aggregator: RatingAggregator) -> Self {
        Self { aggregator }
    }

    /// Processes one queued payload. Any error propagates to the worker
    /// pool for retry; an unknown kind tag fails fast with
    /// `UnknownEventKind` rather than being silently ignored.
    pub async fn process(&self, payload: &serde_json::Value) -> Result<()> {
        let event = ReviewEvent::from_payload(payload)?;

        info!(
            kind = %event.kind,
            product_id = %event.product_id,
            review_id = %event.review_id,
            rating = event.rating,
            "Processing review event"
        );

        let result = match event.kind {
            EventKind::Created => self.handle_created(&event).await,
            EventKind::Updated => self.handle_updated(&event).await,
            EventKind::Deleted => self.handle_deleted(&event).await,
        };

        if let Err(ref e) = result {
            error!(
                kind = %event.kind,
                product_id = %event.product_id,
                review_id = %event.review_id,
                error = %e,
                "Failed to process review event"
            );
        }
        result
    }

    async fn handle_created(&self, event: &ReviewEvent) -> Result<()> {
        debug!(
            product_id = %event.product_id,
            review_id = %event.review_id,
            rating = event.rating,
            "Handling review creation"
        );
        self.aggregator.recompute(&event.product_id).await.map(|_| ())
    }

    async fn handle_updated(&self, event: &ReviewEvent) -> Result<()> {
        debug!(
            product_id = %event.product_id,
            review_id = %event.review_id,
            old_rating = event.old_rating,
            new_rating = event.rating,
            "Handling review update"
        );
        self.aggregator.recompute(&event.product_id).await.map(|_| ())
    }

    async fn handle_deleted(&self, event: &ReviewEvent) -> Result<()> {
        debug!(
            product_id = %event.product_id,
            review_id = %event.review_id,
            rating = event.rating,
            "Handling review deletion"
        );
        self.aggregator.recompute(&event.product_id).await.map(|_| ())
    }
}
