//! Event publisher: turns review mutations into queued jobs.

use pipeline_core::{JobId, JobOptions, Result, ReviewEvent};
use std::sync::Arc;
use telemetry::metrics;
use tracing::{debug, error};
use validator::Validate;

use crate::queue::DurableQueue;

/// Publishes review events onto the durable queue.
///
/// Enqueue failure propagates synchronously: the CRUD operation that
/// produced the event treats it as a failure of the mutation's side
/// effect, not a reason to roll the mutation back.
pub struct Publisher {
    queue: Arc<DurableQueue>,
}

impl Publisher {
    pub fn new(queue: Arc<DurableQueue>) -> Self {
        Self { queue }
    }

    /// Validates and durably enqueues an event, returning the queue-assigned
    /// job id. Priority follows the event kind: Created events run first.
    pub fn publish(&self, event: &ReviewEvent) -> Result<JobId> {
        event.validate()?;

        let payload = event.to_payload()?;
        let job_id = self
            .queue
            .enqueue(payload, event.kind.priority(), JobOptions::default())
            .inspect_err(|e| {
                metrics().publish_errors.inc();
                error!(
                    kind = %event.kind,
                    product_id = %event.product_id,
                    error = %e,
                    "Failed to publish review event"
                );
            })?;

        metrics().events_published.inc();
        debug!(
            job_id = %job_id,
            kind = %event.kind,
            product_id = %event.product_id,
            review_id = %event.review_id,
            "Published review event"
        );
        Ok(job_id)
    }
}
