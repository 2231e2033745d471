//! Observability hook for job outcomes.
//!
//! The pool's control flow consumes `JobOutcome` directly; hooks only
//! observe. Swapping the hook never changes retry behavior.

use pipeline_core::{JobOutcome, JobOutcomeEvent};
use tracing::{error, info, warn};

/// Receives a structured outcome event after every processed job.
pub trait OutcomeHook: Send + Sync {
    fn on_outcome(&self, event: &JobOutcomeEvent);
}

/// Default hook: structured logs per disposition.
pub struct TracingHook;

impl OutcomeHook for TracingHook {
    fn on_outcome(&self, event: &JobOutcomeEvent) {
        let kind = event.event_kind.as_deref().unwrap_or("unknown");
        let product = event.product_id.as_deref().unwrap_or("unknown");

        match &event.outcome {
            JobOutcome::Completed => info!(
                job_id = %event.job_id,
                kind,
                product_id = product,
                duration_ms = event.duration_ms,
                "Job completed"
            ),
            JobOutcome::Retry { delay, reason } => warn!(
                job_id = %event.job_id,
                kind,
                product_id = product,
                attempt = event.attempt,
                delay_ms = delay.as_millis() as u64,
                error = %reason,
                "Job failed, re-enqueued with backoff"
            ),
            JobOutcome::DeadLettered { reason } => error!(
                job_id = %event.job_id,
                kind,
                product_id = product,
                attempt = event.attempt,
                error = %reason,
                "Job dead-lettered after exhausting attempts"
            ),
        }
    }
}
