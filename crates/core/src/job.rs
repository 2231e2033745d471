//! Queue-level job types.
//!
//! A `Job` wraps a serialized event with retry bookkeeping. The worker pool
//! exclusively owns lifecycle transitions: Enqueued → InFlight →
//! {Completed | ReEnqueued(delayed) | DeadLettered}.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::limits::{BACKOFF_BASE_MS, MAX_ATTEMPTS, RETAIN_COMPLETED, RETAIN_FAILED};

/// Queue-assigned job identifier, unique per enqueue (not per event: a
/// re-published event gets a fresh id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Backoff strategy between retry attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Backoff {
    /// Delay doubles per attempt: `base * 2^(attempt - 1)`.
    Exponential {
        #[serde(rename = "baseMs")]
        base_ms: u64,
    },
}

impl Backoff {
    /// Delay before the next attempt, given how many attempts have failed.
    pub fn delay(&self, failed_attempts: u32) -> Duration {
        match self {
            Self::Exponential { base_ms } => {
                let exp = failed_attempts.saturating_sub(1).min(16);
                Duration::from_millis(base_ms.saturating_mul(1 << exp))
            }
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base_ms: BACKOFF_BASE_MS,
        }
    }
}

/// Per-job retry and retention options, fixed at enqueue time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobOptions {
    pub max_attempts: u32,
    pub backoff: Backoff,
    /// Completed records retained before pruning.
    pub remove_on_complete: usize,
    /// Dead-lettered records retained before pruning.
    pub remove_on_fail: usize,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            backoff: Backoff::default(),
            remove_on_complete: RETAIN_COMPLETED,
            remove_on_fail: RETAIN_FAILED,
        }
    }
}

/// A unit of queued work: serialized event payload plus retry bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    /// Serialized `ReviewEvent` as it crossed the wire.
    pub payload: serde_json::Value,
    /// Higher runs first; FIFO within a priority level.
    pub priority: u8,
    /// Failed processing attempts so far.
    pub attempt_count: u32,
    pub enqueued_at: DateTime<Utc>,
    pub options: JobOptions,
    /// Most recent failure, for operator inspection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl Job {
    pub fn new(payload: serde_json::Value, priority: u8, options: JobOptions) -> Self {
        Self {
            id: JobId::new(),
            payload,
            priority,
            attempt_count: 0,
            enqueued_at: Utc::now(),
            options,
            last_error: None,
        }
    }

    /// Whether another retry is allowed after the current failure count.
    pub fn retries_remaining(&self) -> bool {
        self.attempt_count < self.options.max_attempts
    }

    /// Backoff delay before the next attempt.
    pub fn retry_delay(&self) -> Duration {
        self.options.backoff.delay(self.attempt_count)
    }
}

/// Per-job result consumed by the worker pool loop. Replaces callback-style
/// worker event hooks: control flow reads the variant, observability gets a
/// structured `JobOutcomeEvent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed,
    Retry { delay: Duration, reason: String },
    DeadLettered { reason: String },
}

impl JobOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Retry { .. } => "retried",
            Self::DeadLettered { .. } => "dead_lettered",
        }
    }
}

/// Structured outcome event handed to the observability hook after every
/// processed job.
#[derive(Debug, Clone)]
pub struct JobOutcomeEvent {
    pub job_id: JobId,
    /// Wire tag of the event kind, when the payload decoded far enough.
    pub event_kind: Option<String>,
    pub product_id: Option<String>,
    /// Attempt count after this processing round.
    pub attempt: u32,
    pub duration_ms: u64,
    pub outcome: JobOutcome,
}
