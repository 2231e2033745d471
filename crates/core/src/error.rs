//! Unified error types for the review pipeline.
//!
//! Propagation policy: everything raised while a job is being processed
//! bubbles up to the worker pool's retry loop; only retry exhaustion is a
//! terminal, operator-visible failure (the dead-letter list). The one
//! synchronous caller-facing failure is `EnqueueFailure` at publish time.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the review pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// Queue unreachable or closed at publish time. Surfaced synchronously
    /// to the caller of `Publisher::publish`.
    #[error("enqueue failed: {0}")]
    EnqueueFailure(String),

    /// The wire payload carried an event kind tag outside the closed set.
    /// Fails the job immediately; eligible for retry/dead-letter like any
    /// other failure.
    #[error("unknown event kind: {0}")]
    UnknownEventKind(String),

    /// Persistence read or write failed during a rating recompute.
    #[error("rating aggregation failed: {0}")]
    AggregationFailed(String),

    /// A worker held a job lease past the stall deadline; the queue
    /// reclaimed the job for retry.
    #[error("job stalled: {0}")]
    Stalled(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("cache error: {0}")]
    Cache(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn enqueue(msg: impl Into<String>) -> Self {
        Self::EnqueueFailure(msg.into())
    }

    pub fn unknown_kind(tag: impl Into<String>) -> Self {
        Self::UnknownEventKind(tag.into())
    }

    pub fn aggregation(msg: impl Into<String>) -> Self {
        Self::AggregationFailed(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}
