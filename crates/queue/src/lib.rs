//! Durable work queue and event publisher.
//!
//! The queue stores enqueued events as jobs with retry metadata and hands
//! them to the worker pool under at-least-once semantics: priority ordering,
//! delayed re-enqueue for retries, in-flight leases with stall reclaim, and
//! retention-capped completed/dead-letter records for observability.

pub mod config;
pub mod publisher;
pub mod queue;

pub use config::QueueConfig;
pub use publisher::Publisher;
pub use queue::{CompletedJob, DeadLetter, DurableQueue, QueueStats};
