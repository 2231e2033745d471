//! Worker side of the review pipeline.
//!
//! Pulls jobs from the durable queue, dispatches decoded events to the
//! rating aggregator, and applies the retry/dead-letter policy:
//! Queue → WorkerPool → EventProcessor → RatingAggregator → {store, cache}.

pub mod aggregator;
pub mod hooks;
pub mod pool;
pub mod processor;

pub use aggregator::RatingAggregator;
pub use hooks::{OutcomeHook, TracingHook};
pub use pool::{WorkerPool, WorkerPoolConfig};
pub use processor::EventProcessor;
