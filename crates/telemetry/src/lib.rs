//! Internal telemetry for the review pipeline.
//!
//! Structured logging via tracing plus an in-memory metrics registry the
//! queue and worker pool keep current. No external metrics system.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::*;
pub use tracing_setup::*;
