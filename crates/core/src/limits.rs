//! Tunable constants for the review pipeline.
//!
//! Retry and retention values match the queue's default job options; the
//! worker pool and cache read their defaults from here so the numbers live
//! in one place.

// === Retry Policy ===

/// Maximum processing attempts before a job is dead-lettered.
pub const MAX_ATTEMPTS: u32 = 3;

/// Base delay for exponential backoff between attempts (milliseconds).
/// Doubles per attempt: 2000ms, 4000ms.
pub const BACKOFF_BASE_MS: u64 = 2_000;

// === Priorities ===

/// Priority for `review.created` events. Created events surface rating
/// changes sooner since they affect UX immediately after submission.
pub const PRIORITY_CREATED: u8 = 10;

/// Priority for `review.updated` and `review.deleted` events.
pub const PRIORITY_DEFAULT: u8 = 5;

// === Job Retention ===

/// Completed job records kept for observability before pruning.
pub const RETAIN_COMPLETED: usize = 100;

/// Dead-lettered job records kept for operator inspection before pruning.
pub const RETAIN_FAILED: usize = 50;

// === Stall Detection ===

/// An in-flight job whose lease exceeds this is reclaimed and retried.
pub const STALL_TIMEOUT_SECS: u64 = 30;

/// How often the queue scans for stalled leases.
pub const STALL_RECLAIM_INTERVAL_SECS: u64 = 5;

// === Workers ===

/// Default worker pool concurrency.
pub const DEFAULT_CONCURRENCY: usize = 5;

// === Cache ===

/// TTL for cached rating entries (seconds).
pub const RATING_CACHE_TTL_SECS: u64 = 300;

/// Maximum cached rating entries.
pub const RATING_CACHE_CAPACITY: u64 = 10_000;

// === Ratings ===

/// Lowest valid review rating.
pub const MIN_RATING: u8 = 1;

/// Highest valid review rating.
pub const MAX_RATING: u8 = 5;
