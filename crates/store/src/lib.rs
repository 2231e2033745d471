//! Persistence boundary for the review pipeline.
//!
//! The pipeline consumes persistence through the `ReviewStore` trait;
//! external engines implement the same trait. The in-memory implementation
//! here is the reference backend used by the binary and the test suite.

pub mod memory;
pub mod review;
pub mod store;

pub use memory::MemoryReviewStore;
pub use review::Review;
pub use store::ReviewStore;
