//! Application state shared across handlers.

use queue::{DurableQueue, Publisher};
use rating_cache::RatingCache;
use review_store::ReviewStore;
use std::sync::Arc;

/// Shared application state. All handles are explicitly constructed at
/// startup and passed in; no process-wide singletons.
#[derive(Clone)]
pub struct AppState {
    pub queue: Arc<DurableQueue>,
    pub publisher: Arc<Publisher>,
    pub store: Arc<dyn ReviewStore>,
    pub cache: Arc<dyn RatingCache>,
}

impl AppState {
    pub fn new(
        queue: Arc<DurableQueue>,
        store: Arc<dyn ReviewStore>,
        cache: Arc<dyn RatingCache>,
    ) -> Self {
        Self {
            publisher: Arc::new(Publisher::new(queue.clone())),
            queue,
            store,
            cache,
        }
    }
}
