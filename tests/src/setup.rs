//! Common test setup functions.

use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use tokio::task::JoinHandle;

use api::{router, AppState};
use pipeline_core::RatingSnapshot;
use queue::{DurableQueue, Publisher, QueueConfig};
use rating_cache::{CacheConfig, MokaRatingCache, RatingCache};
use review_store::ReviewStore;
use worker::{EventProcessor, RatingAggregator, WorkerPool, WorkerPoolConfig};

use crate::mocks::{FlakyStore, RecordingHook};

/// Fully wired pipeline over in-process components.
///
/// Uses the real router, queue, worker pool, and aggregator; the store is
/// the flaky in-memory wrapper so tests can inject backend failures, and
/// job outcomes are captured by a recording hook.
pub struct TestContext {
    pub queue: Arc<DurableQueue>,
    pub publisher: Arc<Publisher>,
    pub store: Arc<FlakyStore>,
    pub cache: Arc<MokaRatingCache>,
    pub hook: RecordingHook,
    pub server: TestServer,
    pool: Arc<WorkerPool>,
    handles: Vec<JoinHandle<()>>,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_cache_config(CacheConfig::default()).await
    }

    pub async fn with_cache_config(cache_config: CacheConfig) -> Self {
        let queue = Arc::new(DurableQueue::new(QueueConfig::default()));
        let store = Arc::new(FlakyStore::new());
        let cache = Arc::new(MokaRatingCache::new(cache_config));
        let hook = RecordingHook::new();

        let aggregator = RatingAggregator::new(
            store.clone() as Arc<dyn ReviewStore>,
            cache.clone() as Arc<dyn RatingCache>,
        );
        let processor = Arc::new(EventProcessor::new(aggregator));
        let pool = Arc::new(
            WorkerPool::new(queue.clone(), processor, WorkerPoolConfig::default())
                .with_hook(Arc::new(hook.clone())),
        );
        let handles = pool.start();

        let state = AppState::new(
            queue.clone(),
            store.clone() as Arc<dyn ReviewStore>,
            cache.clone() as Arc<dyn RatingCache>,
        );
        let publisher = state.publisher.clone();
        let server = TestServer::new(router(state)).expect("Failed to start test server");

        Self {
            queue,
            publisher,
            store,
            cache,
            hook,
            server,
            pool,
            handles,
        }
    }

    /// Closes the queue and joins the workers.
    pub async fn shutdown(mut self) {
        let handles = std::mem::take(&mut self.handles);
        self.pool.shutdown(handles).await;
    }

    /// Polls until the latest snapshot for the product reaches the expected
    /// review count. Panics after ~2s.
    pub async fn wait_for_snapshot(&self, product_id: &str, review_count: usize) -> RatingSnapshot {
        for _ in 0..200 {
            if let Ok(Some(snapshot)) = self.store.latest_snapshot(product_id).await {
                if snapshot.review_count == review_count {
                    return snapshot;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("timed out waiting for {product_id} snapshot with {review_count} reviews");
    }

    /// Polls until nothing is ready, delayed, or in flight.
    pub async fn wait_for_drain(&self) {
        for _ in 0..500 {
            let stats = self.queue.stats();
            if stats.ready == 0 && stats.delayed == 0 && stats.in_flight == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("timed out waiting for queue to drain");
    }
}
