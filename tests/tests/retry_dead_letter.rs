//! Retry and dead-letter behavior under backend outages and malformed
//! payloads. Runs under paused time so the exponential backoff delays
//! fast-forward instead of being waited out.

use std::sync::Arc;
use std::time::Duration;

use pipeline_core::limits::{BACKOFF_BASE_MS, MAX_ATTEMPTS, PRIORITY_DEFAULT};
use pipeline_core::JobOptions;
use queue::{DurableQueue, Publisher, QueueConfig};
use rating_cache::{MokaRatingCache, RatingCache};
use review_store::ReviewStore;
use worker::{EventProcessor, RatingAggregator, WorkerPool, WorkerPoolConfig};

use integration_tests::fixtures;
use integration_tests::mocks::{FlakyStore, RecordingHook};

struct Harness {
    queue: Arc<DurableQueue>,
    publisher: Publisher,
    store: Arc<FlakyStore>,
    hook: RecordingHook,
    pool: Arc<WorkerPool>,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl Harness {
    fn start() -> Self {
        let queue = Arc::new(DurableQueue::new(QueueConfig::default()));
        let store = Arc::new(FlakyStore::new());
        let cache = Arc::new(MokaRatingCache::default());
        let hook = RecordingHook::new();

        let aggregator = RatingAggregator::new(
            store.clone() as Arc<dyn ReviewStore>,
            cache as Arc<dyn RatingCache>,
        );
        let pool = Arc::new(
            WorkerPool::new(
                queue.clone(),
                Arc::new(EventProcessor::new(aggregator)),
                WorkerPoolConfig { concurrency: 2 },
            )
            .with_hook(Arc::new(hook.clone())),
        );
        let handles = pool.start();

        Self {
            publisher: Publisher::new(queue.clone()),
            queue,
            store,
            hook,
            pool,
            handles,
        }
    }

    async fn shutdown(self) {
        self.pool.shutdown(self.handles).await;
    }
}

/// Polls a condition, yielding so paused time can advance past backoff
/// delays.
async fn wait_until<F: Fn() -> bool>(cond: F) {
    for _ in 0..1000 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("condition not reached");
}

#[tokio::test(start_paused = true)]
async fn backend_outage_retries_until_store_heals() {
    let h = Harness::start();

    let review = fixtures::review("P1", 5);
    h.store.insert_review(review.clone()).await.unwrap();
    h.store.set_fail_reads(true);

    h.publisher.publish(&fixtures::created_event(&review)).unwrap();

    // First attempt fails and is re-enqueued with a delay.
    wait_until(|| h.hook.event_count() >= 1).await;
    let events = h.hook.events();
    assert_eq!(events[0].outcome.label(), "retried");

    h.store.set_fail_reads(false);

    wait_until(|| h.queue.completed_jobs().len() == 1).await;
    assert!(h.queue.dead_letters().is_empty());

    let snapshot = h.store.latest_snapshot("P1").await.unwrap().unwrap();
    assert_eq!(snapshot.average_rating, 5.0);

    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn unknown_event_kind_dead_letters_after_max_attempts() {
    let h = Harness::start();

    h.queue
        .enqueue(
            fixtures::unknown_kind_payload("P1"),
            PRIORITY_DEFAULT,
            JobOptions::default(),
        )
        .unwrap();

    wait_until(|| h.queue.dead_letters().len() == 1).await;

    let dead = h.queue.dead_letters();
    assert_eq!(dead[0].job.attempt_count, MAX_ATTEMPTS);
    assert!(dead[0].reason.contains("review.flagged"));

    // One outcome per attempt: two retries, then the dead-letter.
    let events = h.hook.events();
    assert_eq!(events.len(), MAX_ATTEMPTS as usize);
    assert_eq!(events[0].outcome.label(), "retried");
    assert_eq!(events[1].outcome.label(), "retried");
    assert_eq!(events[2].outcome.label(), "dead_lettered");

    // And nothing was aggregated for the product.
    assert!(h.store.latest_snapshot("P1").await.unwrap().is_none());

    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn missing_type_tag_dead_letters_without_snapshot() {
    let h = Harness::start();

    h.queue
        .enqueue(
            fixtures::untagged_payload("P2"),
            PRIORITY_DEFAULT,
            JobOptions::default(),
        )
        .unwrap();

    wait_until(|| h.queue.dead_letters().len() == 1).await;
    assert!(h.store.latest_snapshot("P2").await.unwrap().is_none());

    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn retry_delays_follow_exponential_backoff() {
    let h = Harness::start();
    let started = tokio::time::Instant::now();

    h.queue
        .enqueue(
            fixtures::unknown_kind_payload("P1"),
            PRIORITY_DEFAULT,
            JobOptions::default(),
        )
        .unwrap();

    wait_until(|| h.queue.dead_letters().len() == 1).await;

    // Two backoff waits happened before the third attempt: base, then
    // double the base.
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(BACKOFF_BASE_MS * 3));

    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn persistent_write_outage_exhausts_retries() {
    let h = Harness::start();

    let review = fixtures::review("P1", 3);
    h.store.insert_review(review.clone()).await.unwrap();
    h.store.set_fail_writes(true);

    h.publisher.publish(&fixtures::created_event(&review)).unwrap();

    wait_until(|| h.queue.dead_letters().len() == 1).await;

    let dead = h.queue.dead_letters();
    assert_eq!(dead[0].job.attempt_count, MAX_ATTEMPTS);
    assert!(dead[0].reason.contains("snapshot write failed"));

    h.shutdown().await;
}
