//! Worker pool: concurrent job consumption with retry and dead-lettering.

use pipeline_core::limits::DEFAULT_CONCURRENCY;
use pipeline_core::{Job, JobOutcome, JobOutcomeEvent};
use queue::DurableQueue;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use telemetry::metrics;
use tracing::{debug, info};

use crate::hooks::{OutcomeHook, TracingHook};
use crate::processor::EventProcessor;

/// Worker pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerPoolConfig {
    /// Jobs processed concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

/// Fixed-size pool of workers pulling from the shared durable queue.
///
/// Owns every job lifecycle transition: a processing result is mapped to a
/// `JobOutcome` and applied to the queue here, nowhere else. Jobs for the
/// same product may run on different workers concurrently; the aggregator's
/// full-recompute design keeps that safe.
pub struct WorkerPool {
    queue: Arc<DurableQueue>,
    processor: Arc<EventProcessor>,
    hook: Arc<dyn OutcomeHook>,
    config: WorkerPoolConfig,
}

impl WorkerPool {
    pub fn new(
        queue: Arc<DurableQueue>,
        processor: Arc<EventProcessor>,
        config: WorkerPoolConfig,
    ) -> Self {
        Self {
            queue,
            processor,
            hook: Arc::new(TracingHook),
            config,
        }
    }

    /// Replaces the observability hook.
    pub fn with_hook(mut self, hook: Arc<dyn OutcomeHook>) -> Self {
        self.hook = hook;
        self
    }

    /// Spawns the workers. Each runs until the queue closes; the returned
    /// handles complete once in-flight jobs have drained.
    pub fn start(self: &Arc<Self>) -> Vec<tokio::task::JoinHandle<()>> {
        info!(concurrency = self.config.concurrency, "Worker pool starting");

        (0..self.config.concurrency)
            .map(|worker_id| {
                let pool = self.clone();
                tokio::spawn(async move {
                    pool.worker_loop(worker_id).await;
                })
            })
            .collect()
    }

    async fn worker_loop(&self, worker_id: usize) {
        debug!(worker_id, "Worker listening for jobs");

        // lease() returns None once the queue closes; the current job is
        // always finished first, the rest are left for reclaim elsewhere.
        while let Some(job) = self.queue.lease().await {
            self.process_one(worker_id, job).await;
        }

        debug!(worker_id, "Worker stopped");
    }

    async fn process_one(&self, worker_id: usize, job: Job) {
        let started = std::time::Instant::now();
        debug!(worker_id, job_id = %job.id, "Starting job processing");

        let result = self.processor.process(&job.payload).await;
        let duration_ms = started.elapsed().as_millis() as u64;
        metrics().jobs_processed.inc();
        metrics().job_latency_ms.observe(duration_ms);

        let (outcome, attempt) = match result {
            Ok(()) => {
                self.queue.complete(job.id);
                metrics().jobs_completed.inc();
                (JobOutcome::Completed, job.attempt_count)
            }
            Err(e) => {
                let failed_attempts = job.attempt_count + 1;
                let reason = e.to_string();
                if failed_attempts < job.options.max_attempts {
                    let delay = job.options.backoff.delay(failed_attempts);
                    self.queue.retry(job.id, delay, &reason);
                    metrics().jobs_retried.inc();
                    (JobOutcome::Retry { delay, reason }, failed_attempts)
                } else {
                    self.queue.dead_letter(job.id, &reason);
                    metrics().jobs_dead_lettered.inc();
                    (JobOutcome::DeadLettered { reason }, failed_attempts)
                }
            }
        };

        self.hook.on_outcome(&JobOutcomeEvent {
            job_id: job.id,
            event_kind: job
                .payload
                .get("type")
                .and_then(|v| v.as_str())
                .map(String::from),
            product_id: job
                .payload
                .get("productId")
                .and_then(|v| v.as_str())
                .map(String::from),
            attempt,
            duration_ms,
            outcome,
        });
    }

    /// Closes the queue and waits for the workers to drain.
    pub async fn shutdown(&self, handles: Vec<tokio::task::JoinHandle<()>>) {
        info!("Worker pool shutting down, draining in-flight jobs");
        self.queue.close();
        for handle in handles {
            let _ = handle.await;
        }
        info!("Worker pool drained");
    }
}
