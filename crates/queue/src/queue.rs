//! In-process durable work queue.
//!
//! Reference backend with the semantics the pipeline relies on: priority
//! dequeue (FIFO within a level), delayed scheduling for retry backoff,
//! in-flight leases with stall reclaim, and capped completed/dead-letter
//! retention. A broker-backed client can replace this behind the same
//! surface; the worker pool and publisher are agnostic.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use pipeline_core::{Error, Job, JobId, JobOptions, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use telemetry::metrics;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::QueueConfig;

/// Heap entry for ready jobs: higher priority first, FIFO within a level.
#[derive(Debug, PartialEq, Eq)]
struct ReadyEntry {
    priority: u8,
    seq: u64,
    job_id: JobId,
}

impl Ord for ReadyEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for ReadyEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Heap entry for delayed jobs: earliest run time first.
#[derive(Debug, PartialEq, Eq)]
struct DelayedEntry {
    run_at: Instant,
    seq: u64,
    job_id: JobId,
}

impl Ord for DelayedEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .run_at
            .cmp(&self.run_at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for DelayedEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct InFlightEntry {
    job: Job,
    /// Lease deadline; past this the job counts as stalled.
    deadline: Instant,
}

/// Completed job record, retained capped for observability.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedJob {
    pub job: Job,
    pub completed_at: DateTime<Utc>,
}

/// Dead-lettered job record: attempts exhausted, surfaced to operators,
/// never re-enqueued.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadLetter {
    pub job: Job,
    pub reason: String,
    pub failed_at: DateTime<Utc>,
}

/// Point-in-time queue counters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStats {
    pub ready: usize,
    pub delayed: usize,
    pub in_flight: usize,
    pub completed: usize,
    pub dead_lettered: usize,
    pub closed: bool,
}

#[derive(Default)]
struct State {
    ready: BinaryHeap<ReadyEntry>,
    delayed: BinaryHeap<DelayedEntry>,
    /// Jobs currently ready or delayed, keyed by id.
    pending: HashMap<JobId, Job>,
    in_flight: HashMap<JobId, InFlightEntry>,
    completed: VecDeque<CompletedJob>,
    dead: VecDeque<DeadLetter>,
    seq: u64,
    closed: bool,
}

impl State {
    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    /// Moves due delayed jobs into the ready heap.
    fn promote_due(&mut self, now: Instant) {
        while let Some(entry) = self.delayed.peek() {
            if entry.run_at > now {
                break;
            }
            let entry = self.delayed.pop().expect("peeked entry");
            if let Some(job) = self.pending.get(&entry.job_id) {
                self.ready.push(ReadyEntry {
                    priority: job.priority,
                    seq: entry.seq,
                    job_id: entry.job_id,
                });
            }
        }
    }

    fn next_delayed_at(&self) -> Option<Instant> {
        self.delayed.peek().map(|e| e.run_at)
    }

    fn update_gauges(&self) {
        metrics()
            .queue_depth
            .set((self.ready.len() + self.delayed.len()) as u64);
        metrics().jobs_in_flight.set(self.in_flight.len() as u64);
    }
}

/// Ordered, persisted work list holding enqueued events as jobs with retry
/// metadata. Constructed once at startup and passed into the publisher and
/// worker pool as an explicit handle.
pub struct DurableQueue {
    state: Mutex<State>,
    notify: Notify,
    config: QueueConfig,
}

impl DurableQueue {
    pub fn new(config: QueueConfig) -> Self {
        Self {
            state: Mutex::new(State::default()),
            notify: Notify::new(),
            config,
        }
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Durably enqueues a payload. Fails with `EnqueueFailure` once the
    /// queue is closed.
    pub fn enqueue(
        &self,
        payload: serde_json::Value,
        priority: u8,
        options: JobOptions,
    ) -> Result<JobId> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(Error::enqueue("queue is closed"));
        }

        let job = Job::new(payload, priority, options);
        let job_id = job.id;
        let seq = state.next_seq();
        state.ready.push(ReadyEntry {
            priority,
            seq,
            job_id,
        });
        state.pending.insert(job_id, job);
        state.update_gauges();
        drop(state);

        self.notify.notify_one();
        Ok(job_id)
    }

    /// Waits for the next available job and leases it.
    ///
    /// Returns `None` once the queue is closed; in-flight leases are
    /// unaffected. The lease carries a stall deadline; a worker that holds
    /// it past the deadline loses the job to `reclaim_stalled`.
    pub async fn lease(&self) -> Option<Job> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);

            let next_wake = {
                let mut state = self.state.lock();
                if state.closed {
                    return None;
                }

                let now = Instant::now();
                state.promote_due(now);

                if let Some(entry) = state.ready.pop() {
                    if let Some(job) = state.pending.remove(&entry.job_id) {
                        let leased = job.clone();
                        state.in_flight.insert(
                            entry.job_id,
                            InFlightEntry {
                                job,
                                deadline: now + self.config.stall_timeout(),
                            },
                        );
                        state.update_gauges();
                        return Some(leased);
                    }
                    // Stale heap entry; try again immediately.
                    continue;
                }

                state.next_delayed_at()
            };

            match next_wake {
                Some(when) => {
                    tokio::select! {
                        _ = &mut notified => {}
                        _ = tokio::time::sleep_until(when) => {}
                    }
                }
                None => notified.await,
            }
        }
    }

    /// Marks a leased job completed. A job already reclaimed by stall
    /// detection is ignored: the reclaimed copy will re-run, which the
    /// idempotent processor tolerates.
    pub fn complete(&self, job_id: JobId) {
        let mut state = self.state.lock();
        let Some(entry) = state.in_flight.remove(&job_id) else {
            warn!(job_id = %job_id, "Completion for unknown or reclaimed job, ignoring");
            return;
        };

        let cap = entry.job.options.remove_on_complete;
        state.completed.push_back(CompletedJob {
            job: entry.job,
            completed_at: Utc::now(),
        });
        while state.completed.len() > cap {
            state.completed.pop_front();
        }
        state.update_gauges();
    }

    /// Re-enqueues a failed leased job after `delay`, preserving priority.
    pub fn retry(&self, job_id: JobId, delay: Duration, reason: &str) {
        let mut state = self.state.lock();
        let Some(mut entry) = state.in_flight.remove(&job_id) else {
            warn!(job_id = %job_id, "Retry for unknown or reclaimed job, ignoring");
            return;
        };

        entry.job.attempt_count += 1;
        entry.job.last_error = Some(reason.to_string());
        let seq = state.next_seq();
        state.delayed.push(DelayedEntry {
            run_at: Instant::now() + delay,
            seq,
            job_id,
        });
        state.pending.insert(job_id, entry.job);
        state.update_gauges();
        drop(state);

        self.notify.notify_one();
    }

    /// Moves a leased job to the dead-letter list. Terminal: the job is
    /// never re-enqueued, only inspected and eventually pruned.
    pub fn dead_letter(&self, job_id: JobId, reason: &str) {
        let mut state = self.state.lock();
        let Some(mut entry) = state.in_flight.remove(&job_id) else {
            warn!(job_id = %job_id, "Dead-letter for unknown or reclaimed job, ignoring");
            return;
        };

        entry.job.attempt_count += 1;
        entry.job.last_error = Some(reason.to_string());
        let cap = entry.job.options.remove_on_fail;
        state.dead.push_back(DeadLetter {
            job: entry.job,
            reason: reason.to_string(),
            failed_at: Utc::now(),
        });
        while state.dead.len() > cap {
            state.dead.pop_front();
        }
        state.update_gauges();
    }

    /// Reclaims in-flight jobs whose lease passed the stall deadline,
    /// re-enqueueing them as though they failed. Returns how many were
    /// reclaimed.
    pub fn reclaim_stalled(&self) -> usize {
        let mut state = self.state.lock();
        let now = Instant::now();
        let stalled: Vec<JobId> = state
            .in_flight
            .iter()
            .filter(|(_, e)| e.deadline <= now)
            .map(|(id, _)| *id)
            .collect();

        let mut reclaimed = 0;
        for job_id in stalled {
            let Some(mut entry) = state.in_flight.remove(&job_id) else {
                continue;
            };
            entry.job.attempt_count += 1;
            let reason = Error::Stalled("lease expired".into()).to_string();
            entry.job.last_error = Some(reason.clone());

            if entry.job.retries_remaining() {
                let delay = entry.job.retry_delay();
                warn!(
                    job_id = %job_id,
                    attempt = entry.job.attempt_count,
                    delay_ms = delay.as_millis() as u64,
                    "Job stalled, re-enqueueing"
                );
                let seq = state.next_seq();
                state.delayed.push(DelayedEntry {
                    run_at: now + delay,
                    seq,
                    job_id,
                });
                state.pending.insert(job_id, entry.job);
            } else {
                warn!(job_id = %job_id, "Job stalled with attempts exhausted, dead-lettering");
                let cap = entry.job.options.remove_on_fail;
                state.dead.push_back(DeadLetter {
                    job: entry.job,
                    reason,
                    failed_at: Utc::now(),
                });
                while state.dead.len() > cap {
                    state.dead.pop_front();
                }
                metrics().jobs_dead_lettered.inc();
            }

            metrics().jobs_reclaimed.inc();
            reclaimed += 1;
        }

        if reclaimed > 0 {
            state.update_gauges();
            drop(state);
            self.notify.notify_one();
        }
        reclaimed
    }

    /// Spawns the periodic stall-reclaim task. The task exits once the
    /// queue is closed.
    pub fn start_reclaim_task(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let queue = self.clone();
        let interval = self.config.reclaim_interval();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if queue.is_closed() {
                    debug!("Queue closed, stopping reclaim task");
                    break;
                }
                let reclaimed = queue.reclaim_stalled();
                if reclaimed > 0 {
                    info!(reclaimed, "Reclaimed stalled jobs");
                }
            }
        })
    }

    /// Stops accepting enqueues and wakes all lease waiters with `None`.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        drop(state);
        self.notify.notify_waiters();
        info!("Queue closed");
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn stats(&self) -> QueueStats {
        let state = self.state.lock();
        QueueStats {
            ready: state.ready.len(),
            delayed: state.delayed.len(),
            in_flight: state.in_flight.len(),
            completed: state.completed.len(),
            dead_lettered: state.dead.len(),
            closed: state.closed,
        }
    }

    /// Dead-letter records, oldest first.
    pub fn dead_letters(&self) -> Vec<DeadLetter> {
        self.state.lock().dead.iter().cloned().collect()
    }

    /// Completed records, oldest first.
    pub fn completed_jobs(&self) -> Vec<CompletedJob> {
        self.state.lock().completed.iter().cloned().collect()
    }
}
