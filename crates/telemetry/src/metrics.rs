//! Internal metrics collection.
//!
//! Counters and gauges are kept in-memory; the operator surface exposes a
//! point-in-time snapshot over HTTP.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// A gauge metric (can go up or down).
#[derive(Debug, Default)]
pub struct Gauge(AtomicU64);

impl Gauge {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn set(&self, val: u64) {
        self.0.store(val, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dec(&self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Histogram for latency tracking.
#[derive(Debug)]
pub struct Histogram {
    /// Buckets: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 5s, 10s
    buckets: [AtomicU64; 11],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 11] = [1, 5, 10, 25, 50, 100, 250, 500, 1000, 5000, 10000];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        for (i, &bound) in Self::BUCKET_BOUNDS.iter().enumerate() {
            if ms <= bound {
                self.buckets[i].fetch_add(1, Ordering::Relaxed);
                return;
            }
        }
        // Value exceeds all buckets, add to last
        self.buckets[10].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum.load(Ordering::Relaxed) as f64 / count as f64
        }
    }
}

/// Collected metrics for the review pipeline.
#[derive(Debug, Default)]
pub struct Metrics {
    // Publisher metrics
    pub events_published: Counter,
    pub publish_errors: Counter,

    // Worker pool metrics
    pub jobs_processed: Counter,
    pub jobs_completed: Counter,
    pub jobs_retried: Counter,
    pub jobs_dead_lettered: Counter,
    pub jobs_reclaimed: Counter,

    // Aggregator metrics
    pub snapshots_written: Counter,
    pub cache_writes: Counter,
    pub cache_write_errors: Counter,
    pub cache_hits: Counter,
    pub cache_misses: Counter,

    // Latency histograms
    pub job_latency_ms: Histogram,
    pub recompute_latency_ms: Histogram,

    // Gauges
    pub queue_depth: Gauge,
    pub jobs_in_flight: Gauge,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            events_published: self.events_published.get(),
            publish_errors: self.publish_errors.get(),
            jobs_processed: self.jobs_processed.get(),
            jobs_completed: self.jobs_completed.get(),
            jobs_retried: self.jobs_retried.get(),
            jobs_dead_lettered: self.jobs_dead_lettered.get(),
            jobs_reclaimed: self.jobs_reclaimed.get(),
            snapshots_written: self.snapshots_written.get(),
            cache_writes: self.cache_writes.get(),
            cache_write_errors: self.cache_write_errors.get(),
            cache_hits: self.cache_hits.get(),
            cache_misses: self.cache_misses.get(),
            job_latency_mean_ms: self.job_latency_ms.mean(),
            recompute_latency_mean_ms: self.recompute_latency_ms.mean(),
            queue_depth: self.queue_depth.get(),
            jobs_in_flight: self.jobs_in_flight.get(),
        }
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub events_published: u64,
    pub publish_errors: u64,
    pub jobs_processed: u64,
    pub jobs_completed: u64,
    pub jobs_retried: u64,
    pub jobs_dead_lettered: u64,
    pub jobs_reclaimed: u64,
    pub snapshots_written: u64,
    pub cache_writes: u64,
    pub cache_write_errors: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub job_latency_mean_ms: f64,
    pub recompute_latency_mean_ms: f64,
    pub queue_depth: u64,
    pub jobs_in_flight: u64,
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
