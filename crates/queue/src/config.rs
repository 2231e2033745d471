//! Queue configuration.

use pipeline_core::limits::{STALL_RECLAIM_INTERVAL_SECS, STALL_TIMEOUT_SECS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Queue configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// An in-flight job whose lease exceeds this is reclaimed and retried.
    #[serde(default = "default_stall_timeout_secs")]
    pub stall_timeout_secs: u64,
    /// How often the reclaim task scans for stalled leases.
    #[serde(default = "default_reclaim_interval_secs")]
    pub reclaim_interval_secs: u64,
}

fn default_stall_timeout_secs() -> u64 {
    STALL_TIMEOUT_SECS
}

fn default_reclaim_interval_secs() -> u64 {
    STALL_RECLAIM_INTERVAL_SECS
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            stall_timeout_secs: default_stall_timeout_secs(),
            reclaim_interval_secs: default_reclaim_interval_secs(),
        }
    }
}

impl QueueConfig {
    pub fn stall_timeout(&self) -> Duration {
        Duration::from_secs(self.stall_timeout_secs)
    }

    pub fn reclaim_interval(&self) -> Duration {
        Duration::from_secs(self.reclaim_interval_secs)
    }
}
