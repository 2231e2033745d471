//! Short-TTL cache for computed rating aggregates.
//!
//! Never authoritative: entries may be stale or absent and are always
//! re-derivable from the latest `RatingSnapshot`. Every recompute
//! unconditionally overwrites the entry, so no invalidation protocol
//! beyond TTL expiry exists.

use async_trait::async_trait;
use moka::future::Cache;
use pipeline_core::limits::{RATING_CACHE_CAPACITY, RATING_CACHE_TTL_SECS};
use pipeline_core::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cached aggregate value for a product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedRating {
    pub average_rating: f64,
}

/// Cache key for a product's rating entry.
pub fn rating_key(product_id: &str) -> String {
    format!("rating:{product_id}")
}

/// Cache interface consumed by the aggregator and the read path. External
/// cache engines implement the same trait; operations are fallible for
/// their benefit even though the in-process backend cannot fail.
#[async_trait]
pub trait RatingCache: Send + Sync {
    /// Writes (or overwrites) the entry with a fresh TTL.
    async fn set(&self, product_id: &str, average_rating: f64) -> Result<()>;

    /// Reads the entry; `None` on miss or expiry.
    async fn get(&self, product_id: &str) -> Result<Option<CachedRating>>;
}

/// Cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_capacity")]
    pub max_capacity: u64,
}

fn default_ttl_secs() -> u64 {
    RATING_CACHE_TTL_SECS
}

fn default_capacity() -> u64 {
    RATING_CACHE_CAPACITY
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            max_capacity: default_capacity(),
        }
    }
}

/// Moka-backed in-process rating cache.
pub struct MokaRatingCache {
    inner: Cache<String, CachedRating>,
}

impl MokaRatingCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(config.max_capacity)
                .time_to_live(Duration::from_secs(config.ttl_secs))
                .build(),
        }
    }
}

impl Default for MokaRatingCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

#[async_trait]
impl RatingCache for MokaRatingCache {
    async fn set(&self, product_id: &str, average_rating: f64) -> Result<()> {
        self.inner
            .insert(rating_key(product_id), CachedRating { average_rating })
            .await;
        Ok(())
    }

    async fn get(&self, product_id: &str) -> Result<Option<CachedRating>> {
        Ok(self.inner.get(&rating_key(product_id)).await)
    }
}
