//! Review pipeline service.
//!
//! Review mutations enter through the HTTP boundary, get published to the
//! durable queue, and a worker pool recomputes the product's rating
//! aggregate, persisting a snapshot and refreshing the short-TTL cache.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::info;

use api::{router, AppState};
use queue::{DurableQueue, QueueConfig};
use rating_cache::{CacheConfig, MokaRatingCache};
use review_store::MemoryReviewStore;
use telemetry::init_tracing_from_env;
use worker::{EventProcessor, RatingAggregator, WorkerPool, WorkerPoolConfig};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    #[serde(default)]
    queue: QueueConfig,

    #[serde(default)]
    worker: WorkerPoolConfig,

    #[serde(default)]
    cache: CacheConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            queue: QueueConfig::default(),
            worker: WorkerPoolConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing_from_env();

    info!("Starting review pipeline v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;
    info!(
        concurrency = config.worker.concurrency,
        cache_ttl_secs = config.cache.ttl_secs,
        stall_timeout_secs = config.queue.stall_timeout_secs,
        "Loaded configuration"
    );

    // Wire the pipeline: queue, store, cache, aggregator, worker pool.
    let queue = Arc::new(DurableQueue::new(config.queue.clone()));
    let store = Arc::new(MemoryReviewStore::new());
    let cache = Arc::new(MokaRatingCache::new(config.cache.clone()));

    let aggregator = RatingAggregator::new(store.clone(), cache.clone());
    let processor = Arc::new(EventProcessor::new(aggregator));

    let pool = Arc::new(WorkerPool::new(
        queue.clone(),
        processor,
        config.worker.clone(),
    ));
    let worker_handles = pool.start();
    let _reclaim_handle = queue.start_reclaim_task();

    let state = AppState::new(queue.clone(), store, cache);
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Stop accepting work, then let in-flight jobs drain.
    info!("Shutting down...");
    pool.shutdown(worker_handles).await;

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        .add_source(config::Config::try_from(&Config::default())?)
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("PIPELINE")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
