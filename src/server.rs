//! HTTP server initialization and runtime setup.
//!
//! Handles storage and cache setup, the usage worker, and the Axum server lifecycle.

use crate::config::{Config, StorageBackend};
use crate::domain::usage_worker::{TierMetricsCollector, UsageWorkerConfig, run_usage_worker};
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::memory::MemoryStore;
use crate::infrastructure::narrative::{LlmNarrator, NarrativeGenerator};
use crate::infrastructure::storage::ReportStorage;
use crate::routes::app_router;
use crate::state::{AppState, Repositories, StateOptions};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// How long shutdown waits for the usage worker to flush.
const WORKER_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Opens the configured repository backend.
///
/// For PostgreSQL this connects the pool and applies embedded migrations.
async fn repositories(config: &Config) -> Result<Repositories> {
    match config.storage_backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok(Repositories::memory(Arc::new(MemoryStore::new())))
        }
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("Database URL is required for the postgres backend")?;

            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
                .idle_timeout(Duration::from_secs(config.db_idle_timeout))
                .max_lifetime(Duration::from_secs(config.db_max_lifetime))
                .connect(database_url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run migrations")?;

            Ok(Repositories::postgres(Arc::new(pool)))
        }
    }
}

async fn cache(config: &Config) -> Arc<dyn CacheService> {
    let Some(redis_url) = &config.redis_url else {
        tracing::info!("Cache disabled (NullCache)");
        return Arc::new(NullCache::new());
    };

    match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
        Ok(redis) => {
            tracing::info!("Cache enabled (Redis)");
            Arc::new(redis)
        }
        Err(e) => {
            tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
            Arc::new(NullCache::new())
        }
    }
}

fn narrator(config: &Config) -> Option<Arc<dyn NarrativeGenerator>> {
    let settings = config.llm.clone()?;
    match LlmNarrator::new(settings) {
        Ok(narrator) => {
            tracing::info!("AI narratives enabled");
            Some(Arc::new(narrator))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to build LLM client; using template narratives");
            None
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Repository backend (PostgreSQL with migrations, or in-memory)
/// - Redis cache (or NullCache fallback)
/// - Background usage worker
/// - Optional LLM narrative client
/// - Axum HTTP server
///
/// On Ctrl-C the server stops accepting requests and the usage worker
/// flushes what it has buffered.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Rate limit settings are invalid
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let repositories = repositories(&config).await?;
    let cache = cache(&config).await;

    let (collector, usage_rx) = TierMetricsCollector::channel(config.metrics_queue_capacity);
    let worker = tokio::spawn(run_usage_worker(
        usage_rx,
        repositories.usage.clone(),
        UsageWorkerConfig {
            batch_size: config.metrics_batch_size,
            flush_interval: config.usage_flush_interval(),
        },
    ));
    tracing::info!("Usage worker started");

    let state = AppState::new(
        repositories,
        StateOptions {
            cache,
            collector,
            storage: ReportStorage::new(&config.reports_dir),
            llm: narrator(&config),
            token_signing_secret: config.token_signing_secret.clone(),
            cache_ttl_seconds: config.cache_ttl_seconds,
        },
    );

    let app = app_router(state, &config.rate_limit, config.behind_proxy)?;

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // Every collector handle lived in the router, so the worker now drains and exits.
    if tokio::time::timeout(WORKER_DRAIN_TIMEOUT, worker).await.is_err() {
        tracing::warn!("Usage worker did not finish flushing before shutdown");
    }

    Ok(())
}
