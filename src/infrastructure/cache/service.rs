//! Cache service trait and error types.

use async_trait::async_trait;
use std::fmt;

/// Errors that can occur during cache operations.
#[derive(Debug)]
pub enum CacheError {
    ConnectionError(String),
    OperationError(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Cache connection error: {}", e),
            Self::OperationError(e) => write!(f, "Cache operation error: {}", e),
        }
    }
}

impl std::error::Error for CacheError {}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Trait for caching serialized aggregates (dashboard summaries).
///
/// Values are opaque strings, normally JSON. Implementations are fail-open:
/// a broken cache degrades to recomputing from the repositories.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Looks up a cached value.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))` on cache hit
    /// - `Ok(None)` on cache miss or backend error
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores a value, using the implementation's default TTL when `ttl_seconds`
    /// is `None`.
    ///
    /// # Errors
    ///
    /// Should not propagate errors to callers.
    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> CacheResult<()>;

    /// Atomically increments an integer counter, creating it at 1.
    ///
    /// Used to version aggregates: bumping the counter retires every entry
    /// stored under the previous version.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::OperationError`] if the backend rejects the command.
    async fn increment(&self, key: &str) -> CacheResult<u64>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;
}
