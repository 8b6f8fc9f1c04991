//! Cache medium trait and error types.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// Errors that can occur during cache operations.
///
/// Callers treat both variants as soft failures and fall back to the backing store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The cache medium could not be reached.
    Unavailable(String),
    /// A cached value could not be encoded or decoded.
    Serialization(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Unavailable(e) => write!(f, "Cache backend unavailable: {}", e),
            Self::Serialization(e) => write!(f, "Cache serialization error: {}", e),
        }
    }
}

impl std::error::Error for CacheError {}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Key/value cache medium with per-entry TTL.
///
/// Values are opaque strings (JSON in practice), so every read hands the caller
/// its own copy. Implementations must be thread-safe.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::MemoryCache`] - In-process map with lazy expiry
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache
#[async_trait]
pub trait Cache: Send + Sync {
    /// Reads a value.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))` on hit (entry present and unexpired)
    /// - `Ok(None)` on miss
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Unavailable`] when the medium cannot be reached.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores a value that stays valid for `ttl`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Unavailable`] when the medium cannot be reached.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// Removes a value. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Checks if the cache medium is healthy.
    ///
    /// Used by the health endpoint to report cache status.
    async fn health_check(&self) -> bool;
}
