//! Cache media for user snapshots.
//!
//! Provides a [`Cache`] trait with two implementations:
//! - [`MemoryCache`] - In-process map, used when Redis is not configured
//! - [`RedisCache`] - Redis-backed cache shared across restarts

mod memory_cache;
mod redis_cache;
mod service;

pub use memory_cache::MemoryCache;
pub use redis_cache::RedisCache;
pub use service::{Cache, CacheError, CacheResult};
