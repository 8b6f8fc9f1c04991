//! In-process cache medium used when Redis is not configured.

use super::service::{Cache, CacheError, CacheResult};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Longest lifetime an entry can be given; larger TTLs are clamped.
pub const MAX_ENTRY_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// Concurrent in-memory cache with per-entry expiry.
///
/// Expired entries are never returned; they are dropped lazily on read and in bulk by
/// [`MemoryCache::purge_expired`]. The map is sharded, so reads on unrelated keys do
/// not contend.
#[derive(Clone, Default)]
pub struct MemoryCache {
    entries: Arc<DashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        debug!("Using in-process MemoryCache");
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before - self.entries.len()
    }

    /// Spawns a background task purging expired entries every `interval`.
    pub fn start_purge_task(&self, interval: Duration) {
        let cache = self.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);

            loop {
                ticker.tick().await;
                let removed = cache.purge_expired();
                if removed > 0 {
                    debug!(removed, "Purged expired cache entries");
                }
            }
        });
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let now = Instant::now();

        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at > now {
                debug!("Cache HIT: {}", key);
                return Ok(Some(entry.value.clone()));
            }
        } else {
            debug!("Cache MISS: {}", key);
            return Ok(None);
        }

        // Expired: remove unless a writer refreshed it in the meantime.
        self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        debug!("Cache EXPIRED: {}", key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let now = Instant::now();
        let ttl = ttl.min(MAX_ENTRY_TTL);
        let expires_at = now
            .checked_add(ttl)
            .ok_or_else(|| CacheError::Unavailable(format!("TTL {:?} out of range", ttl)))?;

        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at,
            },
        );
        debug!("Cache SET: {} (TTL: {}s)", key, ttl.as_secs());
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        if self.entries.remove(key).is_some() {
            debug!("Cache DELETE: {}", key);
        }
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
