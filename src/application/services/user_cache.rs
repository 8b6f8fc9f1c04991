//! Cache-aside user lookup with per-key miss deduplication.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::entities::CachedUser;
use crate::domain::repositories::{RepositoryError, UserFilter, UserRepository};
use crate::infrastructure::cache::Cache;

/// Default lifetime of a cached user snapshot.
pub const DEFAULT_USER_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Default deadline for resolving one user.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(3);

/// Errors surfaced by [`UserCache::get_user`].
///
/// Cache medium failures never appear here; they degrade to a backing-store read.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UserCacheError {
    #[error("user not found")]
    NotFound,

    #[error("backing store error: {0}")]
    Backend(String),

    #[error("user lookup timed out after {0:?}")]
    Timeout(Duration),
}

impl From<RepositoryError> for UserCacheError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => UserCacheError::NotFound,
            RepositoryError::Duplicate => UserCacheError::Backend(e.to_string()),
            RepositoryError::Database(msg) => UserCacheError::Backend(msg),
        }
    }
}

/// Builds the cache key for a user. One key per user id.
pub fn cache_key(user_id: Uuid) -> String {
    format!("user-{}", user_id)
}

/// One resolution in progress for a key.
///
/// The mutex serializes misses on that key; the slot holds the value resolved by the
/// first caller so later waiters of the same episode skip the backing store even if
/// the cache medium is down.
#[derive(Default)]
struct Flight {
    slot: Mutex<Option<CachedUser>>,
}

/// Membership in a flight. Dropping the last member retires the flight, so the
/// next miss on the key starts a fresh episode.
struct FlightTicket<'a> {
    flights: &'a DashMap<String, Arc<Flight>>,
    key: &'a str,
    flight: Arc<Flight>,
}

impl<'a> FlightTicket<'a> {
    fn join(flights: &'a DashMap<String, Arc<Flight>>, key: &'a str) -> Self {
        let flight = flights.entry(key.to_string()).or_default().clone();
        Self {
            flights,
            key,
            flight,
        }
    }
}

impl Drop for FlightTicket<'_> {
    fn drop(&mut self) {
        // The map holds one reference and this ticket another; anything more is a
        // member still waiting. Clones are only taken under the shard lock, which
        // `remove_if` also holds, so the count cannot grow during the check.
        self.flights.remove_if(self.key, |_, flight| {
            Arc::ptr_eq(flight, &self.flight) && Arc::strong_count(flight) <= 2
        });
    }
}

/// Cache-aside lookup of users by id.
///
/// Hits are served from the cache medium without locking. Concurrent misses on the
/// same key are collapsed into a single backing-store call; misses on different keys
/// resolve independently. Snapshots are trusted for their TTL: a status change in the
/// backing store becomes visible after at most one TTL, or immediately after
/// [`UserCache::invalidate`].
pub struct UserCache {
    cache: Arc<dyn Cache>,
    repository: Arc<dyn UserRepository>,
    ttl: Duration,
    timeout: Duration,
    flights: DashMap<String, Arc<Flight>>,
}

impl UserCache {
    pub fn new(cache: Arc<dyn Cache>, repository: Arc<dyn UserRepository>) -> Self {
        Self {
            cache,
            repository,
            ttl: DEFAULT_USER_TTL,
            timeout: DEFAULT_LOOKUP_TIMEOUT,
            flights: DashMap::new(),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolves a user within the configured lookup deadline.
    ///
    /// # Errors
    ///
    /// - [`UserCacheError::NotFound`] if the backing store has no such user
    /// - [`UserCacheError::Backend`] if the backing store failed
    /// - [`UserCacheError::Timeout`] if the deadline passed
    pub async fn get_user(&self, user_id: Uuid) -> Result<CachedUser, UserCacheError> {
        self.get_user_within(user_id, self.timeout).await
    }

    /// Resolves a user within a caller-supplied deadline.
    ///
    /// On timeout the in-flight work is dropped, releasing the per-key lock for the
    /// next waiter.
    pub async fn get_user_within(
        &self,
        user_id: Uuid,
        deadline: Duration,
    ) -> Result<CachedUser, UserCacheError> {
        tokio::time::timeout(deadline, self.resolve(user_id))
            .await
            .map_err(|_| {
                warn!(%user_id, ?deadline, "User lookup timed out");
                UserCacheError::Timeout(deadline)
            })?
    }

    /// Drops the cached snapshot of a user so the next lookup reads the backing store.
    pub async fn invalidate(&self, user_id: Uuid) {
        let key = cache_key(user_id);
        if let Err(e) = self.cache.delete(&key).await {
            warn!("Failed to invalidate {}: {}", key, e);
        }
    }

    async fn resolve(&self, user_id: Uuid) -> Result<CachedUser, UserCacheError> {
        let key = cache_key(user_id);

        if let Some(user) = self.read_cache(&key, user_id).await {
            return Ok(user);
        }

        let ticket = FlightTicket::join(&self.flights, &key);
        let mut slot = ticket.flight.slot.lock().await;

        if let Some(user) = slot.as_ref() {
            debug!("Resolved {} by concurrent miss", key);
            return Ok(user.clone());
        }

        if let Some(user) = self.read_cache(&key, user_id).await {
            *slot = Some(user.clone());
            return Ok(user);
        }

        let user = CachedUser::from(
            self.repository
                .get_user(UserFilter::Id(user_id))
                .await
                .map_err(|e| {
                    debug!("Backing store lookup for {} failed: {}", key, e);
                    UserCacheError::from(e)
                })?,
        );

        self.write_cache(&key, &user).await;
        *slot = Some(user.clone());

        Ok(user)
    }

    /// Reads and decodes a snapshot. Any cache failure is reported as a miss.
    async fn read_cache(&self, key: &str, user_id: Uuid) -> Option<CachedUser> {
        let raw = match self.cache.get(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Cache read for {} failed, falling back to backing store: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str::<CachedUser>(&raw) {
            Ok(user) if user.id == user_id => Some(user),
            Ok(_) => {
                warn!("Cached entry {} holds another user, ignoring", key);
                None
            }
            Err(e) => {
                warn!("Cached entry {} is unreadable, ignoring: {}", key, e);
                None
            }
        }
    }

    async fn write_cache(&self, key: &str, user: &CachedUser) {
        let raw = match serde_json::to_string(user) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to encode {} for cache: {}", key, e);
                return;
            }
        };

        if let Err(e) = self.cache.set(key, &raw, self.ttl).await {
            warn!("Failed to set cache for {}: {}", key, e);
        }
    }
}
