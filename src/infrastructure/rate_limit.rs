//! Fixed-window request counter keyed by client address.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Per-client counting window.
#[derive(Debug, Clone)]
struct RateWindow {
    window_start: Instant,
    count: u32,
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    /// Time until the client's current window resets.
    pub retry_after: Duration,
}

/// Fixed-window rate limiter.
///
/// Each client key gets a window that starts at its first request (not calendar
/// aligned). A window whose age reaches `period` is reset in place on the next call.
/// The check-reset-increment sequence runs under the map's shard lock, so concurrent
/// calls for the same key never double-count or double-reset.
///
/// State is process-local; several instances behind a balancer each count separately.
#[derive(Clone)]
pub struct FixedWindowLimiter {
    windows: Arc<DashMap<String, RateWindow>>,
    limit: u32,
    period: Duration,
}

impl FixedWindowLimiter {
    pub fn new(limit: u32, period: Duration) -> Self {
        Self {
            windows: Arc::new(DashMap::new()),
            limit,
            period,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Counts one request for `client_key` and reports whether it is within the limit.
    pub fn allow(&self, client_key: &str) -> bool {
        self.check(client_key).allowed
    }

    /// Like [`FixedWindowLimiter::allow`] but also reports when the window resets.
    pub fn check(&self, client_key: &str) -> RateDecision {
        let now = Instant::now();

        let mut window = self
            .windows
            .entry(client_key.to_string())
            .or_insert_with(|| RateWindow {
                window_start: now,
                count: 0,
            });

        if now.duration_since(window.window_start) >= self.period {
            window.window_start = now;
            window.count = 0;
        }

        window.count = window.count.saturating_add(1);

        let allowed = window.count <= self.limit;
        let retry_after = self
            .period
            .saturating_sub(now.duration_since(window.window_start));

        if !allowed {
            debug!(client = client_key, count = window.count, "Rate limit reached");
        }

        RateDecision {
            allowed,
            retry_after,
        }
    }

    /// Drops windows that have already run out; they would be reset on next use anyway.
    pub fn purge_stale(&self) -> usize {
        let now = Instant::now();
        let before = self.windows.len();
        self.windows
            .retain(|_, window| now.duration_since(window.window_start) < self.period);
        before - self.windows.len()
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    /// Spawns a background task calling [`FixedWindowLimiter::purge_stale`] every `interval`.
    pub fn start_cleanup_task(&self, interval: Duration) {
        let limiter = self.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);

            loop {
                ticker.tick().await;
                let removed = limiter.purge_stale();
                if removed > 0 {
                    debug!(removed, "Purged stale rate-limit windows");
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_limit_within_window() {
        let limiter = FixedWindowLimiter::new(3, Duration::from_secs(5));

        assert!(limiter.allow("10.0.0.1"));
        assert!(limiter.allow("10.0.0.1"));
        assert!(limiter.allow("10.0.0.1"));
        assert!(!limiter.allow("10.0.0.1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets_after_period() {
        let limiter = FixedWindowLimiter::new(3, Duration::from_secs(5));

        for _ in 0..4 {
            limiter.allow("10.0.0.1");
        }
        assert!(!limiter.allow("10.0.0.1"));

        tokio::time::advance(Duration::from_secs(5)).await;

        assert!(limiter.allow("10.0.0.1"));
        assert!(limiter.allow("10.0.0.1"));
        assert!(limiter.allow("10.0.0.1"));
        assert!(!limiter.allow("10.0.0.1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_not_reset_before_period() {
        let limiter = FixedWindowLimiter::new(1, Duration::from_secs(5));

        assert!(limiter.allow("k"));
        tokio::time::advance(Duration::from_millis(4_999)).await;
        assert!(!limiter.allow("k"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_aligned_to_first_request() {
        let limiter = FixedWindowLimiter::new(1, Duration::from_secs(5));

        tokio::time::advance(Duration::from_secs(3)).await;
        assert!(limiter.allow("k"));

        // 5s after process start but only 2s into this client's window.
        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(!limiter.allow("k"));

        tokio::time::advance(Duration::from_secs(3)).await;
        assert!(limiter.allow("k"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clients_are_independent() {
        let limiter = FixedWindowLimiter::new(1, Duration::from_secs(5));

        assert!(limiter.allow("a"));
        assert!(!limiter.allow("a"));
        assert!(limiter.allow("b"));
        assert_eq!(limiter.tracked_clients(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_counts_down() {
        let limiter = FixedWindowLimiter::new(1, Duration::from_secs(5));

        limiter.check("k");
        tokio::time::advance(Duration::from_secs(2)).await;
        let decision = limiter.check("k");

        assert!(!decision.allowed);
        assert_eq!(decision.retry_after, Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_stale() {
        let limiter = FixedWindowLimiter::new(3, Duration::from_secs(5));

        limiter.allow("old");
        tokio::time::advance(Duration::from_secs(6)).await;
        limiter.allow("fresh");

        assert_eq!(limiter.purge_stale(), 1);
        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_calls_count_exactly() {
        let limiter = FixedWindowLimiter::new(50, Duration::from_secs(3600));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let limiter = limiter.clone();
            handles.push(tokio::spawn(async move {
                (0..25).filter(|_| limiter.allow("shared")).count()
            }));
        }

        let mut allowed = 0;
        for handle in handles {
            allowed += handle.await.unwrap();
        }

        assert_eq!(allowed, 50);
    }
}
