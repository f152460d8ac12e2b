//! Fixed-window rate limiting keyed by session token.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use common::{AppResult, RateLimitConfig};

use super::cache::Cache;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Key used for requests without a session token
pub const ANONYMOUS: &str = "anonymous";

/// Rate limiter trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Count one request for `key`; false once the window is used up.
    async fn allow(&self, key: &str) -> AppResult<bool>;
}

/// Counters in Redis, `INCR` plus `EXPIRE` on the first hit.
pub struct RedisRateLimiter {
    cache: Arc<Cache>,
    config: RateLimitConfig,
}

impl RedisRateLimiter {
    pub fn new(cache: Arc<Cache>, config: RateLimitConfig) -> Self {
        Self { cache, config }
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn allow(&self, key: &str) -> AppResult<bool> {
        let (_, allowed) = self
            .cache
            .check_rate_limit(key, self.config.max_requests, self.config.window_seconds)
            .await?;
        Ok(allowed)
    }
}

/// Process-local counters.
pub struct MemoryRateLimiter {
    windows: Mutex<HashMap<String, (Instant, u64)>>,
    max_requests: u64,
    window: Duration,
}

impl MemoryRateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            max_requests: config.max_requests,
            window: Duration::from_secs(config.window_seconds),
        }
    }
}

#[async_trait]
impl RateLimiter for MemoryRateLimiter {
    async fn allow(&self, key: &str) -> AppResult<bool> {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        windows.retain(|_, (started, _)| now.duration_since(*started) < self.window);

        let (_, count) = windows.entry(key.to_string()).or_insert((now, 0));
        *count += 1;

        Ok(*count <= self.max_requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u64, window_seconds: u64) -> MemoryRateLimiter {
        MemoryRateLimiter::new(&RateLimitConfig {
            max_requests,
            window_seconds,
        })
    }

    #[tokio::test]
    async fn test_limit_per_key() {
        let limiter = limiter(2, 60);
        assert!(limiter.allow("a").await.unwrap());
        assert!(limiter.allow("a").await.unwrap());
        assert!(!limiter.allow("a").await.unwrap());
        assert!(limiter.allow("b").await.unwrap());
    }

    #[tokio::test]
    async fn test_window_resets() {
        let limiter = limiter(1, 0);
        assert!(limiter.allow(ANONYMOUS).await.unwrap());
        assert!(limiter.allow(ANONYMOUS).await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_windows_are_dropped() {
        let limiter = limiter(5, 0);
        for key in ["a", "b", "c"] {
            assert!(limiter.allow(key).await.unwrap());
        }
        assert_eq!(limiter.windows.lock().await.len(), 1);
    }
}
