//! Gateway configuration.

use std::env;
use std::str::FromStr;

use common::{CacheConfig, RateLimitConfig, ServiceConfig, SessionConfig};
use org_service_lib::config::{OrgServiceConfig, StoreBackend};

/// Gateway configuration.
#[derive(Debug, Clone, Default)]
pub struct GatewayConfig {
    pub service: ServiceConfig,
    /// Redis for sessions, rate limiting and the summary cache
    pub cache: CacheConfig,
    pub session: SessionConfig,
    pub rate_limit: RateLimitConfig,
    /// Record store backend and database
    pub org: OrgServiceConfig,
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            service: ServiceConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.service.host),
                port: parsed("SERVER_PORT", defaults.service.port),
                ..defaults.service
            },
            cache: CacheConfig {
                url: env::var("REDIS_URL").unwrap_or(defaults.cache.url),
                summary_ttl_seconds: parsed(
                    "SUMMARY_CACHE_TTL_SECONDS",
                    defaults.cache.summary_ttl_seconds,
                ),
                ..defaults.cache
            },
            session: SessionConfig {
                timeout_seconds: parsed(
                    "SESSION_TIMEOUT_SECONDS",
                    defaults.session.timeout_seconds,
                ),
            },
            rate_limit: RateLimitConfig {
                max_requests: parsed("RATE_LIMIT_REQUESTS", defaults.rate_limit.max_requests),
                window_seconds: parsed(
                    "RATE_LIMIT_WINDOW_SECONDS",
                    defaults.rate_limit.window_seconds,
                ),
            },
            org: OrgServiceConfig::from_env(),
        }
    }

    /// Everything in process: memory store, sessions and counters, no Redis.
    pub fn in_memory(mut self) -> Self {
        self.org.store_backend = StoreBackend::Memory;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.org.store_backend == StoreBackend::Memory
    }
}

fn parsed<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.service.port, 3000);
        assert_eq!(config.rate_limit.max_requests, 100);
        assert_eq!(config.cache.summary_ttl_seconds, 300);
        assert!(!config.is_in_memory());
        assert!(config.in_memory().is_in_memory());
    }
}
