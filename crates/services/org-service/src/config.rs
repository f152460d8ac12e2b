//! Org service configuration.

use std::env;
use std::str::FromStr;

use common::DatabaseConfig;

/// Which record store backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "sql" => Ok(StoreBackend::Postgres),
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend: {}", other)),
        }
    }
}

/// Org service configuration.
#[derive(Debug, Clone, Default)]
pub struct OrgServiceConfig {
    pub database: DatabaseConfig,
    pub store_backend: StoreBackend,
}

impl OrgServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = DatabaseConfig::default();
        Self {
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(defaults.url),
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.max_connections),
                min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.min_connections),
            },
            store_backend: env::var("STORE_BACKEND")
                .ok()
                .and_then(|v| match v.parse() {
                    Ok(backend) => Some(backend),
                    Err(e) => {
                        tracing::warn!("{}, falling back to postgres", e);
                        None
                    }
                })
                .unwrap_or_default(),
        }
    }
}
