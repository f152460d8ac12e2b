//! API Gateway Library
//!
//! HTTP front of the organization hierarchy service: a single dispatch
//! endpoint that rate-limits, resolves the session, checks the permission
//! matrix and runs the requested `resource.verb` action.

pub mod config;
pub mod dispatch;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use domain::Role;
use org_service_lib::{open_store, OrgServices};

use crate::config::GatewayConfig;
use crate::dispatch::Dispatcher;
use crate::middleware::{
    Cache, MemoryRateLimiter, MemorySessionStore, RedisRateLimiter, RedisSessionStore,
    SessionStore, SessionUser,
};
use crate::routes::create_router;
use crate::state::AppState;

/// Open the store and Redis (unless in memory) and wire the dispatcher.
pub async fn build_state(config: &GatewayConfig) -> Result<AppState, Box<dyn Error>> {
    let opened = open_store(&config.org).await?;
    let services = OrgServices::new(opened.store);

    if config.is_in_memory() {
        let dispatcher = Dispatcher::new(
            services,
            Arc::new(MemorySessionStore::new(config.session.timeout_seconds)),
            Arc::new(MemoryRateLimiter::new(&config.rate_limit)),
        );
        return Ok(AppState::new(dispatcher, opened.database, None));
    }

    let cache = Arc::new(Cache::connect(&config.cache.url).await?);
    let dispatcher = Dispatcher::new(
        services,
        Arc::new(RedisSessionStore::new(
            cache.clone(),
            config.session.timeout_seconds,
        )),
        Arc::new(RedisRateLimiter::new(cache.clone(), config.rate_limit.clone())),
    )
    .with_summary_cache(cache.clone(), config.cache.summary_ttl_seconds);

    Ok(AppState::new(dispatcher, opened.database, Some(cache)))
}

/// Run the HTTP server with the given configuration.
pub async fn run_server(config: GatewayConfig) -> Result<(), Box<dyn Error>> {
    let state = build_state(&config).await?;

    if config.is_in_memory() {
        // Nothing else can mint tokens for a process-local session store
        let admin = SessionUser {
            user_id: "admin".to_string(),
            name: "Administrator".to_string(),
            role: Role::Admin,
        };
        let token = state.dispatcher.sessions().issue(admin).await?;
        info!(token = %token, "Issued bootstrap admin session");
    }

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.service.host, config.service.port).parse()?;
    info!(service = %config.service.service_name, "Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Mint a session token in Redis for `user`.
pub async fn issue_session(
    config: &GatewayConfig,
    user: SessionUser,
) -> Result<String, Box<dyn Error>> {
    Ok(redis_sessions(config).await?.issue(user).await?)
}

/// Drop a session token from Redis.
pub async fn revoke_session(config: &GatewayConfig, token: &str) -> Result<(), Box<dyn Error>> {
    redis_sessions(config).await?.revoke(token).await?;
    info!("Session revoked");
    Ok(())
}

async fn redis_sessions(config: &GatewayConfig) -> Result<RedisSessionStore, Box<dyn Error>> {
    let cache = Arc::new(Cache::connect(&config.cache.url).await?);
    Ok(RedisSessionStore::new(cache, config.session.timeout_seconds))
}
