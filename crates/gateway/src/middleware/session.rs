//! Session tokens.
//!
//! A session token is opaque: it maps to the user it was issued for until it
//! expires. Tokens are minted out of band (`gateway session issue`) since the
//! gateway does no password authentication.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use common::AppResult;
use domain::Role;

use super::cache::{Cache, CACHE_PREFIX_SESSION};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Header carrying the token when `Authorization` is not used
pub const SESSION_HEADER: &str = "X-Session-Token";

/// The user behind a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub user_id: String,
    pub name: String,
    pub role: Role,
}

/// Session store trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Mint a new token for `user`
    async fn issue(&self, user: SessionUser) -> AppResult<String>;

    /// The session's user, `None` when unknown or expired
    async fn resolve(&self, token: &str) -> AppResult<Option<SessionUser>>;

    async fn revoke(&self, token: &str) -> AppResult<()>;
}

fn new_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Sessions kept in Redis under `session:<token>` with a TTL.
pub struct RedisSessionStore {
    cache: Arc<Cache>,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    pub fn new(cache: Arc<Cache>, ttl_seconds: u64) -> Self {
        Self { cache, ttl_seconds }
    }

    fn key(token: &str) -> String {
        format!("{}{}", CACHE_PREFIX_SESSION, token)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn issue(&self, user: SessionUser) -> AppResult<String> {
        let token = new_token();
        self.cache
            .set_with_ttl(&Self::key(&token), &user, self.ttl_seconds)
            .await?;
        Ok(token)
    }

    async fn resolve(&self, token: &str) -> AppResult<Option<SessionUser>> {
        self.cache.get(&Self::key(token)).await
    }

    async fn revoke(&self, token: &str) -> AppResult<()> {
        self.cache.delete(&Self::key(token)).await
    }
}

/// Process-local sessions, lost on restart.
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, (SessionUser, Instant)>>,
    ttl: Duration,
}

impl MemorySessionStore {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: Duration::from_secs(ttl_seconds),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn issue(&self, user: SessionUser) -> AppResult<String> {
        let token = new_token();
        let expires = Instant::now() + self.ttl;
        self.sessions
            .write()
            .await
            .insert(token.clone(), (user, expires));
        Ok(token)
    }

    async fn resolve(&self, token: &str) -> AppResult<Option<SessionUser>> {
        let mut sessions = self.sessions.write().await;
        match sessions.get(token) {
            Some((user, expires)) if *expires > Instant::now() => Ok(Some(user.clone())),
            Some(_) => {
                sessions.remove(token);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn revoke(&self, token: &str) -> AppResult<()> {
        self.sessions.write().await.remove(token);
        Ok(())
    }
}

/// Token from `Authorization: Bearer <token>` or `X-Session-Token`.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    bearer
        .or_else(|| headers.get(SESSION_HEADER).and_then(|h| h.to_str().ok()))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn user() -> SessionUser {
        SessionUser {
            user_id: "u-1".to_string(),
            name: "Ayu".to_string(),
            role: Role::Operator,
        }
    }

    #[tokio::test]
    async fn test_memory_session_issue_and_resolve() {
        let store = MemorySessionStore::new(60);
        let token = store.issue(user()).await.unwrap();

        assert_eq!(store.resolve(&token).await.unwrap(), Some(user()));
        assert_eq!(store.resolve("other").await.unwrap(), None);

        store.revoke(&token).await.unwrap();
        assert_eq!(store.resolve(&token).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_session_expires() {
        let store = MemorySessionStore::new(0);
        let token = store.issue(user()).await.unwrap();
        assert_eq!(store.resolve(&token).await.unwrap(), None);
    }

    #[test]
    fn test_token_from_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(token_from_headers(&headers), None);

        headers.insert(SESSION_HEADER, HeaderValue::from_static("abc"));
        assert_eq!(token_from_headers(&headers).as_deref(), Some("abc"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(token_from_headers(&headers).as_deref(), Some("xyz"));
    }
}
