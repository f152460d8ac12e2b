//! Sessions, rate limiting, and caching.

mod cache;
mod rate_limit;
mod session;

pub use cache::{Cache, CACHE_KEY_SUMMARY};
pub use rate_limit::{MemoryRateLimiter, RateLimiter, RedisRateLimiter, ANONYMOUS};
pub use session::{
    token_from_headers, MemorySessionStore, RedisSessionStore, SessionStore, SessionUser,
    SESSION_HEADER,
};

#[cfg(any(test, feature = "test-utils"))]
pub use rate_limit::MockRateLimiter;
#[cfg(any(test, feature = "test-utils"))]
pub use session::MockSessionStore;
