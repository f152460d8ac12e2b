//! Application state for dependency injection.

use std::sync::Arc;

use org_service_lib::infra::Database;

use crate::dispatch::Dispatcher;
use crate::middleware::Cache;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    /// Present when the store is SQL-backed
    pub database: Option<Database>,
    /// Present unless running fully in memory
    pub cache: Option<Arc<Cache>>,
}

impl AppState {
    /// Create new app state.
    pub fn new(dispatcher: Dispatcher, database: Option<Database>, cache: Option<Arc<Cache>>) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            database,
            cache,
        }
    }
}
