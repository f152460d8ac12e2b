//! Org Service Library
//!
//! Organization hierarchy (Directorate → WorkUnit → Affair → Position) and
//! position assignments over an injected record store, with cascade and
//! reassign deletes, code generation and an advisory audit trail.

pub mod config;
pub mod infra;
pub mod model;
pub mod repository;
pub mod service;

use std::sync::Arc;

use sea_orm::DbErr;
use tracing::info;

use crate::config::{OrgServiceConfig, StoreBackend};
use crate::infra::Database;
use crate::repository::{MemoryStore, RecordStore, SqlStore};

pub use crate::service::OrgServices;

/// An opened record store, with its database when SQL-backed.
pub struct OpenedStore {
    pub store: Arc<dyn RecordStore>,
    pub database: Option<Database>,
}

/// Open the configured store, applying migrations for the SQL backend.
pub async fn open_store(config: &OrgServiceConfig) -> Result<OpenedStore, DbErr> {
    match config.store_backend {
        StoreBackend::Memory => {
            info!("Using in-memory record store");
            Ok(OpenedStore {
                store: Arc::new(MemoryStore::new()),
                database: None,
            })
        }
        StoreBackend::Postgres => {
            let db = Database::connect(&config.database).await?;
            Ok(OpenedStore {
                store: Arc::new(SqlStore::new(db.get_connection())),
                database: Some(db),
            })
        }
    }
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = OrgServiceConfig::from_env();
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            for (name, applied) in db.migration_status().await? {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}
