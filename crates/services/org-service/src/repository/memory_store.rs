//! In-process record store for development mode and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use common::AppResult;

use super::record_store::{ensure_fields, key_matches, project, RecordStore, Row, Table};

/// Tables held in memory behind a single lock.
///
/// Each call takes the lock once, so individual calls are serialized; a
/// sequence of calls is not.
pub struct MemoryStore {
    tables: RwLock<HashMap<Table, Vec<Row>>>,
}

impl MemoryStore {
    /// Create an empty store with every table present.
    pub fn new() -> Self {
        let tables = Table::ALL.iter().map(|t| (*t, Vec::new())).collect();
        Self {
            tables: RwLock::new(tables),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get_all(&self, table: Table) -> AppResult<Vec<Row>> {
        let tables = self.tables.read().await;
        Ok(tables.get(&table).cloned().unwrap_or_default())
    }

    async fn insert(&self, table: Table, row: Row) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        tables.entry(table).or_default().push(project(table, row));
        Ok(true)
    }

    async fn update(
        &self,
        table: Table,
        key_field: &str,
        key_value: &str,
        patch: Row,
    ) -> AppResult<bool> {
        ensure_fields(table, std::iter::once(key_field).chain(patch.keys().map(String::as_str)))?;

        let mut tables = self.tables.write().await;
        let rows = tables.entry(table).or_default();
        match rows.iter_mut().find(|row| key_matches(row, key_field, key_value)) {
            Some(row) => {
                row.extend(patch);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, table: Table, key_field: &str, key_value: &str) -> AppResult<bool> {
        ensure_fields(table, [key_field])?;

        let mut tables = self.tables.write().await;
        let rows = tables.entry(table).or_default();
        match rows.iter().position(|row| key_matches(row, key_field, key_value)) {
            Some(index) => {
                rows.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
