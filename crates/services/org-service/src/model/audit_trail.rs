//! Audit trail persistence.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use common::{AppError, AppResult};
use domain::{AuditEntry, AuditQuery};

use crate::repository::{RecordStore, Table};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Where audit entries go.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AuditTrail: Send + Sync {
    async fn record(&self, entry: AuditEntry) -> AppResult<()>;

    /// Matching entries, newest first
    async fn list(&self, query: AuditQuery) -> AppResult<Vec<AuditEntry>>;
}

/// Audit trail kept in the `audit_logs` table.
pub struct StoreAuditTrail {
    store: Arc<dyn RecordStore>,
}

impl StoreAuditTrail {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AuditTrail for StoreAuditTrail {
    async fn record(&self, entry: AuditEntry) -> AppResult<()> {
        let Value::Object(row) = serde_json::to_value(&entry)? else {
            return Err(AppError::internal("audit entry did not encode as a row"));
        };
        if self.store.insert(Table::AuditLogs, row).await? {
            Ok(())
        } else {
            Err(AppError::store("audit log insert was rejected"))
        }
    }

    async fn list(&self, query: AuditQuery) -> AppResult<Vec<AuditEntry>> {
        let mut entries = Vec::new();
        for row in self.store.get_all(Table::AuditLogs).await? {
            match serde_json::from_value::<AuditEntry>(Value::Object(row)) {
                Ok(entry) if query.matches(&entry) => entries.push(entry),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Skipping malformed audit row"),
            }
        }

        // Rows are appended, so reversing gives newest first even on equal timestamps
        entries.reverse();
        if let Some(limit) = query.limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }
}
