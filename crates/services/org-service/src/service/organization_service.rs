//! Organization-wide reporting and the audit log.

use std::sync::Arc;

use async_trait::async_trait;

use common::AppResult;
use domain::{AuditEntry, AuditQuery};

use crate::model::{AuditTrail, OrgSummary, OrganizationModel, OrgTables, Orphan};

/// Organization service trait for dependency injection.
#[async_trait]
pub trait OrganizationService: Send + Sync {
    async fn summary(&self) -> AppResult<OrgSummary>;

    /// Rows whose references point at missing rows
    async fn orphans(&self) -> AppResult<Vec<Orphan>>;

    /// Audit entries, newest first
    async fn audit_log(&self, query: AuditQuery) -> AppResult<Vec<AuditEntry>>;
}

/// Concrete implementation of OrganizationService.
pub struct OrganizationManager {
    model: OrganizationModel,
    audit: Arc<dyn AuditTrail>,
}

impl OrganizationManager {
    pub fn new(tables: OrgTables) -> Self {
        Self {
            audit: tables.audit.clone(),
            model: OrganizationModel::new(tables),
        }
    }
}

#[async_trait]
impl OrganizationService for OrganizationManager {
    async fn summary(&self) -> AppResult<OrgSummary> {
        self.model.summary().await
    }

    async fn orphans(&self) -> AppResult<Vec<Orphan>> {
        self.model.orphans().await
    }

    async fn audit_log(&self, query: AuditQuery) -> AppResult<Vec<AuditEntry>> {
        self.audit.list(query).await
    }
}
