//! Position assignment service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use common::{AppResult, OptionExt};
use domain::{AuditAction, CreateAssignment, EntityKind, Listed, PositionAssignment};

use crate::model::{AssignmentFilter, AssignmentModel, OrgTables};
use crate::repository::Row;

/// Assignment service trait for dependency injection.
#[async_trait]
pub trait AssignmentService: Send + Sync {
    async fn list(&self, filter: AssignmentFilter) -> AppResult<Vec<Listed<PositionAssignment>>>;

    async fn get(&self, id: &str) -> AppResult<PositionAssignment>;

    async fn create(&self, input: CreateAssignment, actor: &str) -> AppResult<PositionAssignment>;

    /// Partial update; `status` is rejected
    async fn update(&self, id: &str, patch: Row, actor: &str) -> AppResult<PositionAssignment>;

    /// Close an active assignment
    async fn end(
        &self,
        id: &str,
        end_date: Option<DateTime<Utc>>,
        actor: &str,
    ) -> AppResult<PositionAssignment>;

    async fn delete(&self, id: &str, actor: &str) -> AppResult<PositionAssignment>;
}

/// Concrete implementation of AssignmentService.
pub struct AssignmentManager {
    model: AssignmentModel,
    tables: OrgTables,
}

impl AssignmentManager {
    pub fn new(tables: OrgTables) -> Self {
        Self {
            model: AssignmentModel::new(tables.clone()),
            tables,
        }
    }

    async fn audit(&self, actor: &str, action: AuditAction, id: &str, description: String) {
        self.tables
            .log(actor, action, EntityKind::PositionAssignment, id, description)
            .await;
    }
}

#[async_trait]
impl AssignmentService for AssignmentManager {
    async fn list(&self, filter: AssignmentFilter) -> AppResult<Vec<Listed<PositionAssignment>>> {
        self.model.list(&filter).await
    }

    async fn get(&self, id: &str) -> AppResult<PositionAssignment> {
        self.model
            .find_by_id(id)
            .await?
            .ok_or_not_found(EntityKind::PositionAssignment.label())
    }

    async fn create(&self, input: CreateAssignment, actor: &str) -> AppResult<PositionAssignment> {
        input.check()?;
        let assignment = self.model.create(input, actor).await?;

        tracing::info!(id = %assignment.id, position_id = %assignment.position_id, "Assignment created");
        self.audit(
            actor,
            AuditAction::Create,
            &assignment.id,
            format!(
                "Assigned user {} to position {}",
                assignment.user_id, assignment.position_id
            ),
        )
        .await;
        Ok(assignment)
    }

    async fn update(&self, id: &str, patch: Row, actor: &str) -> AppResult<PositionAssignment> {
        let fields: Vec<String> = patch.keys().cloned().collect();
        let assignment = self.model.update(id, patch, actor).await?;

        self.audit(
            actor,
            AuditAction::Update,
            id,
            format!("Updated assignment ({})", fields.join(", ")),
        )
        .await;
        Ok(assignment)
    }

    async fn end(
        &self,
        id: &str,
        end_date: Option<DateTime<Utc>>,
        actor: &str,
    ) -> AppResult<PositionAssignment> {
        let assignment = self.model.end(id, end_date, actor).await?;

        tracing::info!(id = %id, "Assignment ended");
        self.audit(
            actor,
            AuditAction::End,
            id,
            format!(
                "Ended assignment of user {} to position {}",
                assignment.user_id, assignment.position_id
            ),
        )
        .await;
        Ok(assignment)
    }

    async fn delete(&self, id: &str, actor: &str) -> AppResult<PositionAssignment> {
        let assignment = self.model.delete(id).await?;

        tracing::info!(id = %id, "Assignment deleted");
        self.audit(
            actor,
            AuditAction::Delete,
            id,
            format!(
                "Deleted assignment of user {} to position {}",
                assignment.user_id, assignment.position_id
            ),
        )
        .await;
        Ok(assignment)
    }
}
