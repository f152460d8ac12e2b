//! Hierarchy unit service - validation and audit around the hierarchy models.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use common::{AppResult, OptionExt};
use domain::{
    Alternative, AuditAction, DescendantCounts, ListFilter, Listed, OrgUnit, ReassignReport,
    UnitInput,
};

use crate::model::{HierarchyModel, Record};
use crate::repository::Row;

/// Operations offered for each hierarchy level.
#[async_trait]
pub trait UnitService: Send + Sync {
    type Entity: Serialize + Send + Sync;
    type Input: DeserializeOwned + Send;

    async fn list(&self, filter: ListFilter) -> AppResult<Vec<Listed<Self::Entity>>>;

    async fn get(&self, id: &str) -> AppResult<Self::Entity>;

    async fn create(&self, input: Self::Input, actor: &str) -> AppResult<Self::Entity>;

    /// Partial update; protected fields are ignored
    async fn update(&self, id: &str, patch: Row, actor: &str) -> AppResult<Self::Entity>;

    /// Plain delete, refused while active children exist
    async fn delete(&self, id: &str, actor: &str) -> AppResult<Self::Entity>;

    /// Delete with every descendant; returns what was removed below the entity
    async fn delete_cascade(&self, id: &str, actor: &str) -> AppResult<DescendantCounts>;

    async fn reassign_delete(
        &self,
        id: &str,
        new_parent_id: &str,
        actor: &str,
    ) -> AppResult<ReassignReport>;

    async fn check_children(&self, id: &str) -> AppResult<DescendantCounts>;

    async fn get_alternatives(&self, id: &str) -> AppResult<Vec<Alternative>>;

    async fn generate_code(&self) -> AppResult<String>;
}

/// Concrete implementation of UnitService over a hierarchy model.
pub struct UnitManager<M> {
    model: M,
}

impl<M: HierarchyModel> UnitManager<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    fn noun() -> String {
        M::Entity::ENTITY.label().to_lowercase()
    }

    async fn audit(&self, actor: &str, action: AuditAction, id: &str, description: String) {
        self.model
            .tables()
            .log(actor, action, M::Entity::ENTITY, id, description)
            .await;
    }
}

#[async_trait]
impl<M: HierarchyModel> UnitService for UnitManager<M> {
    type Entity = M::Entity;
    type Input = M::Input;

    async fn list(&self, filter: ListFilter) -> AppResult<Vec<Listed<M::Entity>>> {
        self.model.get_all(&filter).await
    }

    async fn get(&self, id: &str) -> AppResult<M::Entity> {
        self.model
            .find_by_id(id)
            .await?
            .ok_or_not_found(M::Entity::ENTITY.label())
    }

    async fn create(&self, input: M::Input, actor: &str) -> AppResult<M::Entity> {
        input.check()?;
        self.model.check_parent(&input).await?;

        let entity = self.model.create(input, actor).await?;

        tracing::info!(kind = %M::Entity::ENTITY, id = %entity.id(), code = %entity.code(), "Created");
        self.audit(
            actor,
            AuditAction::Create,
            entity.id(),
            format!("Created {} {}", Self::noun(), entity.display()),
        )
        .await;
        Ok(entity)
    }

    async fn update(&self, id: &str, patch: Row, actor: &str) -> AppResult<M::Entity> {
        let fields: Vec<String> = patch.keys().cloned().collect();
        let entity = self.model.update(id, patch, actor).await?;

        tracing::info!(kind = %M::Entity::ENTITY, id = %id, "Updated");
        self.audit(
            actor,
            AuditAction::Update,
            id,
            format!("Updated {} {} ({})", Self::noun(), entity.display(), fields.join(", ")),
        )
        .await;
        Ok(entity)
    }

    async fn delete(&self, id: &str, actor: &str) -> AppResult<M::Entity> {
        let entity = match self.model.delete(id).await {
            Ok(entity) => entity,
            Err(e) => {
                tracing::warn!(kind = %M::Entity::ENTITY, id = %id, error = %e, "Delete refused");
                return Err(e);
            }
        };

        tracing::info!(kind = %M::Entity::ENTITY, id = %id, "Deleted");
        self.audit(
            actor,
            AuditAction::Delete,
            id,
            format!("Deleted {} {}", Self::noun(), entity.display()),
        )
        .await;
        Ok(entity)
    }

    async fn delete_cascade(&self, id: &str, actor: &str) -> AppResult<DescendantCounts> {
        let (entity, removed) = self.model.cascade_delete(id, actor).await?;

        tracing::info!(
            kind = %M::Entity::ENTITY,
            id = %id,
            descendants = removed.total,
            "Cascade deleted"
        );
        self.audit(
            actor,
            AuditAction::Delete,
            id,
            format!(
                "Cascade deleted {} {} with {} descendants",
                Self::noun(),
                entity.display(),
                removed.total
            ),
        )
        .await;
        Ok(removed)
    }

    async fn reassign_delete(
        &self,
        id: &str,
        new_parent_id: &str,
        actor: &str,
    ) -> AppResult<ReassignReport> {
        let report = self.model.reassign_and_delete(id, new_parent_id, actor).await?;

        tracing::info!(
            kind = %M::Entity::ENTITY,
            id = %id,
            new_parent_id = %report.new_parent_id,
            moved = report.moved.total,
            "Reassigned and deleted"
        );
        self.audit(
            actor,
            AuditAction::Delete,
            id,
            format!(
                "Deleted {} after moving {} children to {}",
                Self::noun(),
                report.moved.total,
                report.new_parent_id
            ),
        )
        .await;
        Ok(report)
    }

    async fn check_children(&self, id: &str) -> AppResult<DescendantCounts> {
        self.model.check_children(id).await
    }

    async fn get_alternatives(&self, id: &str) -> AppResult<Vec<Alternative>> {
        self.model.get_alternatives(id).await
    }

    async fn generate_code(&self) -> AppResult<String> {
        self.model.generate_code().await
    }
}
