//! Operations shared by the four hierarchy models.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{
    next_code, Alternative, DescendantCounts, DomainError, DomainResult, ListFilter, Listed,
    OrgUnit, ReassignReport, UnitInput, EMPTY_DISPLAY, MAX_NAME_LENGTH,
};

use super::records::{Record, Records};
use super::tables::{Descendants, OrgTables};
use crate::repository::Row;

/// Directorate, WorkUnit, Affair and Position models.
///
/// Each model supplies the level-specific pieces (which rows are its
/// children, what blocks a delete, how siblings are recognised); the CRUD and
/// delete strategies are written once here.
#[async_trait]
pub trait HierarchyModel: Send + Sync + 'static {
    type Entity: OrgUnit + Record;
    type Input: UnitInput<Entity = Self::Entity> + serde::de::DeserializeOwned;

    fn tables(&self) -> &OrgTables;

    fn records(&self) -> &Records<Self::Entity>;

    /// Whether `entity` belongs under `parent_id` for list filtering
    fn has_parent(entity: &Self::Entity, parent_id: &str) -> bool;

    /// Whether two entities share the same parent
    fn same_parent(a: &Self::Entity, b: &Self::Entity) -> bool;

    /// Field-level checks on an updated entity
    fn check_entity(entity: &Self::Entity) -> DomainResult<()> {
        check_unit(entity)
    }

    /// Add parent display names to listed rows.
    async fn denormalize(&self, items: Vec<Self::Entity>) -> AppResult<Vec<Listed<Self::Entity>>>;

    /// Reason a plain delete is refused, if any
    async fn blocking_children(&self, id: &str) -> AppResult<Option<String>>;

    /// Everything below the entity, transitively.
    async fn descendants(&self, id: &str) -> AppResult<Descendants>;

    /// Re-point direct children at `new_parent_id`; returns how many moved.
    async fn reassign_children(
        &self,
        id: &str,
        new_parent_id: &str,
        actor: &str,
    ) -> AppResult<DescendantCounts>;

    /// Mandatory parent of a new entity must exist
    async fn check_parent(&self, _input: &Self::Input) -> AppResult<()> {
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Self::Entity>> {
        self.records().find(id).await
    }

    /// Filtered list ordered by `sort_order`, ties kept in row order.
    async fn get_all(&self, filter: &ListFilter) -> AppResult<Vec<Listed<Self::Entity>>> {
        let now = Utc::now();
        let mut items: Vec<Self::Entity> = self
            .records()
            .all()
            .await?
            .into_iter()
            .filter(|e| filter.admits(e, now))
            .filter(|e| {
                filter
                    .parent_id
                    .as_deref()
                    .map_or(true, |p| Self::has_parent(e, p))
            })
            .collect();
        items.sort_by_key(|e| e.sort_order());

        self.denormalize(items).await
    }

    async fn create(&self, input: Self::Input, actor: &str) -> AppResult<Self::Entity> {
        let existing = self.records().all().await?;

        let code = match input.code().map(str::trim) {
            Some(code) => {
                if existing.iter().any(|e| e.code().eq_ignore_ascii_case(code)) {
                    return Err(AppError::conflict(format!(
                        "{} code {}",
                        Self::Entity::ENTITY.label(),
                        code
                    )));
                }
                code.to_string()
            }
            None => next_code(
                Self::Entity::CODE_PREFIX,
                existing.iter().map(|e| e.code()),
            ),
        };

        let entity = input.into_entity(Uuid::new_v4().to_string(), code, actor);
        self.records().insert(&entity).await?;
        Ok(entity)
    }

    async fn update(&self, id: &str, patch: Row, actor: &str) -> AppResult<Self::Entity> {
        if let Some(Value::String(code)) = patch.get("code") {
            let taken = self
                .records()
                .all()
                .await?
                .iter()
                .any(|e| e.id() != id && e.code().eq_ignore_ascii_case(code.trim()));
            if taken {
                return Err(AppError::conflict(format!(
                    "{} code {}",
                    Self::Entity::ENTITY.label(),
                    code.trim()
                )));
            }
        }

        self.records()
            .patch(id, patch, actor, Self::check_entity)
            .await
    }

    /// Plain delete, refused while active next-level children exist.
    async fn delete(&self, id: &str) -> AppResult<Self::Entity> {
        let entity = self.records().get(id).await?;

        if let Some(reason) = self.blocking_children(id).await? {
            return Err(AppError::blocked(reason));
        }

        self.records().remove(id).await?;
        Ok(entity)
    }

    async fn check_children(&self, id: &str) -> AppResult<DescendantCounts> {
        self.records().get(id).await?;
        Ok(self.descendants(id).await?.counts())
    }

    /// Active siblings, excluding the entity itself.
    async fn get_alternatives(&self, id: &str) -> AppResult<Vec<Alternative>> {
        let entity = self.records().get(id).await?;

        let mut siblings: Vec<Self::Entity> = self
            .records()
            .all()
            .await?
            .into_iter()
            .filter(|e| e.id() != id && e.is_active() && Self::same_parent(&entity, e))
            .collect();
        siblings.sort_by_key(|e| e.sort_order());

        Ok(siblings.iter().map(Alternative::from_unit).collect())
    }

    /// Delete the entity and every descendant. Returns the removed
    /// descendant counts; not atomic.
    async fn cascade_delete(&self, id: &str, actor: &str) -> AppResult<(Self::Entity, DescendantCounts)> {
        let entity = self.records().get(id).await?;

        let doomed = self.descendants(id).await?;
        let removed = self.tables().purge(&doomed, actor).await?;
        self.records().remove(id).await?;

        Ok((entity, removed))
    }

    /// Move direct children to `new_parent_id`, then delete the entity.
    ///
    /// The new parent is not looked up; a dangling id is accepted and later
    /// reported by the orphan scan.
    async fn reassign_and_delete(
        &self,
        id: &str,
        new_parent_id: &str,
        actor: &str,
    ) -> AppResult<ReassignReport> {
        let new_parent_id = new_parent_id.trim();
        if new_parent_id.is_empty() {
            return Err(AppError::validation("new_parent_id", "Replacement is required"));
        }
        if new_parent_id == id {
            return Err(AppError::validation(
                "new_parent_id",
                "Replacement must differ from the entity being deleted",
            ));
        }
        self.records().get(id).await?;

        let moved = self.reassign_children(id, new_parent_id, actor).await?;
        self.records().remove(id).await?;

        Ok(ReassignReport {
            deleted_id: id.to_string(),
            new_parent_id: new_parent_id.to_string(),
            moved,
        })
    }

    async fn generate_code(&self) -> AppResult<String> {
        let existing = self.records().all().await?;
        Ok(next_code(
            Self::Entity::CODE_PREFIX,
            existing.iter().map(|e| e.code()),
        ))
    }
}

/// Name, sort order and active window checks shared by all levels.
pub(crate) fn check_unit<U: OrgUnit>(unit: &U) -> DomainResult<()> {
    let name = unit.name().trim();
    if name.is_empty() || name.chars().count() as u64 > MAX_NAME_LENGTH {
        return Err(DomainError::field(
            "name",
            "Name is required (max 200 characters)",
        ));
    }
    if unit.sort_order() < 0 {
        return Err(DomainError::field("sort_order", "Sort order cannot be negative"));
    }
    if matches!(unit.active_until(), Some(until) if until <= unit.active_from()) {
        return Err(DomainError::field(
            "active_until",
            "Active until must be after active from",
        ));
    }
    Ok(())
}

/// `id -> "CODE - Name"` for a set of units.
pub(crate) fn display_map<U: OrgUnit>(units: &[U]) -> HashMap<String, String> {
    units
        .iter()
        .map(|u| (u.id().to_string(), u.display()))
        .collect()
}

/// Display name of an optional reference, `-` when absent or dangling.
pub(crate) fn display_of(names: &HashMap<String, String>, id: Option<&str>) -> String {
    id.and_then(|id| names.get(id))
        .cloned()
        .unwrap_or_else(|| EMPTY_DISPLAY.to_string())
}
