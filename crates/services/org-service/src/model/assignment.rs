//! Position assignment model.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{
    AssignmentStatus, CreateAssignment, DomainError, DomainResult, Listed, PositionAssignment,
};

use super::hierarchy::{display_map, display_of};
use super::tables::OrgTables;
use crate::repository::Row;

/// Filters accepted by `assignments.list`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignmentFilter {
    pub position_id: Option<String>,
    pub user_id: Option<String>,
    pub status: Option<AssignmentStatus>,
}

impl AssignmentFilter {
    fn admits(&self, a: &PositionAssignment) -> bool {
        self.position_id.as_deref().map_or(true, |p| p == a.position_id)
            && self.user_id.as_deref().map_or(true, |u| u == a.user_id)
            && self.status.map_or(true, |s| s == a.status)
    }
}

pub struct AssignmentModel {
    tables: OrgTables,
}

impl AssignmentModel {
    pub fn new(tables: OrgTables) -> Self {
        Self { tables }
    }

    pub async fn list(&self, filter: &AssignmentFilter) -> AppResult<Vec<Listed<PositionAssignment>>> {
        let positions = display_map(&self.tables.positions.all().await?);

        Ok(self
            .tables
            .assignments
            .all()
            .await?
            .into_iter()
            .filter(|a| filter.admits(a))
            .map(|a| {
                let position = display_of(&positions, Some(a.position_id.as_str()));
                Listed::new(a).with("position_name", position)
            })
            .collect())
    }

    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<PositionAssignment>> {
        self.tables.assignments.find(id).await
    }

    pub async fn create(&self, input: CreateAssignment, actor: &str) -> AppResult<PositionAssignment> {
        if self.tables.positions.find(&input.position_id).await?.is_none() {
            return Err(AppError::validation("position_id", "Position not found"));
        }

        let assignment = input.into_entity(Uuid::new_v4().to_string(), actor);
        self.tables.assignments.insert(&assignment).await?;
        Ok(assignment)
    }

    /// Partial update. `status` only changes through [`end`](Self::end).
    pub async fn update(&self, id: &str, patch: Row, actor: &str) -> AppResult<PositionAssignment> {
        if patch.contains_key("status") {
            return Err(AppError::validation(
                "status",
                "Status changes only by ending the assignment",
            ));
        }
        self.tables
            .assignments
            .patch(id, patch, actor, check_dates)
            .await
    }

    /// `ACTIVE -> ENDED`, stamping the end date (now when not given).
    pub async fn end(
        &self,
        id: &str,
        end_date: Option<DateTime<Utc>>,
        actor: &str,
    ) -> AppResult<PositionAssignment> {
        let mut assignment = self.tables.assignments.get(id).await?;
        assignment.end(end_date.unwrap_or_else(Utc::now), actor)?;
        self.tables.assignments.save(&assignment).await?;
        Ok(assignment)
    }

    pub async fn delete(&self, id: &str) -> AppResult<PositionAssignment> {
        let assignment = self.tables.assignments.get(id).await?;
        self.tables.assignments.remove(id).await?;
        Ok(assignment)
    }
}

fn check_dates(a: &PositionAssignment) -> DomainResult<()> {
    match a.end_date {
        Some(end) if end < a.start_date => Err(DomainError::field(
            "end_date",
            "End date cannot be before the start date",
        )),
        _ => Ok(()),
    }
}

