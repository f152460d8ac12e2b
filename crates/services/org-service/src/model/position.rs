//! Position model.
//!
//! Positions attach to any combination of directorate, work unit and affair;
//! their own children are assignments and subordinate positions.

use async_trait::async_trait;

use common::AppResult;
use domain::{
    CreatePosition, DescendantCounts, DomainError, DomainResult, Listed, Position,
    PositionAssignment, MAX_POSITION_LEVEL, MIN_POSITION_LEVEL,
};

use super::hierarchy::{check_unit, display_map, display_of, HierarchyModel};
use super::records::Records;
use super::tables::{Descendants, OrgTables, WalkOrigin};

pub struct PositionModel {
    tables: OrgTables,
}

impl PositionModel {
    pub fn new(tables: OrgTables) -> Self {
        Self { tables }
    }

    async fn subordinates_of(&self, id: &str) -> AppResult<Vec<Position>> {
        Ok(self
            .tables
            .positions
            .all()
            .await?
            .into_iter()
            .filter(|p| p.parent_position_id.as_deref() == Some(id))
            .collect())
    }

    async fn assignments_of(&self, id: &str) -> AppResult<Vec<PositionAssignment>> {
        Ok(self
            .tables
            .assignments
            .all()
            .await?
            .into_iter()
            .filter(|a| a.position_id == id)
            .collect())
    }
}

#[async_trait]
impl HierarchyModel for PositionModel {
    type Entity = Position;
    type Input = CreatePosition;

    fn tables(&self) -> &OrgTables {
        &self.tables
    }

    fn records(&self) -> &Records<Position> {
        &self.tables.positions
    }

    fn has_parent(position: &Position, parent_id: &str) -> bool {
        position.is_attached_to(parent_id)
            || position.parent_position_id.as_deref() == Some(parent_id)
    }

    fn same_parent(a: &Position, b: &Position) -> bool {
        a.attachment() == b.attachment()
    }

    fn check_entity(position: &Position) -> DomainResult<()> {
        check_unit(position)?;
        if !(MIN_POSITION_LEVEL..=MAX_POSITION_LEVEL).contains(&position.level) {
            return Err(DomainError::field("level", "Level must be between 1 and 99"));
        }
        if position.parent_position_id.as_deref() == Some(position.id.as_str()) {
            return Err(DomainError::field(
                "parent_position_id",
                "A position cannot report to itself",
            ));
        }
        Ok(())
    }

    async fn denormalize(&self, items: Vec<Position>) -> AppResult<Vec<Listed<Position>>> {
        let directorates = display_map(&self.tables.directorates.all().await?);
        let work_units = display_map(&self.tables.work_units.all().await?);
        let affairs = display_map(&self.tables.affairs.all().await?);
        let positions = display_map(&self.tables.positions.all().await?);

        Ok(items
            .into_iter()
            .map(|p| {
                let directorate = display_of(&directorates, p.directorate_id.as_deref());
                let work_unit = display_of(&work_units, p.work_unit_id.as_deref());
                let affair = display_of(&affairs, p.affair_id.as_deref());
                let parent = display_of(&positions, p.parent_position_id.as_deref());
                Listed::new(p)
                    .with("directorate_name", directorate)
                    .with("work_unit_name", work_unit)
                    .with("affair_name", affair)
                    .with("parent_position_name", parent)
            })
            .collect())
    }

    async fn blocking_children(&self, id: &str) -> AppResult<Option<String>> {
        let active = self
            .assignments_of(id)
            .await?
            .iter()
            .filter(|a| a.is_active())
            .count();

        Ok((active > 0).then(|| {
            format!(
                "Cannot delete position: it still has {} active assignments",
                active
            )
        }))
    }

    async fn descendants(&self, id: &str) -> AppResult<Descendants> {
        let roots = self.subordinates_of(id).await?;
        self.tables
            .descendants(WalkOrigin::Position(id), Vec::new(), Vec::new(), roots)
            .await
    }

    async fn reassign_children(
        &self,
        id: &str,
        new_parent_id: &str,
        actor: &str,
    ) -> AppResult<DescendantCounts> {
        let assignments = self.assignments_of(id).await?;
        let subordinates = self.subordinates_of(id).await?;

        let t = &self.tables;
        let moved_assignments = t
            .repoint(&t.assignments, &assignments, "position_id", new_parent_id, actor)
            .await?;
        let moved_positions = t
            .repoint(&t.positions, &subordinates, "parent_position_id", new_parent_id, actor)
            .await?;

        Ok(DescendantCounts::new(0, 0, moved_positions, moved_assignments))
    }
}
