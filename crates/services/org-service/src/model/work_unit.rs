//! Work unit model.

use std::collections::HashSet;

use async_trait::async_trait;

use common::{AppError, AppResult};
use domain::{Affair, CreateWorkUnit, DescendantCounts, Listed, WorkUnit};

use super::hierarchy::{display_map, display_of, HierarchyModel};
use super::records::Records;
use super::tables::{Descendants, OrgTables, WalkOrigin};

pub struct WorkUnitModel {
    tables: OrgTables,
}

impl WorkUnitModel {
    pub fn new(tables: OrgTables) -> Self {
        Self { tables }
    }

    async fn affairs_of(&self, id: &str) -> AppResult<Vec<Affair>> {
        Ok(self
            .tables
            .affairs
            .all()
            .await?
            .into_iter()
            .filter(|a| a.work_unit_id == id)
            .collect())
    }
}

#[async_trait]
impl HierarchyModel for WorkUnitModel {
    type Entity = WorkUnit;
    type Input = CreateWorkUnit;

    fn tables(&self) -> &OrgTables {
        &self.tables
    }

    fn records(&self) -> &Records<WorkUnit> {
        &self.tables.work_units
    }

    fn has_parent(unit: &WorkUnit, parent_id: &str) -> bool {
        unit.directorate_id == parent_id
    }

    fn same_parent(a: &WorkUnit, b: &WorkUnit) -> bool {
        a.directorate_id == b.directorate_id
    }

    async fn check_parent(&self, input: &CreateWorkUnit) -> AppResult<()> {
        match self.tables.directorates.find(&input.directorate_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::validation("directorate_id", "Directorate not found")),
        }
    }

    async fn denormalize(&self, items: Vec<WorkUnit>) -> AppResult<Vec<Listed<WorkUnit>>> {
        let directorates = display_map(&self.tables.directorates.all().await?);
        let positions = display_map(&self.tables.positions.all().await?);

        Ok(items
            .into_iter()
            .map(|w| {
                let directorate = display_of(&directorates, Some(w.directorate_id.as_str()));
                let deputy = display_of(&positions, w.deputy_position_id.as_deref());
                Listed::new(w)
                    .with("directorate_name", directorate)
                    .with("deputy_position_name", deputy)
            })
            .collect())
    }

    async fn blocking_children(&self, id: &str) -> AppResult<Option<String>> {
        let active = self
            .affairs_of(id)
            .await?
            .iter()
            .filter(|a| a.is_active)
            .count();

        Ok((active > 0).then(|| {
            format!(
                "Cannot delete work unit: it still has {} active affairs",
                active
            )
        }))
    }

    async fn descendants(&self, id: &str) -> AppResult<Descendants> {
        let affairs = self.affairs_of(id).await?;
        let affair_ids: HashSet<String> = affairs.iter().map(|a| a.id.clone()).collect();

        let roots = self
            .tables
            .positions
            .all()
            .await?
            .into_iter()
            .filter(|p| {
                p.work_unit_id.as_deref() == Some(id)
                    || p.affair_id.as_ref().is_some_and(|a| affair_ids.contains(a))
            })
            .collect();

        self.tables
            .descendants(WalkOrigin::Unit(id), Vec::new(), affairs, roots)
            .await
    }

    async fn reassign_children(
        &self,
        id: &str,
        new_parent_id: &str,
        actor: &str,
    ) -> AppResult<DescendantCounts> {
        let affairs = self.affairs_of(id).await?;
        let positions: Vec<_> = self
            .tables
            .positions
            .all()
            .await?
            .into_iter()
            .filter(|p| p.work_unit_id.as_deref() == Some(id))
            .collect();

        let t = &self.tables;
        let moved_affairs = t
            .repoint(&t.affairs, &affairs, "work_unit_id", new_parent_id, actor)
            .await?;
        let moved_positions = t
            .repoint(&t.positions, &positions, "work_unit_id", new_parent_id, actor)
            .await?;

        Ok(DescendantCounts::new(0, moved_affairs, moved_positions, 0))
    }
}
