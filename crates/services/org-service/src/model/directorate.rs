//! Directorate model.

use std::collections::HashSet;

use async_trait::async_trait;

use common::AppResult;
use domain::{CreateDirectorate, DescendantCounts, Directorate, Listed, WorkUnit};

use super::hierarchy::{display_map, display_of, HierarchyModel};
use super::records::Records;
use super::tables::{Descendants, OrgTables, WalkOrigin};

pub struct DirectorateModel {
    tables: OrgTables,
}

impl DirectorateModel {
    pub fn new(tables: OrgTables) -> Self {
        Self { tables }
    }

    async fn work_units_of(&self, id: &str) -> AppResult<Vec<WorkUnit>> {
        Ok(self
            .tables
            .work_units
            .all()
            .await?
            .into_iter()
            .filter(|w| w.directorate_id == id)
            .collect())
    }
}

#[async_trait]
impl HierarchyModel for DirectorateModel {
    type Entity = Directorate;
    type Input = CreateDirectorate;

    fn tables(&self) -> &OrgTables {
        &self.tables
    }

    fn records(&self) -> &Records<Directorate> {
        &self.tables.directorates
    }

    // Top level: no parent to filter on
    fn has_parent(_: &Directorate, _: &str) -> bool {
        true
    }

    fn same_parent(_: &Directorate, _: &Directorate) -> bool {
        true
    }

    async fn denormalize(&self, items: Vec<Directorate>) -> AppResult<Vec<Listed<Directorate>>> {
        let positions = display_map(&self.tables.positions.all().await?);

        Ok(items
            .into_iter()
            .map(|d| {
                let director = display_of(&positions, d.director_position_id.as_deref());
                Listed::new(d).with("director_position_name", director)
            })
            .collect())
    }

    async fn blocking_children(&self, id: &str) -> AppResult<Option<String>> {
        let active = self
            .work_units_of(id)
            .await?
            .iter()
            .filter(|w| w.is_active)
            .count();

        Ok((active > 0).then(|| {
            format!(
                "Cannot delete directorate: it still has {} active work units",
                active
            )
        }))
    }

    async fn descendants(&self, id: &str) -> AppResult<Descendants> {
        let work_units = self.work_units_of(id).await?;
        let work_unit_ids: HashSet<String> = work_units.iter().map(|w| w.id.clone()).collect();

        let affairs: Vec<_> = self
            .tables
            .affairs
            .all()
            .await?
            .into_iter()
            .filter(|a| work_unit_ids.contains(&a.work_unit_id))
            .collect();
        let affair_ids: HashSet<String> = affairs.iter().map(|a| a.id.clone()).collect();

        let roots = self
            .tables
            .positions
            .all()
            .await?
            .into_iter()
            .filter(|p| {
                p.directorate_id.as_deref() == Some(id)
                    || p.work_unit_id.as_ref().is_some_and(|w| work_unit_ids.contains(w))
                    || p.affair_id.as_ref().is_some_and(|a| affair_ids.contains(a))
            })
            .collect();

        self.tables
            .descendants(WalkOrigin::Unit(id), work_units, affairs, roots)
            .await
    }

    async fn reassign_children(
        &self,
        id: &str,
        new_parent_id: &str,
        actor: &str,
    ) -> AppResult<DescendantCounts> {
        let work_units = self.work_units_of(id).await?;
        let positions: Vec<_> = self
            .tables
            .positions
            .all()
            .await?
            .into_iter()
            .filter(|p| p.directorate_id.as_deref() == Some(id))
            .collect();

        let t = &self.tables;
        let moved_units = t
            .repoint(&t.work_units, &work_units, "directorate_id", new_parent_id, actor)
            .await?;
        let moved_positions = t
            .repoint(&t.positions, &positions, "directorate_id", new_parent_id, actor)
            .await?;

        Ok(DescendantCounts::new(moved_units, 0, moved_positions, 0))
    }
}
