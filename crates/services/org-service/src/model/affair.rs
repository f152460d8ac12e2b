//! Affair model.

use std::collections::HashMap;

use async_trait::async_trait;

use common::{AppError, AppResult};
use domain::{Affair, CreateAffair, DescendantCounts, Listed, OrgUnit, Position, EMPTY_DISPLAY};

use super::hierarchy::{display_map, display_of, HierarchyModel};
use super::records::Records;
use super::tables::{Descendants, OrgTables, WalkOrigin};

pub struct AffairModel {
    tables: OrgTables,
}

impl AffairModel {
    pub fn new(tables: OrgTables) -> Self {
        Self { tables }
    }

    async fn positions_of(&self, id: &str) -> AppResult<Vec<Position>> {
        Ok(self
            .tables
            .positions
            .all()
            .await?
            .into_iter()
            .filter(|p| p.affair_id.as_deref() == Some(id))
            .collect())
    }
}

#[async_trait]
impl HierarchyModel for AffairModel {
    type Entity = Affair;
    type Input = CreateAffair;

    fn tables(&self) -> &OrgTables {
        &self.tables
    }

    fn records(&self) -> &Records<Affair> {
        &self.tables.affairs
    }

    fn has_parent(affair: &Affair, parent_id: &str) -> bool {
        affair.work_unit_id == parent_id
    }

    fn same_parent(a: &Affair, b: &Affair) -> bool {
        a.work_unit_id == b.work_unit_id
    }

    async fn check_parent(&self, input: &CreateAffair) -> AppResult<()> {
        match self.tables.work_units.find(&input.work_unit_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::validation("work_unit_id", "Work unit not found")),
        }
    }

    async fn denormalize(&self, items: Vec<Affair>) -> AppResult<Vec<Listed<Affair>>> {
        let work_units = self.tables.work_units.all().await?;
        let directorates = display_map(&self.tables.directorates.all().await?);
        let positions = display_map(&self.tables.positions.all().await?);

        // work unit id -> (work unit display, directorate display)
        let parents: HashMap<&str, (String, String)> = work_units
            .iter()
            .map(|w| {
                let directorate = display_of(&directorates, Some(w.directorate_id.as_str()));
                (w.id.as_str(), (w.display(), directorate))
            })
            .collect();

        Ok(items
            .into_iter()
            .map(|a| {
                let (work_unit, directorate) = parents
                    .get(a.work_unit_id.as_str())
                    .cloned()
                    .unwrap_or_else(|| (EMPTY_DISPLAY.to_string(), EMPTY_DISPLAY.to_string()));
                let assistant = display_of(&positions, a.assistant_deputy_position_id.as_deref());
                Listed::new(a)
                    .with("work_unit_name", work_unit)
                    .with("directorate_name", directorate)
                    .with("assistant_deputy_position_name", assistant)
            })
            .collect())
    }

    async fn blocking_children(&self, id: &str) -> AppResult<Option<String>> {
        let active = self
            .positions_of(id)
            .await?
            .iter()
            .filter(|p| p.is_active)
            .count();

        Ok((active > 0).then(|| {
            format!(
                "Cannot delete affair: it still has {} active positions",
                active
            )
        }))
    }

    async fn descendants(&self, id: &str) -> AppResult<Descendants> {
        let roots = self.positions_of(id).await?;
        self.tables
            .descendants(WalkOrigin::Unit(id), Vec::new(), Vec::new(), roots)
            .await
    }

    async fn reassign_children(
        &self,
        id: &str,
        new_parent_id: &str,
        actor: &str,
    ) -> AppResult<DescendantCounts> {
        let positions = self.positions_of(id).await?;

        let t = &self.tables;
        let moved = t
            .repoint(&t.positions, &positions, "affair_id", new_parent_id, actor)
            .await?;

        Ok(DescendantCounts::new(0, 0, moved, 0))
    }
}
