//! Organization-wide views: the summary counts and the orphan scan.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use common::AppResult;
use domain::{EntityKind, OrgUnit};

use super::tables::OrgTables;

/// Counts of entities currently in force.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgSummary {
    pub directorates: usize,
    pub work_units: usize,
    pub affairs: usize,
    pub positions: usize,
    pub active_assignments: usize,
    /// Effective positions nobody actively holds
    pub vacant_positions: usize,
    pub generated_at: DateTime<Utc>,
}

/// A row whose reference points at a missing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Orphan {
    pub entity_type: EntityKind,
    pub entity_id: String,
    pub code: String,
    pub field: String,
    pub missing_id: String,
}

pub struct OrganizationModel {
    tables: OrgTables,
}

impl OrganizationModel {
    pub fn new(tables: OrgTables) -> Self {
        Self { tables }
    }

    pub async fn summary(&self) -> AppResult<OrgSummary> {
        let now = Utc::now();
        let t = &self.tables;

        let positions: Vec<_> = t
            .positions
            .all()
            .await?
            .into_iter()
            .filter(|p| p.is_effective_at(now))
            .collect();
        let active_assignments: Vec<_> = t
            .assignments
            .all()
            .await?
            .into_iter()
            .filter(|a| a.is_active())
            .collect();
        let held: HashSet<&str> = active_assignments
            .iter()
            .map(|a| a.position_id.as_str())
            .collect();

        Ok(OrgSummary {
            directorates: count_effective(&t.directorates.all().await?, now),
            work_units: count_effective(&t.work_units.all().await?, now),
            affairs: count_effective(&t.affairs.all().await?, now),
            positions: positions.len(),
            active_assignments: active_assignments.len(),
            vacant_positions: positions
                .iter()
                .filter(|p| !held.contains(p.id.as_str()))
                .count(),
            generated_at: now,
        })
    }

    /// Every dangling reference, mandatory and optional alike.
    ///
    /// Partial cascades and reassignment to an unknown id leave these behind.
    pub async fn orphans(&self) -> AppResult<Vec<Orphan>> {
        let t = &self.tables;
        let directorates = t.directorates.all().await?;
        let work_units = t.work_units.all().await?;
        let affairs = t.affairs.all().await?;
        let positions = t.positions.all().await?;
        let assignments = t.assignments.all().await?;

        let directorate_ids = ids(&directorates);
        let work_unit_ids = ids(&work_units);
        let affair_ids = ids(&affairs);
        let position_ids = ids(&positions);

        let mut scan = OrphanScan::default();
        for d in &directorates {
            scan.check(d, "director_position_id", d.director_position_id.as_deref(), &position_ids);
        }
        for w in &work_units {
            scan.check(w, "directorate_id", Some(w.directorate_id.as_str()), &directorate_ids);
            scan.check(w, "deputy_position_id", w.deputy_position_id.as_deref(), &position_ids);
        }
        for a in &affairs {
            scan.check(a, "work_unit_id", Some(a.work_unit_id.as_str()), &work_unit_ids);
            scan.check(
                a,
                "assistant_deputy_position_id",
                a.assistant_deputy_position_id.as_deref(),
                &position_ids,
            );
        }
        for p in &positions {
            scan.check(p, "directorate_id", p.directorate_id.as_deref(), &directorate_ids);
            scan.check(p, "work_unit_id", p.work_unit_id.as_deref(), &work_unit_ids);
            scan.check(p, "affair_id", p.affair_id.as_deref(), &affair_ids);
            scan.check(p, "parent_position_id", p.parent_position_id.as_deref(), &position_ids);
        }
        for a in &assignments {
            if !position_ids.contains(a.position_id.as_str()) {
                scan.found.push(Orphan {
                    entity_type: EntityKind::PositionAssignment,
                    entity_id: a.id.clone(),
                    code: String::new(),
                    field: "position_id".to_string(),
                    missing_id: a.position_id.clone(),
                });
            }
        }

        if !scan.found.is_empty() {
            tracing::warn!(count = scan.found.len(), "Dangling references found");
        }
        Ok(scan.found)
    }
}

#[derive(Default)]
struct OrphanScan {
    found: Vec<Orphan>,
}

impl OrphanScan {
    fn check<U: OrgUnit>(&mut self, unit: &U, field: &str, target: Option<&str>, known: &HashSet<&str>) {
        if let Some(target) = target.filter(|t| !t.is_empty()) {
            if !known.contains(target) {
                self.found.push(Orphan {
                    entity_type: U::KIND,
                    entity_id: unit.id().to_string(),
                    code: unit.code().to_string(),
                    field: field.to_string(),
                    missing_id: target.to_string(),
                });
            }
        }
    }
}

fn ids<U: OrgUnit>(units: &[U]) -> HashSet<&str> {
    units.iter().map(|u| u.id()).collect()
}

fn count_effective<U: OrgUnit>(units: &[U], now: DateTime<Utc>) -> usize {
    units.iter().filter(|u| u.is_effective_at(now)).count()
}
