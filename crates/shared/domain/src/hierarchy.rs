//! Value types returned by the hierarchy helper queries.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::OrgUnit;

/// Descendant counts of an entity, used to choose between plain delete,
/// cascade and reassignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescendantCounts {
    pub work_units: usize,
    pub affairs: usize,
    pub positions: usize,
    pub assignments: usize,
    pub total: usize,
    pub has_children: bool,
}

impl DescendantCounts {
    pub fn new(work_units: usize, affairs: usize, positions: usize, assignments: usize) -> Self {
        let total = work_units + affairs + positions + assignments;
        Self {
            work_units,
            affairs,
            positions,
            assignments,
            total,
            has_children: total > 0,
        }
    }
}

/// Sibling candidate offered as a reassignment target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alternative {
    pub id: String,
    pub code: String,
    pub name: String,
    pub display: String,
}

impl Alternative {
    pub fn from_unit<U: OrgUnit>(unit: &U) -> Self {
        Self {
            id: unit.id().to_string(),
            code: unit.code().to_string(),
            name: unit.name().to_string(),
            display: unit.display(),
        }
    }
}

/// Outcome of a reassign-and-delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReassignReport {
    pub deleted_id: String,
    pub new_parent_id: String,
    pub moved: DescendantCounts,
}

/// Filters accepted by the hierarchy list operations.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListFilter {
    #[serde(alias = "isActive")]
    pub is_active: Option<bool>,
    /// Parent reference (directorate for work units, work unit for affairs,
    /// any attachment for positions)
    #[serde(
        alias = "parentId",
        alias = "directorate_id",
        alias = "work_unit_id",
        alias = "affair_id"
    )]
    pub parent_id: Option<String>,
    /// Keep only rows that are active and inside their active window
    pub effective: Option<bool>,
}

impl ListFilter {
    /// Whether `unit` passes the activity filters evaluated at `now`.
    pub fn admits<U: OrgUnit>(&self, unit: &U, now: DateTime<Utc>) -> bool {
        if let Some(active) = self.is_active {
            if unit.is_active() != active {
                return false;
            }
        }
        if self.effective == Some(true) && !unit.is_effective_at(now) {
            return false;
        }
        true
    }
}

/// A listed row denormalized with the display names of its references.
#[derive(Debug, Clone, Serialize)]
pub struct Listed<E> {
    #[serde(flatten)]
    pub item: E,
    #[serde(flatten)]
    pub names: BTreeMap<String, String>,
}

impl<E> Listed<E> {
    pub fn new(item: E) -> Self {
        Self {
            item,
            names: BTreeMap::new(),
        }
    }

    pub fn with(mut self, field: &str, display: String) -> Self {
        self.names.insert(field.to_string(), display);
        self
    }
}
