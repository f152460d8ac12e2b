//! Work unit: second level, always contained in a directorate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::CODE_PREFIX_WORK_UNIT;
use crate::entity::{impl_org_unit, AuditStamp, EntityKind};
use crate::input::UnitInput;

/// Work unit domain entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkUnit {
    pub id: String,
    pub code: String,
    pub name: String,
    pub description: String,
    /// Owning directorate
    pub directorate_id: String,
    pub deputy_position_id: Option<String>,
    pub active_from: DateTime<Utc>,
    pub active_until: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub sort_order: i32,
    pub notes: String,
    #[serde(flatten)]
    pub stamp: AuditStamp,
}

impl_org_unit!(WorkUnit, EntityKind::WorkUnit, CODE_PREFIX_WORK_UNIT);

/// Work unit creation data transfer object
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateWorkUnit {
    #[validate(length(min = 1, max = 20, message = "Code must be 1-20 characters"))]
    pub code: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Name is required (max 200 characters)"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Directorate is required"))]
    pub directorate_id: String,
    pub description: Option<String>,
    pub deputy_position_id: Option<String>,
    pub active_from: Option<DateTime<Utc>>,
    pub active_until: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
    #[validate(range(min = 0, message = "Sort order cannot be negative"))]
    pub sort_order: Option<i32>,
    pub notes: Option<String>,
}

impl UnitInput for CreateWorkUnit {
    type Entity = WorkUnit;

    fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn window(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        (self.active_from, self.active_until)
    }

    fn into_entity(self, id: String, code: String, actor: &str) -> WorkUnit {
        WorkUnit {
            id,
            code,
            name: self.name.trim().to_string(),
            description: self.description.unwrap_or_default(),
            directorate_id: self.directorate_id,
            deputy_position_id: self.deputy_position_id,
            active_from: self.active_from.unwrap_or_else(Utc::now),
            active_until: self.active_until,
            is_active: self.is_active.unwrap_or(true),
            sort_order: self.sort_order.unwrap_or(0),
            notes: self.notes.unwrap_or_default(),
            stamp: AuditStamp::new(actor),
        }
    }
}
