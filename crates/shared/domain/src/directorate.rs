//! Directorate: the top level of the organization hierarchy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::CODE_PREFIX_DIRECTORATE;
use crate::entity::{impl_org_unit, AuditStamp, EntityKind};
use crate::input::UnitInput;

/// Directorate domain entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directorate {
    pub id: String,
    pub code: String,
    pub name: String,
    pub description: String,
    /// Position heading the directorate
    pub director_position_id: Option<String>,
    pub active_from: DateTime<Utc>,
    pub active_until: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub sort_order: i32,
    pub notes: String,
    #[serde(flatten)]
    pub stamp: AuditStamp,
}

impl_org_unit!(Directorate, EntityKind::Directorate, CODE_PREFIX_DIRECTORATE);

/// Directorate creation data transfer object
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateDirectorate {
    /// Explicit code; generated when absent
    #[validate(length(min = 1, max = 20, message = "Code must be 1-20 characters"))]
    pub code: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Name is required (max 200 characters)"))]
    pub name: String,
    pub description: Option<String>,
    pub director_position_id: Option<String>,
    pub active_from: Option<DateTime<Utc>>,
    pub active_until: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
    #[validate(range(min = 0, message = "Sort order cannot be negative"))]
    pub sort_order: Option<i32>,
    pub notes: Option<String>,
}

impl UnitInput for CreateDirectorate {
    type Entity = Directorate;

    fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn window(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        (self.active_from, self.active_until)
    }

    fn into_entity(self, id: String, code: String, actor: &str) -> Directorate {
        Directorate {
            id,
            code,
            name: self.name.trim().to_string(),
            description: self.description.unwrap_or_default(),
            director_position_id: self.director_position_id,
            active_from: self.active_from.unwrap_or_else(Utc::now),
            active_until: self.active_until,
            is_active: self.is_active.unwrap_or(true),
            sort_order: self.sort_order.unwrap_or(0),
            notes: self.notes.unwrap_or_default(),
            stamp: AuditStamp::new(actor),
        }
    }
}
