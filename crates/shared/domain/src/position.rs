//! Position: a role slot that may attach at any level of the hierarchy.
//!
//! A position can reference a directorate, a work unit and an affair at the
//! same time; no mutual exclusion is enforced between the three.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::CODE_PREFIX_POSITION;
use crate::entity::{impl_org_unit, AuditStamp, EntityKind};
use crate::input::UnitInput;

/// Default position type when none is supplied
pub const DEFAULT_POSITION_TYPE: &str = "STRUCTURAL";

/// Position domain entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: String,
    pub code: String,
    pub name: String,
    pub position_type: String,
    pub level: i32,
    pub parent_position_id: Option<String>,
    pub directorate_id: Option<String>,
    pub work_unit_id: Option<String>,
    pub affair_id: Option<String>,
    pub description: String,
    pub responsibilities: String,
    pub active_from: DateTime<Utc>,
    pub active_until: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub sort_order: i32,
    pub notes: String,
    #[serde(flatten)]
    pub stamp: AuditStamp,
}

impl_org_unit!(Position, EntityKind::Position, CODE_PREFIX_POSITION);

impl Position {
    /// The (directorate, work unit, affair) triple the position hangs from.
    pub fn attachment(&self) -> (Option<&str>, Option<&str>, Option<&str>) {
        (
            self.directorate_id.as_deref(),
            self.work_unit_id.as_deref(),
            self.affair_id.as_deref(),
        )
    }

    /// Whether any of the hierarchy references points at `id`.
    pub fn is_attached_to(&self, id: &str) -> bool {
        [&self.directorate_id, &self.work_unit_id, &self.affair_id]
            .iter()
            .any(|r| r.as_deref() == Some(id))
    }
}

/// Position creation data transfer object
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreatePosition {
    #[validate(length(min = 1, max = 20, message = "Code must be 1-20 characters"))]
    pub code: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Name is required (max 200 characters)"))]
    pub name: String,
    #[validate(length(min = 1, max = 50, message = "Position type must be 1-50 characters"))]
    pub position_type: Option<String>,
    #[validate(range(min = 1, max = 99, message = "Level must be between 1 and 99"))]
    pub level: Option<i32>,
    pub parent_position_id: Option<String>,
    pub directorate_id: Option<String>,
    pub work_unit_id: Option<String>,
    pub affair_id: Option<String>,
    pub description: Option<String>,
    pub responsibilities: Option<String>,
    pub active_from: Option<DateTime<Utc>>,
    pub active_until: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
    #[validate(range(min = 0, message = "Sort order cannot be negative"))]
    pub sort_order: Option<i32>,
    pub notes: Option<String>,
}

impl UnitInput for CreatePosition {
    type Entity = Position;

    fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn window(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        (self.active_from, self.active_until)
    }

    fn into_entity(self, id: String, code: String, actor: &str) -> Position {
        Position {
            id,
            code,
            name: self.name.trim().to_string(),
            position_type: self
                .position_type
                .unwrap_or_else(|| DEFAULT_POSITION_TYPE.to_string()),
            level: self.level.unwrap_or(1),
            parent_position_id: self.parent_position_id,
            directorate_id: self.directorate_id,
            work_unit_id: self.work_unit_id,
            affair_id: self.affair_id,
            description: self.description.unwrap_or_default(),
            responsibilities: self.responsibilities.unwrap_or_default(),
            active_from: self.active_from.unwrap_or_else(Utc::now),
            active_until: self.active_until,
            is_active: self.is_active.unwrap_or(true),
            sort_order: self.sort_order.unwrap_or(0),
            notes: self.notes.unwrap_or_default(),
            stamp: AuditStamp::new(actor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position() -> Position {
        CreatePosition {
            name: "Head of Planning".to_string(),
            directorate_id: Some("dir-1".to_string()),
            affair_id: Some("aff-1".to_string()),
            ..Default::default()
        }
        .into_entity("pos-1".to_string(), "POS-001".to_string(), "tester")
    }

    #[test]
    fn test_defaults_applied() {
        let p = position();
        assert_eq!(p.position_type, DEFAULT_POSITION_TYPE);
        assert_eq!(p.level, 1);
        assert!(p.is_active);
        assert_eq!(p.sort_order, 0);
        assert_eq!(p.stamp.created_by, "tester");
    }

    #[test]
    fn test_multiple_attachments_allowed() {
        let p = position();
        assert!(p.is_attached_to("dir-1"));
        assert!(p.is_attached_to("aff-1"));
        assert!(!p.is_attached_to("wu-1"));
        assert_eq!(p.attachment(), (Some("dir-1"), None, Some("aff-1")));
    }
}
