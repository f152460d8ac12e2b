//! Audit trail entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::EntityKind;

/// What happened to the entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Reassign,
    End,
}

/// One recorded mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub actor_id: String,
    pub action: AuditAction,
    pub entity_type: EntityKind,
    pub entity_id: String,
    pub description: String,
}

impl AuditEntry {
    pub fn new(
        actor_id: &str,
        action: AuditAction,
        entity_type: EntityKind,
        entity_id: &str,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            actor_id: actor_id.to_string(),
            action,
            entity_type,
            entity_id: entity_id.to_string(),
            description: description.into(),
        }
    }
}

/// Filters for listing audit entries
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditQuery {
    pub entity_type: Option<EntityKind>,
    pub entity_id: Option<String>,
    pub actor_id: Option<String>,
    pub limit: Option<usize>,
}

impl AuditQuery {
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        self.entity_type.map_or(true, |t| t == entry.entity_type)
            && self
                .entity_id
                .as_deref()
                .map_or(true, |id| id == entry.entity_id)
            && self
                .actor_id
                .as_deref()
                .map_or(true, |actor| actor == entry.actor_id)
    }
}
