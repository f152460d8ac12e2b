//! Traits and value types shared by every organization entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Entity types known to the organization hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Directorate,
    WorkUnit,
    Affair,
    Position,
    PositionAssignment,
}

impl EntityKind {
    /// Stable identifier used in audit entries.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Directorate => "DIRECTORATE",
            EntityKind::WorkUnit => "WORK_UNIT",
            EntityKind::Affair => "AFFAIR",
            EntityKind::Position => "POSITION",
            EntityKind::PositionAssignment => "POSITION_ASSIGNMENT",
        }
    }

    /// Human-readable name used in messages.
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Directorate => "Directorate",
            EntityKind::WorkUnit => "Work unit",
            EntityKind::Affair => "Affair",
            EntityKind::Position => "Position",
            EntityKind::PositionAssignment => "Position assignment",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Creation and modification metadata carried by every row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditStamp {
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

impl AuditStamp {
    /// Stamp for a row created now by `actor`.
    pub fn new(actor: &str) -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            created_by: actor.to_string(),
            updated_at: now,
            updated_by: actor.to_string(),
        }
    }
}

/// Common view over Directorate, WorkUnit, Affair and Position.
pub trait OrgUnit {
    const KIND: EntityKind;

    /// Fixed code prefix (`DIR`, `WU`, ...)
    const CODE_PREFIX: &'static str;

    fn id(&self) -> &str;
    fn code(&self) -> &str;
    fn name(&self) -> &str;
    fn is_active(&self) -> bool;
    fn active_from(&self) -> DateTime<Utc>;
    fn active_until(&self) -> Option<DateTime<Utc>>;
    fn sort_order(&self) -> i32;

    /// `is_active` and the active window both hold at `at`.
    fn is_effective_at(&self, at: DateTime<Utc>) -> bool {
        self.is_active()
            && self.active_from() <= at
            && self.active_until().map_or(true, |until| at <= until)
    }

    /// `CODE - Name`
    fn display(&self) -> String {
        format!("{} - {}", self.code(), self.name())
    }
}

/// Implements [`OrgUnit`] for a struct with the standard field names.
macro_rules! impl_org_unit {
    ($ty:ty, $kind:expr, $prefix:expr) => {
        impl $crate::entity::OrgUnit for $ty {
            const KIND: $crate::entity::EntityKind = $kind;
            const CODE_PREFIX: &'static str = $prefix;

            fn id(&self) -> &str {
                &self.id
            }
            fn code(&self) -> &str {
                &self.code
            }
            fn name(&self) -> &str {
                &self.name
            }
            fn is_active(&self) -> bool {
                self.is_active
            }
            fn active_from(&self) -> chrono::DateTime<chrono::Utc> {
                self.active_from
            }
            fn active_until(&self) -> Option<chrono::DateTime<chrono::Utc>> {
                self.active_until
            }
            fn sort_order(&self) -> i32 {
                self.sort_order
            }
        }
    };
}

pub(crate) use impl_org_unit;
