//! Position assignment: a time-bounded binding of a person to a position.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::{STATUS_ACTIVE, STATUS_ENDED};
use crate::entity::AuditStamp;
use crate::error::{DomainError, DomainResult};

/// Assignment lifecycle. Only `Active -> Ended` is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssignmentStatus {
    Active,
    Ended,
}

impl std::fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignmentStatus::Active => write!(f, "{}", STATUS_ACTIVE),
            AssignmentStatus::Ended => write!(f, "{}", STATUS_ENDED),
        }
    }
}

/// Position assignment domain entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionAssignment {
    pub id: String,
    pub user_id: String,
    pub position_id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_primary: bool,
    pub status: AssignmentStatus,
    /// Reference number of the assignment letter
    pub assignment_letter: String,
    pub notes: String,
    #[serde(flatten)]
    pub stamp: AuditStamp,
}

impl PositionAssignment {
    pub fn is_active(&self) -> bool {
        self.status == AssignmentStatus::Active
    }

    /// Close the assignment at `end_date`.
    pub fn end(&mut self, end_date: DateTime<Utc>, actor: &str) -> DomainResult<()> {
        if self.status == AssignmentStatus::Ended {
            return Err(DomainError::blocked("Assignment has already ended"));
        }
        if end_date < self.start_date {
            return Err(DomainError::field(
                "end_date",
                "End date cannot be before the start date",
            ));
        }

        self.end_date = Some(end_date);
        self.status = AssignmentStatus::Ended;
        self.stamp.updated_at = Utc::now();
        self.stamp.updated_by = actor.to_string();
        Ok(())
    }
}

/// Assignment creation data transfer object
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateAssignment {
    #[serde(default)]
    #[validate(length(min = 1, message = "User is required"))]
    pub user_id: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Position is required"))]
    pub position_id: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_primary: Option<bool>,
    #[validate(length(max = 100, message = "Assignment letter reference is too long"))]
    pub assignment_letter: Option<String>,
    pub notes: Option<String>,
}

impl CreateAssignment {
    /// Field validation plus the date range check.
    pub fn check(&self) -> DomainResult<()> {
        self.validate()?;
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(DomainError::field(
                    "end_date",
                    "End date cannot be before the start date",
                ));
            }
        }
        Ok(())
    }

    pub fn into_entity(self, id: String, actor: &str) -> PositionAssignment {
        PositionAssignment {
            id,
            user_id: self.user_id,
            position_id: self.position_id,
            start_date: self.start_date.unwrap_or_else(Utc::now),
            end_date: self.end_date,
            is_primary: self.is_primary.unwrap_or(false),
            status: AssignmentStatus::Active,
            assignment_letter: self.assignment_letter.unwrap_or_default(),
            notes: self.notes.unwrap_or_default(),
            stamp: AuditStamp::new(actor),
        }
    }
}
