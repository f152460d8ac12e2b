//! Domain layer - Organization hierarchy entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies:
//! the Directorate → WorkUnit → Affair → Position hierarchy, position
//! assignments, code generation, audit entries and the permission matrix.

pub mod affair;
pub mod assignment;
pub mod audit;
pub mod code;
pub mod constants;
pub mod directorate;
pub mod entity;
pub mod error;
pub mod hierarchy;
pub mod input;
pub mod permission;
pub mod position;
pub mod work_unit;

pub use affair::{Affair, CreateAffair};
pub use assignment::{AssignmentStatus, CreateAssignment, PositionAssignment};
pub use audit::{AuditAction, AuditEntry, AuditQuery};
pub use code::next_code;
pub use constants::*;
pub use directorate::{CreateDirectorate, Directorate};
pub use entity::{AuditStamp, EntityKind, OrgUnit};
pub use error::{DomainError, DomainResult, FieldErrors};
pub use hierarchy::{Alternative, DescendantCounts, ListFilter, Listed, ReassignReport};
pub use input::UnitInput;
pub use permission::{Module, Permission, PermissionMatrix, Role, Verb};
pub use position::{CreatePosition, Position};
pub use work_unit::{CreateWorkUnit, WorkUnit};
