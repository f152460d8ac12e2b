//! Model layer: typed tables, hierarchy models and organization views.

mod affair;
mod assignment;
mod audit_trail;
mod directorate;
mod hierarchy;
mod organization;
mod position;
mod records;
mod tables;
mod work_unit;

pub use affair::AffairModel;
pub use assignment::{AssignmentFilter, AssignmentModel};
pub use audit_trail::{AuditTrail, StoreAuditTrail};
pub use directorate::DirectorateModel;
pub use hierarchy::HierarchyModel;
pub use organization::{OrgSummary, OrganizationModel, Orphan};
pub use position::PositionModel;
pub use records::{Record, Records};
pub use tables::{Descendants, OrgTables};
pub use work_unit::WorkUnitModel;

#[cfg(any(test, feature = "test-utils"))]
pub use audit_trail::MockAuditTrail;
