//! Service layer - business operations over the models.

mod assignment_service;
mod container;
mod organization_service;
mod unit_service;

pub use assignment_service::{AssignmentManager, AssignmentService};
pub use container::{OrgServices, Units};
pub use organization_service::{OrganizationManager, OrganizationService};
pub use unit_service::{UnitManager, UnitService};
