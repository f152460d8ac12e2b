//! Service container - wires every service over one record store.

use std::sync::Arc;

use domain::{
    Affair, CreateAffair, CreateDirectorate, CreatePosition, CreateWorkUnit, Directorate,
    Position, WorkUnit,
};

use super::{
    AssignmentManager, AssignmentService, OrganizationManager, OrganizationService, UnitManager,
    UnitService,
};
use crate::model::{AffairModel, AuditTrail, DirectorateModel, OrgTables, PositionModel, WorkUnitModel};
use crate::repository::RecordStore;

/// Shared handle to the service of one hierarchy level.
pub type Units<E, I> = Arc<dyn UnitService<Entity = E, Input = I>>;

/// All services, cheap to clone.
#[derive(Clone)]
pub struct OrgServices {
    pub directorates: Units<Directorate, CreateDirectorate>,
    pub work_units: Units<WorkUnit, CreateWorkUnit>,
    pub affairs: Units<Affair, CreateAffair>,
    pub positions: Units<Position, CreatePosition>,
    pub assignments: Arc<dyn AssignmentService>,
    pub organization: Arc<dyn OrganizationService>,
}

impl OrgServices {
    /// Build every service over `store`, auditing into its `audit_logs` table.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self::from_tables(OrgTables::new(store))
    }

    /// Build every service with a separate audit trail.
    pub fn with_audit(store: Arc<dyn RecordStore>, audit: Arc<dyn AuditTrail>) -> Self {
        Self::from_tables(OrgTables::with_audit(store, audit))
    }

    fn from_tables(tables: OrgTables) -> Self {
        Self {
            directorates: Arc::new(UnitManager::new(DirectorateModel::new(tables.clone()))),
            work_units: Arc::new(UnitManager::new(WorkUnitModel::new(tables.clone()))),
            affairs: Arc::new(UnitManager::new(AffairModel::new(tables.clone()))),
            positions: Arc::new(UnitManager::new(PositionModel::new(tables.clone()))),
            assignments: Arc::new(AssignmentManager::new(tables.clone())),
            organization: Arc::new(OrganizationManager::new(tables)),
        }
    }
}
