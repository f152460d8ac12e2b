//! The organization tables bundled together, plus the descendant walk used
//! by cascade deletes and child counts.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;

use common::AppResult;
use domain::{
    Affair, AuditAction, AuditEntry, DescendantCounts, Directorate, EntityKind, OrgUnit,
    Position, PositionAssignment, WorkUnit,
};

use super::audit_trail::{AuditTrail, StoreAuditTrail};
use super::records::{Record, Records};
use crate::repository::RecordStore;

/// Typed handles over every table of one store.
#[derive(Clone)]
pub struct OrgTables {
    pub directorates: Records<Directorate>,
    pub work_units: Records<WorkUnit>,
    pub affairs: Records<Affair>,
    pub positions: Records<Position>,
    pub assignments: Records<PositionAssignment>,
    pub audit: Arc<dyn AuditTrail>,
}

impl OrgTables {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        let audit = Arc::new(StoreAuditTrail::new(store.clone()));
        Self::with_audit(store, audit)
    }

    pub fn with_audit(store: Arc<dyn RecordStore>, audit: Arc<dyn AuditTrail>) -> Self {
        Self {
            directorates: Records::new(store.clone()),
            work_units: Records::new(store.clone()),
            affairs: Records::new(store.clone()),
            positions: Records::new(store.clone()),
            assignments: Records::new(store),
            audit,
        }
    }

    /// Append to the audit trail. Failures are logged and swallowed.
    pub async fn log(
        &self,
        actor: &str,
        action: AuditAction,
        kind: EntityKind,
        entity_id: &str,
        description: impl Into<String>,
    ) {
        let entry = AuditEntry::new(actor, action, kind, entity_id, description);
        if let Err(e) = self.audit.record(entry).await {
            tracing::warn!(
                error = %e,
                entity_type = %kind,
                entity_id = %entity_id,
                "Audit write failed"
            );
        }
    }

    /// Point `field` of each child at `new_parent`, one update and one audit
    /// entry per child.
    pub(crate) async fn repoint<E: Record>(
        &self,
        records: &Records<E>,
        children: &[E],
        field: &str,
        new_parent: &str,
        actor: &str,
    ) -> AppResult<usize> {
        for child in children {
            records
                .set_field(child.record_id(), field, Value::String(new_parent.to_string()), actor)
                .await?;
            self.log(
                actor,
                AuditAction::Reassign,
                E::ENTITY,
                child.record_id(),
                format!("{} moved to {}", field, new_parent),
            )
            .await;
        }
        Ok(children.len())
    }

    /// Delete everything in `doomed`, leaves first. Returns what was removed.
    ///
    /// Each step is its own store call: a failure part way leaves the rows
    /// deleted so far gone.
    pub(crate) async fn purge(&self, doomed: &Descendants, actor: &str) -> AppResult<DescendantCounts> {
        let mut removed = [0usize; 4];

        for assignment in &doomed.assignments {
            if self.assignments.remove(&assignment.id).await? {
                removed[3] += 1;
                self.log_removal(actor, EntityKind::PositionAssignment, &assignment.id, "")
                    .await;
            }
        }
        // Sub-positions come after their parents in the walk
        for position in doomed.positions.iter().rev() {
            if self.positions.remove(&position.id).await? {
                removed[2] += 1;
                self.log_removal(actor, EntityKind::Position, &position.id, &position.display())
                    .await;
            }
        }
        for affair in &doomed.affairs {
            if self.affairs.remove(&affair.id).await? {
                removed[1] += 1;
                self.log_removal(actor, EntityKind::Affair, &affair.id, &affair.display())
                    .await;
            }
        }
        for work_unit in &doomed.work_units {
            if self.work_units.remove(&work_unit.id).await? {
                removed[0] += 1;
                self.log_removal(actor, EntityKind::WorkUnit, &work_unit.id, &work_unit.display())
                    .await;
            }
        }

        Ok(DescendantCounts::new(removed[0], removed[1], removed[2], removed[3]))
    }

    async fn log_removal(&self, actor: &str, kind: EntityKind, id: &str, display: &str) {
        let description = if display.is_empty() {
            format!("Cascade deleted {}", kind.label().to_lowercase())
        } else {
            format!("Cascade deleted {} {}", kind.label().to_lowercase(), display)
        };
        self.log(actor, AuditAction::Delete, kind, id, description).await;
    }

    /// Transitive descendants of `origin`.
    ///
    /// `position_roots` are the positions directly below `origin`; their
    /// sub-positions are followed through `parent_position_id`. Below a unit
    /// the walk stays inside `work_units` and `affairs`: a report attached
    /// elsewhere is not part of the subtree.
    pub(crate) async fn descendants(
        &self,
        origin: WalkOrigin<'_>,
        work_units: Vec<WorkUnit>,
        affairs: Vec<Affair>,
        position_roots: Vec<Position>,
    ) -> AppResult<Descendants> {
        let all_positions = self.positions.all().await?;
        let positions = match origin {
            WalkOrigin::Unit(id) => {
                let scope: HashSet<&str> = std::iter::once(id)
                    .chain(work_units.iter().map(|w| w.id.as_str()))
                    .chain(affairs.iter().map(|a| a.id.as_str()))
                    .collect();
                position_subtree(&all_positions, position_roots, None, Some(&scope))
            }
            WalkOrigin::Position(id) => {
                position_subtree(&all_positions, position_roots, Some(id), None)
            }
        };

        let mut owners: HashSet<&str> = positions.iter().map(|p| p.id.as_str()).collect();
        if let WalkOrigin::Position(id) = origin {
            owners.insert(id);
        }
        let assignments = self
            .assignments
            .all()
            .await?
            .into_iter()
            .filter(|a| owners.contains(a.position_id.as_str()))
            .collect();

        Ok(Descendants {
            work_units,
            affairs,
            positions,
            assignments,
        })
    }
}

/// The entity a cascade walk starts from.
#[derive(Debug, Clone, Copy)]
pub(crate) enum WalkOrigin<'a> {
    /// A directorate, work unit or affair
    Unit(&'a str),
    /// A position; its own assignments belong to the walk
    Position(&'a str),
}

/// Everything below one entity.
#[derive(Debug, Default)]
pub struct Descendants {
    pub work_units: Vec<WorkUnit>,
    pub affairs: Vec<Affair>,
    /// Parents before their sub-positions
    pub positions: Vec<Position>,
    pub assignments: Vec<PositionAssignment>,
}

impl Descendants {
    pub fn counts(&self) -> DescendantCounts {
        DescendantCounts::new(
            self.work_units.len(),
            self.affairs.len(),
            self.positions.len(),
            self.assignments.len(),
        )
    }
}

/// Breadth-first walk over `parent_position_id`, roots first, each position
/// once even if references form a cycle. `origin` is never part of its own
/// subtree. With a `scope`, a report is followed only when it has no
/// attachment or its most specific one lies inside the scope.
fn position_subtree(
    all: &[Position],
    roots: Vec<Position>,
    origin: Option<&str>,
    scope: Option<&HashSet<&str>>,
) -> Vec<Position> {
    let mut seen: HashSet<String> = roots.iter().map(|p| p.id.clone()).collect();
    seen.extend(origin.map(str::to_string));
    let mut ordered: Vec<Position> = roots
        .into_iter()
        .filter(|p| Some(p.id.as_str()) != origin)
        .collect();
    let mut cursor = 0;

    while cursor < ordered.len() {
        let parent_id = ordered[cursor].id.clone();
        for child in all {
            if child.parent_position_id.as_deref() == Some(parent_id.as_str())
                && scope.map_or(true, |scope| within(child, scope))
                && seen.insert(child.id.clone())
            {
                ordered.push(child.clone());
            }
        }
        cursor += 1;
    }
    ordered
}

/// Whether the most specific attachment of `position` lies in `scope`.
fn within(position: &Position, scope: &HashSet<&str>) -> bool {
    let (directorate, work_unit, affair) = position.attachment();
    affair
        .or(work_unit)
        .or(directorate)
        .map_or(true, |id| scope.contains(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MockAuditTrail;
    use crate::repository::MemoryStore;
    use common::AppError;
    use domain::{CreatePosition, UnitInput};

    fn position(id: &str, parent: Option<&str>) -> Position {
        CreatePosition {
            name: id.to_string(),
            parent_position_id: parent.map(str::to_string),
            ..Default::default()
        }
        .into_entity(id.to_string(), format!("POS-{}", id), "t")
    }

    #[test]
    fn test_subtree_follows_parent_links() {
        let all = vec![
            position("a", None),
            position("b", Some("a")),
            position("c", Some("b")),
            position("d", None),
        ];
        let ids: Vec<_> = position_subtree(&all, vec![all[0].clone()], None, None)
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn test_subtree_survives_cycles() {
        let all = vec![position("a", Some("b")), position("b", Some("a"))];
        let subtree = position_subtree(&all, vec![all[0].clone()], None, None);
        assert_eq!(subtree.len(), 2);
    }

    #[test]
    fn test_subtree_never_contains_origin() {
        // a -> b -> a: walking below a reaches b only
        let all = vec![position("a", Some("b")), position("b", Some("a"))];
        let ids: Vec<_> = position_subtree(&all, vec![all[1].clone()], Some("a"), None)
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, ["b"]);
    }

    #[test]
    fn test_scoped_subtree_skips_reports_attached_elsewhere() {
        let mut outside = position("c", Some("a"));
        outside.directorate_id = Some("d2".to_string());
        let mut inside = position("b", Some("a"));
        inside.directorate_id = Some("d1".to_string());
        inside.work_unit_id = Some("w1".to_string());
        let all = vec![
            position("a", None),
            inside,
            outside,
            position("e", Some("c")),
        ];

        let scope: HashSet<&str> = ["d1", "w1"].into_iter().collect();
        let ids: Vec<_> = position_subtree(&all, vec![all[0].clone()], None, Some(&scope))
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[tokio::test]
    async fn test_log_swallows_audit_failure() {
        let mut audit = MockAuditTrail::new();
        audit
            .expect_record()
            .withf(|entry| entry.entity_id == "dir-1" && entry.action == AuditAction::Update)
            .times(1)
            .returning(|_| Err(AppError::store("audit unavailable")));

        let tables = OrgTables::with_audit(Arc::new(MemoryStore::new()), Arc::new(audit));
        tables
            .log("admin", AuditAction::Update, EntityKind::Directorate, "dir-1", "Renamed")
            .await;
    }
}
