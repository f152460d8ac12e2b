//! Summary, orphan scan, audit log and failure handling.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use common::{AppError, AppResult};
use domain::{
    AuditAction, AuditEntry, AuditQuery, CreateAffair, CreateAssignment, CreateDirectorate,
    CreatePosition, CreateWorkUnit, EntityKind,
};
use org_service_lib::model::AuditTrail;
use org_service_lib::repository::{MemoryStore, RecordStore, Row, Table};
use org_service_lib::OrgServices;

const ACTOR: &str = "admin-1";

/// Audit trail that refuses every write.
struct BrokenAuditTrail;

#[async_trait]
impl AuditTrail for BrokenAuditTrail {
    async fn record(&self, _entry: AuditEntry) -> AppResult<()> {
        Err(AppError::store("audit sheet is read-only"))
    }

    async fn list(&self, _query: AuditQuery) -> AppResult<Vec<AuditEntry>> {
        Err(AppError::store("audit sheet is read-only"))
    }
}

/// Store whose every call fails.
struct UnreachableStore;

#[async_trait]
impl RecordStore for UnreachableStore {
    async fn get_all(&self, table: Table) -> AppResult<Vec<Row>> {
        Err(AppError::store(format!("cannot reach {}", table)))
    }

    async fn insert(&self, table: Table, _row: Row) -> AppResult<bool> {
        Err(AppError::store(format!("cannot reach {}", table)))
    }

    async fn update(&self, table: Table, _: &str, _: &str, _: Row) -> AppResult<bool> {
        Err(AppError::store(format!("cannot reach {}", table)))
    }

    async fn delete(&self, table: Table, _: &str, _: &str) -> AppResult<bool> {
        Err(AppError::store(format!("cannot reach {}", table)))
    }
}

fn services() -> OrgServices {
    OrgServices::new(Arc::new(MemoryStore::new()))
}

async fn seed_chain(services: &OrgServices) -> (String, String, String) {
    let d = services
        .directorates
        .create(
            CreateDirectorate {
                name: "Operations".to_string(),
                ..Default::default()
            },
            ACTOR,
        )
        .await
        .unwrap()
        .id;
    let w = services
        .work_units
        .create(
            CreateWorkUnit {
                name: "Logistics".to_string(),
                directorate_id: d.clone(),
                ..Default::default()
            },
            ACTOR,
        )
        .await
        .unwrap()
        .id;
    let a = services
        .affairs
        .create(
            CreateAffair {
                name: "Fleet".to_string(),
                work_unit_id: w.clone(),
                ..Default::default()
            },
            ACTOR,
        )
        .await
        .unwrap()
        .id;
    (d, w, a)
}

#[tokio::test]
async fn test_summary_counts_effective_rows_and_vacancies() {
    let services = services();
    let (_, _, a) = seed_chain(&services).await;

    let held = services
        .positions
        .create(
            CreatePosition {
                name: "Fleet lead".to_string(),
                affair_id: Some(a.clone()),
                ..Default::default()
            },
            ACTOR,
        )
        .await
        .unwrap();
    services
        .positions
        .create(
            CreatePosition {
                name: "Driver".to_string(),
                affair_id: Some(a.clone()),
                ..Default::default()
            },
            ACTOR,
        )
        .await
        .unwrap();
    services
        .positions
        .create(
            CreatePosition {
                name: "Retired role".to_string(),
                active_from: Some(Utc::now() - Duration::days(30)),
                active_until: Some(Utc::now() - Duration::days(1)),
                ..Default::default()
            },
            ACTOR,
        )
        .await
        .unwrap();
    services
        .assignments
        .create(
            CreateAssignment {
                user_id: "u1".to_string(),
                position_id: held.id.clone(),
                ..Default::default()
            },
            ACTOR,
        )
        .await
        .unwrap();

    let summary = services.organization.summary().await.unwrap();
    assert_eq!(summary.directorates, 1);
    assert_eq!(summary.work_units, 1);
    assert_eq!(summary.affairs, 1);
    assert_eq!(summary.positions, 2);
    assert_eq!(summary.active_assignments, 1);
    assert_eq!(summary.vacant_positions, 1);

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["workUnits"], 1);
    assert_eq!(json["vacantPositions"], 1);
}

#[tokio::test]
async fn test_orphans_report_dangling_references() {
    let services = services();
    let (d, w, _) = seed_chain(&services).await;
    assert!(services.organization.orphans().await.unwrap().is_empty());

    services
        .directorates
        .reassign_delete(&d, "gone", ACTOR)
        .await
        .unwrap();

    let orphans = services.organization.orphans().await.unwrap();
    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0].entity_type, EntityKind::WorkUnit);
    assert_eq!(orphans[0].entity_id, w);
    assert_eq!(orphans[0].field, "directorate_id");
    assert_eq!(orphans[0].missing_id, "gone");
}

#[tokio::test]
async fn test_audit_log_newest_first_with_filters() {
    let services = services();
    let (d, _, _) = seed_chain(&services).await;
    services
        .directorates
        .update(
            &d,
            serde_json::json!({"notes": "restructured"})
                .as_object()
                .cloned()
                .unwrap(),
            "editor",
        )
        .await
        .unwrap();

    let all = services
        .organization
        .audit_log(AuditQuery::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 4);
    assert_eq!(all[0].action, AuditAction::Update);
    assert_eq!(all[0].actor_id, "editor");
    assert_eq!(all[3].entity_type, EntityKind::Directorate);
    assert_eq!(all[3].action, AuditAction::Create);

    let for_directorate = AuditQuery {
        entity_id: Some(d.clone()),
        ..Default::default()
    };
    assert_eq!(services.organization.audit_log(for_directorate).await.unwrap().len(), 2);

    let limited = AuditQuery {
        limit: Some(1),
        ..Default::default()
    };
    assert_eq!(services.organization.audit_log(limited).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_audit_failure_does_not_fail_mutation() {
    let store = Arc::new(MemoryStore::new());
    let services = OrgServices::with_audit(store.clone(), Arc::new(BrokenAuditTrail));

    let created = services
        .directorates
        .create(
            CreateDirectorate {
                name: "Resilient".to_string(),
                ..Default::default()
            },
            ACTOR,
        )
        .await
        .unwrap();
    assert_eq!(store.get_all(Table::Directorates).await.unwrap().len(), 1);

    services.directorates.delete(&created.id, ACTOR).await.unwrap();
    assert!(store.get_all(Table::Directorates).await.unwrap().is_empty());
    assert!(store.get_all(Table::AuditLogs).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_store_failure_surfaces_as_internal_error() {
    let services = OrgServices::new(Arc::new(UnreachableStore));

    let err = services
        .directorates
        .create(
            CreateDirectorate {
                name: "Unreachable".to_string(),
                ..Default::default()
            },
            ACTOR,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INTERNAL_ERROR");
    assert_eq!(err.user_message(), "An internal error occurred");
    assert!(err.detail().unwrap().contains("directorates"));

    let summary = services.organization.summary().await.unwrap_err();
    assert_eq!(summary.code(), "INTERNAL_ERROR");
}
