//! Position assignment service tests.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;

use domain::{AssignmentStatus, CreateAssignment, CreatePosition};
use org_service_lib::model::AssignmentFilter;
use org_service_lib::repository::{MemoryStore, Row};
use org_service_lib::OrgServices;

const ACTOR: &str = "admin-1";

fn services() -> OrgServices {
    OrgServices::new(Arc::new(MemoryStore::new()))
}

async fn position(services: &OrgServices, name: &str) -> String {
    let input = CreatePosition {
        name: name.to_string(),
        ..Default::default()
    };
    services.positions.create(input, ACTOR).await.unwrap().id
}

fn assign(user_id: &str, position_id: &str) -> CreateAssignment {
    CreateAssignment {
        user_id: user_id.to_string(),
        position_id: position_id.to_string(),
        ..Default::default()
    }
}

fn row(value: serde_json::Value) -> Row {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
async fn test_create_defaults_to_active() {
    let services = services();
    let p = position(&services, "Analyst").await;

    let created = services.assignments.create(assign("u1", &p), ACTOR).await.unwrap();
    assert_eq!(created.status, AssignmentStatus::Active);
    assert!(!created.is_primary);
    assert!(created.end_date.is_none());

    let found = services.assignments.get(&created.id).await.unwrap();
    assert_eq!(found, created);
}

#[tokio::test]
async fn test_create_requires_existing_position() {
    let services = services();
    let err = services
        .assignments
        .create(assign("u1", "ghost"), ACTOR)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");
    assert_eq!(err.field_errors().unwrap()["position_id"], "Position not found");
}

#[tokio::test]
async fn test_create_rejects_missing_user_and_inverted_dates() {
    let services = services();
    let p = position(&services, "Analyst").await;

    let missing_user = services.assignments.create(assign("", &p), ACTOR).await.unwrap_err();
    assert!(missing_user.field_errors().unwrap().contains_key("user_id"));

    let now = Utc::now();
    let inverted = CreateAssignment {
        start_date: Some(now),
        end_date: Some(now - Duration::days(1)),
        ..assign("u1", &p)
    };
    let err = services.assignments.create(inverted, ACTOR).await.unwrap_err();
    assert!(err.field_errors().unwrap().contains_key("end_date"));
}

#[tokio::test]
async fn test_end_closes_assignment_once() {
    let services = services();
    let p = position(&services, "Analyst").await;
    let a = services.assignments.create(assign("u1", &p), ACTOR).await.unwrap();

    let ended = services.assignments.end(&a.id, None, "hr-1").await.unwrap();
    assert_eq!(ended.status, AssignmentStatus::Ended);
    assert!(ended.end_date.is_some());
    assert_eq!(ended.stamp.updated_by, "hr-1");
    assert_eq!(ended.stamp.created_by, ACTOR);

    let again = services.assignments.end(&a.id, None, "hr-1").await.unwrap_err();
    assert_eq!(again.code(), "BLOCKED");
}

#[tokio::test]
async fn test_ended_assignment_no_longer_blocks_position_delete() {
    let services = services();
    let p = position(&services, "Analyst").await;
    let a = services.assignments.create(assign("u1", &p), ACTOR).await.unwrap();

    assert!(services.positions.delete(&p, ACTOR).await.is_err());
    services.assignments.end(&a.id, None, ACTOR).await.unwrap();
    assert!(services.positions.delete(&p, ACTOR).await.is_ok());
}

#[tokio::test]
async fn test_update_refuses_status_changes() {
    let services = services();
    let p = position(&services, "Analyst").await;
    let a = services.assignments.create(assign("u1", &p), ACTOR).await.unwrap();

    let err = services
        .assignments
        .update(&a.id, row(json!({"status": "ENDED"})), ACTOR)
        .await
        .unwrap_err();
    assert!(err.field_errors().unwrap().contains_key("status"));

    let updated = services
        .assignments
        .update(&a.id, row(json!({"is_primary": true, "notes": "acting"})), ACTOR)
        .await
        .unwrap();
    assert!(updated.is_primary);
    assert_eq!(updated.notes, "acting");
    assert_eq!(updated.status, AssignmentStatus::Active);
}

#[tokio::test]
async fn test_list_filters_and_names_position() {
    let services = services();
    let p1 = position(&services, "Analyst").await;
    let p2 = position(&services, "Planner").await;
    services.assignments.create(assign("u1", &p1), ACTOR).await.unwrap();
    let ended = services.assignments.create(assign("u2", &p1), ACTOR).await.unwrap();
    services.assignments.create(assign("u1", &p2), ACTOR).await.unwrap();
    services.assignments.end(&ended.id, None, ACTOR).await.unwrap();

    let active_on_p1 = AssignmentFilter {
        position_id: Some(p1.clone()),
        status: Some(AssignmentStatus::Active),
        ..Default::default()
    };
    let listed = services.assignments.list(active_on_p1).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].item.user_id, "u1");
    assert_eq!(listed[0].names["position_name"], "POS-001 - Analyst");

    let for_user = AssignmentFilter {
        user_id: Some("u1".to_string()),
        ..Default::default()
    };
    assert_eq!(services.assignments.list(for_user).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_delete_removes_row() {
    let services = services();
    let p = position(&services, "Analyst").await;
    let a = services.assignments.create(assign("u1", &p), ACTOR).await.unwrap();

    services.assignments.delete(&a.id, ACTOR).await.unwrap();
    let err = services.assignments.get(&a.id).await.unwrap_err();
    assert_eq!(err.user_message(), "Position assignment not found");
}
