//! Parsing `resource.verb` actions into a closed request type.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use common::{AppError, AppResult};
use domain::{
    AuditQuery, CreateAffair, CreateAssignment, CreateDirectorate, CreatePosition, CreateWorkUnit,
    ListFilter, Module, Permission, Verb,
};
use org_service_lib::model::AssignmentFilter;
use org_service_lib::repository::Row;

/// Action on one hierarchy level; `I` is the level's creation payload.
#[derive(Debug)]
pub enum UnitAction<I> {
    List(ListFilter),
    Get { id: String },
    Create(I),
    Update { id: String, patch: Row },
    Delete { id: String },
    DeleteCascade { id: String },
    ReassignDelete { id: String, new_parent_id: String },
    CheckChildren { id: String },
    GetAlternatives { id: String },
    GenerateCode,
}

impl<I: DeserializeOwned> UnitAction<I> {
    fn parse(verb: &str, data: Value) -> Option<AppResult<Self>> {
        let action = match verb {
            "list" => decode(data).map(UnitAction::List),
            "get" => take_id(data).map(|(id, _)| UnitAction::Get { id }),
            "create" => decode(data).map(UnitAction::Create),
            "update" => take_id(data).map(|(id, patch)| UnitAction::Update { id, patch }),
            "delete" => take_id(data).map(|(id, _)| UnitAction::Delete { id }),
            "delete-cascade" => take_id(data).map(|(id, _)| UnitAction::DeleteCascade { id }),
            "reassign-delete" => take_id(data).and_then(|(id, rest)| {
                let new_parent_id = string_field(&rest, &["new_parent_id", "newParentId"])
                    .ok_or_else(|| {
                        AppError::validation("new_parent_id", "Replacement is required")
                    })?;
                Ok(UnitAction::ReassignDelete { id, new_parent_id })
            }),
            "check-children" => take_id(data).map(|(id, _)| UnitAction::CheckChildren { id }),
            "get-alternatives" => {
                take_id(data).map(|(id, _)| UnitAction::GetAlternatives { id })
            }
            "generate-code" => Ok(UnitAction::GenerateCode),
            _ => return None,
        };
        Some(action)
    }

}

/// Permission verb of a hierarchy action name.
fn unit_verb(verb: &str) -> Option<Verb> {
    match verb {
        "list" | "get" | "check-children" | "get-alternatives" => Some(Verb::View),
        "create" | "generate-code" => Some(Verb::Create),
        "update" => Some(Verb::Update),
        "delete" | "delete-cascade" | "reassign-delete" => Some(Verb::Delete),
        _ => None,
    }
}

#[derive(Debug)]
pub enum AssignmentAction {
    List(AssignmentFilter),
    Get { id: String },
    Create(CreateAssignment),
    Update { id: String, patch: Row },
    End { id: String, end_date: Option<chrono::DateTime<chrono::Utc>> },
    Delete { id: String },
}

impl AssignmentAction {
    fn parse(verb: &str, data: Value) -> Option<AppResult<Self>> {
        let action = match verb {
            "list" => decode(data).map(AssignmentAction::List),
            "get" => take_id(data).map(|(id, _)| AssignmentAction::Get { id }),
            "create" => decode(data).map(AssignmentAction::Create),
            "update" => take_id(data).map(|(id, patch)| AssignmentAction::Update { id, patch }),
            "end" => take_id(data).and_then(|(id, rest)| {
                let end_date = match rest.get("end_date").or_else(|| rest.get("endDate")) {
                    None | Some(Value::Null) => None,
                    Some(value) => Some(serde_json::from_value(value.clone()).map_err(|_| {
                        AppError::validation("end_date", "End date must be an RFC 3339 timestamp")
                    })?),
                };
                Ok(AssignmentAction::End { id, end_date })
            }),
            "delete" => take_id(data).map(|(id, _)| AssignmentAction::Delete { id }),
            _ => return None,
        };
        Some(action)
    }

}

fn assignment_verb(verb: &str) -> Option<Verb> {
    match verb {
        "list" | "get" => Some(Verb::View),
        "create" => Some(Verb::Create),
        "update" | "end" => Some(Verb::Update),
        "delete" => Some(Verb::Delete),
        _ => None,
    }
}

/// Every operation the dispatcher can run.
#[derive(Debug)]
pub enum Request {
    Directorates(UnitAction<CreateDirectorate>),
    WorkUnits(UnitAction<CreateWorkUnit>),
    Affairs(UnitAction<CreateAffair>),
    Positions(UnitAction<CreatePosition>),
    Assignments(AssignmentAction),
    AuditLogs(AuditQuery),
    Summary,
    Orphans,
}

impl Request {
    /// Split `resource.verb` or `resource/verb`.
    pub fn split_action(action: &str) -> Option<(&str, &str)> {
        action
            .trim()
            .split_once(['.', '/'])
            .filter(|(resource, verb)| !resource.is_empty() && !verb.is_empty())
    }

    /// The `(module, verb)` pair a session needs to run `resource.verb`,
    /// resolved from the names alone. Unknown pairs are `UnknownAction`.
    pub fn route(resource: &str, verb: &str) -> AppResult<Permission> {
        let found = match resource {
            "directorates" => unit_verb(verb).map(|v| (Module::Directorates, v)),
            "work-units" => unit_verb(verb).map(|v| (Module::WorkUnits, v)),
            "affairs" => unit_verb(verb).map(|v| (Module::Affairs, v)),
            "positions" => unit_verb(verb).map(|v| (Module::Positions, v)),
            "assignments" => assignment_verb(verb).map(|v| (Module::Assignments, v)),
            "audit-logs" => (verb == "list").then_some((Module::AuditLogs, Verb::View)),
            "organization" => matches!(verb, "summary" | "orphans")
                .then_some((Module::Organization, Verb::View)),
            _ => None,
        };

        found
            .map(|(module, verb)| Permission::new(module, verb))
            .ok_or_else(|| unknown_action(resource, verb))
    }

    /// Unknown resource or verb is `UnknownAction`; malformed data for a
    /// known one is a validation or bad request failure.
    pub fn parse(resource: &str, verb: &str, data: Value) -> AppResult<Self> {
        let parsed = match resource {
            "directorates" => UnitAction::parse(verb, data).map(|a| a.map(Request::Directorates)),
            "work-units" => UnitAction::parse(verb, data).map(|a| a.map(Request::WorkUnits)),
            "affairs" => UnitAction::parse(verb, data).map(|a| a.map(Request::Affairs)),
            "positions" => UnitAction::parse(verb, data).map(|a| a.map(Request::Positions)),
            "assignments" => {
                AssignmentAction::parse(verb, data).map(|a| a.map(Request::Assignments))
            }
            "audit-logs" if verb == "list" => Some(decode(data).map(Request::AuditLogs)),
            "organization" => match verb {
                "summary" => Some(Ok(Request::Summary)),
                "orphans" => Some(Ok(Request::Orphans)),
                _ => None,
            },
            _ => None,
        };

        parsed.unwrap_or_else(|| Err(unknown_action(resource, verb)))
    }
}

fn unknown_action(resource: &str, verb: &str) -> AppError {
    AppError::UnknownAction(format!("{}.{}", resource, verb))
}

/// Decode a payload; a missing payload decodes from `{}`.
fn decode<T: DeserializeOwned>(data: Value) -> AppResult<T> {
    let data = match data {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };
    serde_json::from_value(data).map_err(|e| AppError::bad_request(e.to_string()))
}

/// Split the `id` off an object payload; the rest is returned as-is.
fn take_id(data: Value) -> AppResult<(String, Row)> {
    let mut row = match data {
        Value::Object(row) => row,
        Value::String(id) => {
            let mut row = Row::new();
            row.insert("id".to_string(), Value::String(id));
            row
        }
        _ => return Err(AppError::validation("id", "Id is required")),
    };

    match row.remove("id") {
        Some(Value::String(id)) if !id.trim().is_empty() => Ok((id.trim().to_string(), row)),
        _ => Err(AppError::validation("id", "Id is required")),
    }
}

fn string_field(row: &Row, names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| row.get(*name).and_then(Value::as_str))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_action() {
        assert_eq!(Request::split_action("directorates.list"), Some(("directorates", "list")));
        assert_eq!(
            Request::split_action("work-units/delete-cascade"),
            Some(("work-units", "delete-cascade"))
        );
        assert_eq!(Request::split_action("directorates"), None);
        assert_eq!(Request::split_action(".list"), None);
    }

    #[test]
    fn test_unknown_resource_and_verb() {
        let err = Request::parse("budgets", "list", Value::Null).unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_ACTION");
        assert_eq!(err.user_message(), "Unknown action: budgets.list");

        let err = Request::parse("assignments", "delete-cascade", Value::Null).unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_ACTION");
    }

    #[test]
    fn test_update_splits_id_from_patch() {
        let request = Request::parse(
            "affairs",
            "update",
            json!({"id": "aff-1", "name": "Fleet", "sort_order": 2}),
        )
        .unwrap();

        match request {
            Request::Affairs(UnitAction::Update { id, patch }) => {
                assert_eq!(id, "aff-1");
                assert_eq!(patch.len(), 2);
                assert!(!patch.contains_key("id"));
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn test_missing_id_is_validation_failure() {
        let err = Request::parse("positions", "get", json!({})).unwrap_err();
        assert!(err.field_errors().unwrap().contains_key("id"));
    }

    #[test]
    fn test_reassign_accepts_camel_case_parent() {
        let request = Request::parse(
            "work-units",
            "reassign-delete",
            json!({"id": "wu-1", "newParentId": "wu-2"}),
        )
        .unwrap();
        assert!(matches!(
            request,
            Request::WorkUnits(UnitAction::ReassignDelete { ref new_parent_id, .. })
                if new_parent_id == "wu-2"
        ));
    }

    #[test]
    fn test_route_permission_per_verb() {
        assert_eq!(
            Request::route("directorates", "delete-cascade").unwrap(),
            Permission::new(Module::Directorates, Verb::Delete)
        );
        assert_eq!(
            Request::route("positions", "generate-code").unwrap(),
            Permission::new(Module::Positions, Verb::Create)
        );
        assert_eq!(
            Request::route("assignments", "end").unwrap(),
            Permission::new(Module::Assignments, Verb::Update)
        );
        assert_eq!(
            Request::route("organization", "summary").unwrap(),
            Permission::new(Module::Organization, Verb::View)
        );
    }

    #[test]
    fn test_route_rejects_unknown_pairs() {
        for (resource, verb) in [
            ("budgets", "list"),
            ("assignments", "delete-cascade"),
            ("audit-logs", "delete"),
            ("organization", "reset"),
        ] {
            let err = Request::route(resource, verb).unwrap_err();
            assert_eq!(err.code(), "UNKNOWN_ACTION");
        }
    }

    #[test]
    fn test_bad_create_payload_is_bad_request() {
        let err = Request::parse("directorates", "create", json!({"name": 12})).unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");
    }
}
