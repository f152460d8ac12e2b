//! Table-oriented record store.
//!
//! Every entity type lives in one flat table with a fixed header. The store
//! knows nothing about references between tables: referential checks are
//! made by the models.

use async_trait::async_trait;
use serde_json::{Map, Value};

use common::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// One stored row: field name to JSON value.
pub type Row = Map<String, Value>;

/// The closed set of tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Directorates,
    WorkUnits,
    Affairs,
    Positions,
    PositionAssignments,
    AuditLogs,
}

impl Table {
    pub const ALL: [Table; 6] = [
        Table::Directorates,
        Table::WorkUnits,
        Table::Affairs,
        Table::Positions,
        Table::PositionAssignments,
        Table::AuditLogs,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Directorates => "directorates",
            Table::WorkUnits => "work_units",
            Table::Affairs => "affairs",
            Table::Positions => "positions",
            Table::PositionAssignments => "position_assignments",
            Table::AuditLogs => "audit_logs",
        }
    }

    /// Header row of the table.
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            Table::Directorates => &[
                "id",
                "code",
                "name",
                "description",
                "director_position_id",
                "active_from",
                "active_until",
                "is_active",
                "sort_order",
                "notes",
                "created_at",
                "created_by",
                "updated_at",
                "updated_by",
            ],
            Table::WorkUnits => &[
                "id",
                "code",
                "name",
                "description",
                "directorate_id",
                "deputy_position_id",
                "active_from",
                "active_until",
                "is_active",
                "sort_order",
                "notes",
                "created_at",
                "created_by",
                "updated_at",
                "updated_by",
            ],
            Table::Affairs => &[
                "id",
                "code",
                "name",
                "description",
                "work_unit_id",
                "assistant_deputy_position_id",
                "active_from",
                "active_until",
                "is_active",
                "sort_order",
                "notes",
                "created_at",
                "created_by",
                "updated_at",
                "updated_by",
            ],
            Table::Positions => &[
                "id",
                "code",
                "name",
                "position_type",
                "level",
                "parent_position_id",
                "directorate_id",
                "work_unit_id",
                "affair_id",
                "description",
                "responsibilities",
                "active_from",
                "active_until",
                "is_active",
                "sort_order",
                "notes",
                "created_at",
                "created_by",
                "updated_at",
                "updated_by",
            ],
            Table::PositionAssignments => &[
                "id",
                "user_id",
                "position_id",
                "start_date",
                "end_date",
                "is_primary",
                "status",
                "assignment_letter",
                "notes",
                "created_at",
                "created_by",
                "updated_at",
                "updated_by",
            ],
            Table::AuditLogs => &[
                "id",
                "timestamp",
                "actor_id",
                "action",
                "entity_type",
                "entity_id",
                "description",
            ],
        }
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields().contains(&field)
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Record store trait for dependency injection.
///
/// `update` and `delete` act on the first row whose `key_field` equals
/// `key_value` and return `Ok(false)` when no row matches. Naming a field the
/// table does not have is a store failure.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All rows of the table in insertion order
    async fn get_all(&self, table: Table) -> AppResult<Vec<Row>>;

    /// Append a row, projected onto the table header
    async fn insert(&self, table: Table, row: Row) -> AppResult<bool>;

    /// Overwrite the named fields of the first matching row
    async fn update(&self, table: Table, key_field: &str, key_value: &str, patch: Row)
        -> AppResult<bool>;

    /// Remove the first matching row
    async fn delete(&self, table: Table, key_field: &str, key_value: &str) -> AppResult<bool>;
}

/// Fail on any field missing from the table header.
pub(crate) fn ensure_fields<'a, I>(table: Table, fields: I) -> AppResult<()>
where
    I: IntoIterator<Item = &'a str>,
{
    for field in fields {
        if !table.has_field(field) {
            return Err(AppError::store(format!(
                "table {} has no column {}",
                table, field
            )));
        }
    }
    Ok(())
}

/// Keep the header fields only, filling gaps with null.
pub(crate) fn project(table: Table, mut row: Row) -> Row {
    table
        .fields()
        .iter()
        .map(|field| {
            let value = row.remove(*field).unwrap_or(Value::Null);
            (field.to_string(), value)
        })
        .collect()
}

pub(crate) fn key_matches(row: &Row, key_field: &str, key_value: &str) -> bool {
    row.get(key_field).and_then(Value::as_str) == Some(key_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_project_fills_and_drops() {
        let row = json!({"id": "a", "code": "DIR-001", "bogus": 1});
        let projected = project(Table::Directorates, row.as_object().cloned().unwrap());
        assert_eq!(projected.len(), Table::Directorates.fields().len());
        assert_eq!(projected["code"], "DIR-001");
        assert_eq!(projected["notes"], Value::Null);
        assert!(!projected.contains_key("bogus"));
    }

    #[test]
    fn test_unknown_field_is_store_error() {
        let err = ensure_fields(Table::Affairs, ["name", "colour"]).unwrap_err();
        assert_eq!(err.code(), "INTERNAL_ERROR");
        assert!(err.detail().unwrap().contains("colour"));
    }
}
