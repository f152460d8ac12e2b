//! Typed access to one table of the record store.

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use common::{AppError, AppResult, OptionExt};
use domain::{
    Affair, Directorate, DomainError, DomainResult, EntityKind, Position, PositionAssignment,
    WorkUnit, PROTECTED_FIELDS,
};

use crate::repository::{RecordStore, Row, Table};

/// An entity stored as one row of a table.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const TABLE: Table;
    const ENTITY: EntityKind;

    fn record_id(&self) -> &str;
}

macro_rules! impl_record {
    ($ty:ty, $table:expr, $kind:expr) => {
        impl Record for $ty {
            const TABLE: Table = $table;
            const ENTITY: EntityKind = $kind;

            fn record_id(&self) -> &str {
                &self.id
            }
        }
    };
}

impl_record!(Directorate, Table::Directorates, EntityKind::Directorate);
impl_record!(WorkUnit, Table::WorkUnits, EntityKind::WorkUnit);
impl_record!(Affair, Table::Affairs, EntityKind::Affair);
impl_record!(Position, Table::Positions, EntityKind::Position);
impl_record!(
    PositionAssignment,
    Table::PositionAssignments,
    EntityKind::PositionAssignment
);

/// Rows of `E::TABLE` decoded as `E`.
pub struct Records<E> {
    store: Arc<dyn RecordStore>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Records<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Record> Records<E> {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    pub async fn all(&self) -> AppResult<Vec<E>> {
        self.store
            .get_all(E::TABLE)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    pub async fn find(&self, id: &str) -> AppResult<Option<E>> {
        Ok(self.all().await?.into_iter().find(|e| e.record_id() == id))
    }

    /// Like [`find`](Self::find) but missing rows are `NotFound`.
    pub async fn get(&self, id: &str) -> AppResult<E> {
        self.find(id).await?.ok_or_not_found(E::ENTITY.label())
    }

    pub async fn insert(&self, entity: &E) -> AppResult<()> {
        if self.store.insert(E::TABLE, encode(entity)?).await? {
            Ok(())
        } else {
            Err(AppError::store(format!("insert into {} was rejected", E::TABLE)))
        }
    }

    /// Write every field of `entity` over its stored row.
    pub async fn save(&self, entity: &E) -> AppResult<()> {
        let mut row = encode(entity)?;
        row.remove("id");
        self.write(entity.record_id(), row).await
    }

    /// Partial update.
    ///
    /// Protected fields are dropped, unknown fields are rejected and the
    /// `updated_*` stamp is refreshed. The merged row must still decode as `E`
    /// and pass `check`.
    pub async fn patch(
        &self,
        id: &str,
        mut patch: Row,
        actor: &str,
        check: fn(&E) -> DomainResult<()>,
    ) -> AppResult<E> {
        for field in PROTECTED_FIELDS {
            patch.remove(*field);
        }
        if let Some(unknown) = patch.keys().find(|k| !E::TABLE.has_field(k)) {
            return Err(AppError::validation(unknown.clone(), "Unknown field"));
        }

        let current = encode(&self.get(id).await?)?;
        stamp(&mut patch, actor);

        let mut merged = current.clone();
        merged.extend(patch.clone());
        let entity = match serde_json::from_value::<E>(Value::Object(merged)) {
            Ok(entity) => entity,
            Err(e) => return Err(offending_field::<E>(&current, &patch, e).into()),
        };
        check(&entity)?;

        self.write(id, patch).await?;
        Ok(entity)
    }

    /// Point one field of a row at a new value, refreshing the stamp.
    pub async fn set_field(&self, id: &str, field: &str, value: Value, actor: &str) -> AppResult<()> {
        let mut patch = Row::new();
        patch.insert(field.to_string(), value);
        stamp(&mut patch, actor);
        self.write(id, patch).await
    }

    /// Delete by id. `false` when the row was already gone.
    pub async fn remove(&self, id: &str) -> AppResult<bool> {
        self.store.delete(E::TABLE, "id", id).await
    }

    async fn write(&self, id: &str, patch: Row) -> AppResult<()> {
        if self.store.update(E::TABLE, "id", id, patch).await? {
            Ok(())
        } else {
            Err(AppError::not_found(E::ENTITY.label()))
        }
    }
}

fn decode<E: Record>(row: Row) -> AppResult<E> {
    serde_json::from_value(Value::Object(row))
        .map_err(|e| AppError::store(format!("malformed row in {}: {}", E::TABLE, e)))
}

fn encode<E: Record>(entity: &E) -> AppResult<Row> {
    match serde_json::to_value(entity)? {
        Value::Object(row) => Ok(row),
        _ => Err(AppError::internal(format!("{} did not encode as a row", E::TABLE))),
    }
}

fn stamp(patch: &mut Row, actor: &str) {
    patch.insert("updated_at".to_string(), Value::String(Utc::now().to_rfc3339()));
    patch.insert("updated_by".to_string(), Value::String(actor.to_string()));
}

/// Find the patched field that breaks decoding, for a per-field message.
fn offending_field<E: Record>(current: &Row, patch: &Row, err: serde_json::Error) -> DomainError {
    for (field, value) in patch {
        let mut probe = current.clone();
        probe.insert(field.clone(), value.clone());
        if serde_json::from_value::<E>(Value::Object(probe)).is_err() {
            return DomainError::field(field.clone(), "Invalid value");
        }
    }
    DomainError::field("data", err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MemoryStore, MockRecordStore};
    use domain::{CreateDirectorate, UnitInput};
    use serde_json::json;

    fn patch(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    async fn seeded() -> Records<Directorate> {
        let records = Records::new(Arc::new(MemoryStore::new()));
        let entity = CreateDirectorate {
            name: "Planning".to_string(),
            ..Default::default()
        }
        .into_entity("d1".to_string(), "DIR-001".to_string(), "alice");
        records.insert(&entity).await.unwrap();
        records
    }

    fn accept(_: &Directorate) -> DomainResult<()> {
        Ok(())
    }

    #[tokio::test]
    async fn test_patch_strips_protected_fields() {
        let records = seeded().await;
        let before = records.get("d1").await.unwrap();

        let updated = records
            .patch(
                "d1",
                patch(json!({"id": "other", "created_by": "mallory", "name": "Strategy"})),
                "bob",
                accept,
            )
            .await
            .unwrap();

        assert_eq!(updated.id, "d1");
        assert_eq!(updated.name, "Strategy");
        assert_eq!(updated.stamp.created_by, "alice");
        assert_eq!(updated.stamp.created_at, before.stamp.created_at);
        assert_eq!(updated.stamp.updated_by, "bob");
        assert!(updated.stamp.updated_at >= before.stamp.updated_at);
    }

    #[tokio::test]
    async fn test_patch_rejects_unknown_field() {
        let records = seeded().await;
        let err = records
            .patch("d1", patch(json!({"colour": "red"})), "bob", accept)
            .await
            .unwrap_err();
        assert!(err.field_errors().unwrap().contains_key("colour"));
    }

    #[tokio::test]
    async fn test_patch_reports_mistyped_field() {
        let records = seeded().await;
        let err = records
            .patch("d1", patch(json!({"sort_order": "first"})), "bob", accept)
            .await
            .unwrap_err();
        assert_eq!(err.field_errors().unwrap()["sort_order"], "Invalid value");
    }

    #[tokio::test]
    async fn test_patch_missing_row_is_not_found() {
        let records = seeded().await;
        let err = records
            .patch("zz", patch(json!({"name": "x"})), "bob", accept)
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Directorate not found");
    }

    #[tokio::test]
    async fn test_rejected_insert_is_store_error() {
        let mut store = MockRecordStore::new();
        store
            .expect_insert()
            .withf(|table, row| *table == Table::Directorates && row.contains_key("code"))
            .times(1)
            .returning(|_, _| Ok(false));

        let records = Records::<Directorate>::new(Arc::new(store));
        let entity = CreateDirectorate {
            name: "Planning".to_string(),
            ..Default::default()
        }
        .into_entity("d1".to_string(), "DIR-001".to_string(), "alice");

        let err = records.insert(&entity).await.unwrap_err();
        assert_eq!(err.code(), "INTERNAL_ERROR");
        assert!(err.detail().unwrap().contains("directorates"));
    }

    #[tokio::test]
    async fn test_malformed_row_is_store_error() {
        let mut store = MockRecordStore::new();
        store
            .expect_get_all()
            .returning(|_| Ok(vec![patch(json!({"id": "d1", "code": 7}))]));

        let records = Records::<Directorate>::new(Arc::new(store));
        let err = records.find("d1").await.unwrap_err();
        assert!(err.detail().unwrap().contains("malformed row"));
    }
}
