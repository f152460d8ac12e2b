//! PostgreSQL-backed record store.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set,
};
use serde_json::Value;

use common::{AppError, AppResult};

use super::entities::record::{self, ActiveModel, Entity as RecordEntity};
use super::record_store::{ensure_fields, key_matches, project, RecordStore, Row, Table};

/// Concrete implementation of RecordStore over the `records` table
pub struct SqlStore {
    db: DatabaseConnection,
}

impl SqlStore {
    /// Create new store instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn models(&self, table: Table) -> AppResult<Vec<record::Model>> {
        let models = RecordEntity::find()
            .filter(record::Column::TableName.eq(table.name()))
            .order_by_asc(record::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models)
    }

    async fn first_match(
        &self,
        table: Table,
        key_field: &str,
        key_value: &str,
    ) -> AppResult<Option<(record::Model, Row)>> {
        for model in self.models(table).await? {
            let row = into_row(table, &model)?;
            if key_matches(&row, key_field, key_value) {
                return Ok(Some((model, row)));
            }
        }
        Ok(None)
    }
}

fn into_row(table: Table, model: &record::Model) -> AppResult<Row> {
    match &model.data {
        Value::Object(row) => Ok(row.clone()),
        other => Err(AppError::store(format!(
            "record {} in {} is not an object: {}",
            model.id, table, other
        ))),
    }
}

#[async_trait]
impl RecordStore for SqlStore {
    async fn get_all(&self, table: Table) -> AppResult<Vec<Row>> {
        self.models(table)
            .await?
            .iter()
            .map(|model| into_row(table, model))
            .collect()
    }

    async fn insert(&self, table: Table, row: Row) -> AppResult<bool> {
        let active_model = ActiveModel {
            id: NotSet,
            table_name: Set(table.name().to_string()),
            data: Set(Value::Object(project(table, row))),
        };

        active_model.insert(&self.db).await?;
        Ok(true)
    }

    async fn update(
        &self,
        table: Table,
        key_field: &str,
        key_value: &str,
        patch: Row,
    ) -> AppResult<bool> {
        ensure_fields(table, std::iter::once(key_field).chain(patch.keys().map(String::as_str)))?;

        let Some((model, mut row)) = self.first_match(table, key_field, key_value).await? else {
            return Ok(false);
        };

        row.extend(patch);
        let mut active: ActiveModel = model.into();
        active.data = Set(Value::Object(row));
        active.update(&self.db).await?;

        Ok(true)
    }

    async fn delete(&self, table: Table, key_field: &str, key_value: &str) -> AppResult<bool> {
        ensure_fields(table, [key_field])?;

        let Some((model, _)) = self.first_match(table, key_field, key_value).await? else {
            return Ok(false);
        };

        let result = RecordEntity::delete_by_id(model.id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}
