//! Generic record row for SeaORM.
//!
//! All logical tables share one physical table; `table_name` says which one a
//! row belongs to and `data` holds the row itself.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "records")]
pub struct Model {
    /// Serial key, gives the insertion order
    #[sea_orm(primary_key)]
    pub id: i64,
    pub table_name: String,
    pub data: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
