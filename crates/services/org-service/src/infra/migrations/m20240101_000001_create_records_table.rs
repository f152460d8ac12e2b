//! Migration: Create the generic records table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Records::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Records::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Records::TableName).string_len(64).not_null())
                    .col(ColumnDef::new(Records::Data).json_binary().not_null())
                    .to_owned(),
            )
            .await?;

        // Every read filters on the logical table
        manager
            .create_index(
                Index::create()
                    .name("idx_records_table_name")
                    .table(Records::Table)
                    .col(Records::TableName)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Records::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Records {
    Table,
    Id,
    TableName,
    Data,
}
