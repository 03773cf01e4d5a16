//! Migration to create the resource_fields table.
//!
//! Resource fields carry the immutable source text of a resource; the
//! position column fixes the iteration order used by the orchestrator.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ResourceFields::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ResourceFields::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ResourceFields::ResourceId).uuid().not_null())
                    .col(ColumnDef::new(ResourceFields::FieldName).text().not_null())
                    .col(
                        ColumnDef::new(ResourceFields::OriginalValue)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ResourceFields::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ResourceFields::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_resource_fields_resource_id")
                            .from(ResourceFields::Table, ResourceFields::ResourceId)
                            .to(Resources::Table, Resources::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_resource_fields_resource_position")
                    .table(ResourceFields::Table)
                    .col(ResourceFields::ResourceId)
                    .col(ResourceFields::Position)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_resource_fields_resource_position")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(ResourceFields::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ResourceFields {
    Table,
    Id,
    ResourceId,
    FieldName,
    OriginalValue,
    Position,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Resources {
    Table,
    Id,
}
