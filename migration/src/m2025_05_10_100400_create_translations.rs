//! Migration to create the translations table.
//!
//! One row per (resource, field, language) cell, enforced by a unique index;
//! the orchestrator upserts against that natural key.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Translations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Translations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Translations::ResourceId).uuid().not_null())
                    .col(ColumnDef::new(Translations::FieldId).uuid().not_null())
                    .col(ColumnDef::new(Translations::LanguageId).uuid().not_null())
                    .col(
                        ColumnDef::new(Translations::TranslatedValue)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Translations::Status)
                            .text()
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(ColumnDef::new(Translations::Engine).text().not_null())
                    .col(
                        ColumnDef::new(Translations::TokensUsed)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Translations::IsManualEdit)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Translations::NeedsReview)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Translations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Translations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_translations_resource_id")
                            .from(Translations::Table, Translations::ResourceId)
                            .to(Resources::Table, Resources::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_translations_field_id")
                            .from(Translations::Table, Translations::FieldId)
                            .to(ResourceFields::Table, ResourceFields::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_translations_language_id")
                            .from(Translations::Table, Translations::LanguageId)
                            .to(Languages::Table, Languages::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Natural key for cell upserts
        manager
            .create_index(
                Index::create()
                    .name("idx_translations_resource_field_language")
                    .table(Translations::Table)
                    .col(Translations::ResourceId)
                    .col(Translations::FieldId)
                    .col(Translations::LanguageId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Rollup queries count COMPLETED rows per resource
        manager
            .create_index(
                Index::create()
                    .name("idx_translations_resource_status")
                    .table(Translations::Table)
                    .col(Translations::ResourceId)
                    .col(Translations::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_translations_resource_field_language")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_translations_resource_status")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Translations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Translations {
    Table,
    Id,
    ResourceId,
    FieldId,
    LanguageId,
    TranslatedValue,
    Status,
    Engine,
    TokensUsed,
    IsManualEdit,
    NeedsReview,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Resources {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum ResourceFields {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Languages {
    Table,
    Id,
}
