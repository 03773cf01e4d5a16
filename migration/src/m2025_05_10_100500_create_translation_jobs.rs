//! Migration to create the translation_jobs table.
//!
//! Translation jobs are the units of work claimed by the background
//! executor, shop-scoped with status, counters, and timing metadata.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Statement;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TranslationJobs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TranslationJobs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TranslationJobs::ShopId).uuid().not_null())
                    .col(
                        ColumnDef::new(TranslationJobs::ResourceId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TranslationJobs::TargetLanguageCodes)
                            .json_binary()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TranslationJobs::Engine).text().not_null())
                    .col(
                        ColumnDef::new(TranslationJobs::Status)
                            .text()
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(
                        ColumnDef::new(TranslationJobs::TotalFields)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TranslationJobs::ProcessedFields)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TranslationJobs::FailedFields)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TranslationJobs::Progress)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TranslationJobs::Attempts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TranslationJobs::ScheduledAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(TranslationJobs::RetryAfter)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(TranslationJobs::StartedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(TranslationJobs::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(TranslationJobs::FailedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(TranslationJobs::Error).text().null())
                    .col(
                        ColumnDef::new(TranslationJobs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(TranslationJobs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_translation_jobs_shop_id")
                            .from(TranslationJobs::Table, TranslationJobs::ShopId)
                            .to(Shops::Table, Shops::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_translation_jobs_resource_id")
                            .from(TranslationJobs::Table, TranslationJobs::ResourceId)
                            .to(Resources::Table, Resources::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index for claiming the next due job
        manager
            .get_connection()
            .execute(Statement::from_string(
                manager.get_database_backend(),
                "CREATE INDEX IF NOT EXISTS idx_translation_jobs_status_scheduled ON translation_jobs (status, scheduled_at)".to_string(),
            ))
            .await?;

        // Index for shop-scoped job views
        manager
            .create_index(
                Index::create()
                    .name("idx_translation_jobs_shop_status")
                    .table(TranslationJobs::Table)
                    .col(TranslationJobs::ShopId)
                    .col(TranslationJobs::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_translation_jobs_status_scheduled")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_translation_jobs_shop_status")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(TranslationJobs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TranslationJobs {
    Table,
    Id,
    ShopId,
    ResourceId,
    TargetLanguageCodes,
    Engine,
    Status,
    TotalFields,
    ProcessedFields,
    FailedFields,
    Progress,
    Attempts,
    ScheduledAt,
    RetryAfter,
    StartedAt,
    CompletedAt,
    FailedAt,
    Error,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Shops {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Resources {
    Table,
    Id,
}
