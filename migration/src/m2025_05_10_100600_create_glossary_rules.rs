//! Migration to create the glossary_rules table.
//!
//! Shop-scoped term overrides applied to source text before engine dispatch;
//! position fixes application order.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GlossaryRules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GlossaryRules::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GlossaryRules::ShopId).uuid().not_null())
                    .col(ColumnDef::new(GlossaryRules::Term).text().not_null())
                    .col(ColumnDef::new(GlossaryRules::Translation).text().null())
                    .col(
                        ColumnDef::new(GlossaryRules::Rule)
                            .text()
                            .not_null()
                            .default("CUSTOM_TRANSLATION"),
                    )
                    .col(
                        ColumnDef::new(GlossaryRules::CaseSensitive)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(GlossaryRules::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(GlossaryRules::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(GlossaryRules::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_glossary_rules_shop_id")
                            .from(GlossaryRules::Table, GlossaryRules::ShopId)
                            .to(Shops::Table, Shops::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_glossary_rules_shop_active")
                    .table(GlossaryRules::Table)
                    .col(GlossaryRules::ShopId)
                    .col(GlossaryRules::IsActive)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_glossary_rules_shop_active")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(GlossaryRules::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum GlossaryRules {
    Table,
    Id,
    ShopId,
    Term,
    Translation,
    Rule,
    CaseSensitive,
    IsActive,
    Position,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Shops {
    Table,
    Id,
}
