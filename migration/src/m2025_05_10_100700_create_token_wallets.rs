//! Migration to create the token_wallets table.
//!
//! One prepaid wallet per shop. The balance column carries a CHECK
//! constraint so a conditional debit can never drive it negative.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TokenWallets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TokenWallets::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TokenWallets::ShopId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(TokenWallets::Balance)
                            .big_integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(TokenWallets::Balance).gte(0)),
                    )
                    .col(
                        ColumnDef::new(TokenWallets::TotalPurchased)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TokenWallets::TotalUsed)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TokenWallets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(TokenWallets::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_token_wallets_shop_id")
                            .from(TokenWallets::Table, TokenWallets::ShopId)
                            .to(Shops::Table, Shops::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TokenWallets::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TokenWallets {
    Table,
    Id,
    ShopId,
    Balance,
    TotalPurchased,
    TotalUsed,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Shops {
    Table,
    Id,
}
