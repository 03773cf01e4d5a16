//! Migration to create the token_transactions table.
//!
//! Append-only ledger log. Every balance mutation inserts exactly one row
//! carrying the pre/post balance snapshot.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TokenTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TokenTransactions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TokenTransactions::WalletId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TokenTransactions::TxType).text().not_null())
                    .col(
                        ColumnDef::new(TokenTransactions::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TokenTransactions::BalanceBefore)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TokenTransactions::BalanceAfter)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TokenTransactions::Engine).text().null())
                    .col(ColumnDef::new(TokenTransactions::ResourceId).uuid().null())
                    .col(ColumnDef::new(TokenTransactions::ChargeRef).text().null())
                    .col(
                        ColumnDef::new(TokenTransactions::AmountPaid)
                            .double()
                            .null(),
                    )
                    .col(ColumnDef::new(TokenTransactions::Description).text().null())
                    .col(
                        ColumnDef::new(TokenTransactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_token_transactions_wallet_id")
                            .from(TokenTransactions::Table, TokenTransactions::WalletId)
                            .to(TokenWallets::Table, TokenWallets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_token_transactions_wallet_created")
                    .table(TokenTransactions::Table)
                    .col(TokenTransactions::WalletId)
                    .col(TokenTransactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_token_transactions_wallet_created")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(TokenTransactions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TokenTransactions {
    Table,
    Id,
    WalletId,
    TxType,
    Amount,
    BalanceBefore,
    BalanceAfter,
    Engine,
    ResourceId,
    ChargeRef,
    AmountPaid,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum TokenWallets {
    Table,
    Id,
}
