//! Token ledger
//!
//! Atomic debit/credit against per-shop prepaid wallets with an append-only
//! transaction log. Every mutation is a single conditional UPDATE plus a log
//! insert inside one database transaction, so two concurrent callers can
//! never both spend the same balance. Point reads (`get_balance`) carry no
//! such guarantee and must not gate a debit.

use chrono::Utc;
use metrics::counter;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::token_transaction::ActiveModel as TokenTransactionActiveModel;
use crate::models::token_wallet::{
    ActiveModel as TokenWalletActiveModel, Column as WalletColumn, Entity as TokenWalletEntity,
    Model as TokenWallet,
};

/// Transaction type for wallet top-ups
pub const TX_PURCHASE: &str = "PURCHASE";
/// Transaction type for metered usage
pub const TX_USAGE: &str = "USAGE";

/// Errors produced by ledger operations
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("insufficient tokens: required {required}, available {available}")]
    InsufficientTokens { required: i64, available: i64 },

    #[error("ledger amount must be positive, got {amount}")]
    InvalidAmount { amount: i64 },

    #[error(transparent)]
    Db(#[from] sea_orm::DbErr),
}

/// Context recorded alongside a usage debit
#[derive(Debug, Clone, Default)]
pub struct UsageMetadata {
    pub engine: Option<String>,
    pub resource_id: Option<Uuid>,
}

/// Token ledger over per-shop wallets
#[derive(Clone)]
pub struct TokenLedger {
    db: DatabaseConnection,
}

impl TokenLedger {
    /// Create a new ledger over the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Debit `amount` tokens from the shop's wallet.
    ///
    /// The balance check and decrement are one conditional UPDATE
    /// (`balance = balance - amount WHERE shop_id = ? AND balance >= amount`)
    /// executed in the same transaction as the USAGE log insert. Zero rows
    /// affected means the debit is rejected and nothing is written.
    pub async fn debit(
        &self,
        shop_id: Uuid,
        amount: i64,
        metadata: UsageMetadata,
    ) -> Result<(), LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount { amount });
        }

        let now = Utc::now().fixed_offset();
        let txn = self.db.begin().await?;

        let update_result = TokenWalletEntity::update_many()
            .col_expr(
                WalletColumn::Balance,
                Expr::col(WalletColumn::Balance).sub(amount),
            )
            .col_expr(
                WalletColumn::TotalUsed,
                Expr::col(WalletColumn::TotalUsed).add(amount),
            )
            .col_expr(WalletColumn::UpdatedAt, Expr::value(now))
            .filter(WalletColumn::ShopId.eq(shop_id))
            .filter(WalletColumn::Balance.gte(amount))
            .exec(&txn)
            .await?;

        if update_result.rows_affected == 0 {
            // Either the wallet does not exist or the balance is short; in
            // both cases the wallet and log are untouched.
            let available = TokenWalletEntity::find()
                .filter(WalletColumn::ShopId.eq(shop_id))
                .one(&txn)
                .await?
                .map(|wallet| wallet.balance)
                .unwrap_or(0);
            txn.rollback().await?;

            debug!(
                shop_id = %shop_id,
                required = amount,
                available,
                "Debit rejected: insufficient tokens"
            );
            return Err(LedgerError::InsufficientTokens {
                required: amount,
                available,
            });
        }

        let wallet = TokenWalletEntity::find()
            .filter(WalletColumn::ShopId.eq(shop_id))
            .one(&txn)
            .await?
            .ok_or_else(|| sea_orm::DbErr::RecordNotFound("token wallet".to_string()))?;

        let balance_after = wallet.balance;
        let balance_before = balance_after + amount;

        let description = metadata
            .engine
            .as_deref()
            .map(|engine| format!("Translation using {}", engine));

        let log_row = TokenTransactionActiveModel {
            id: Set(Uuid::new_v4()),
            wallet_id: Set(wallet.id),
            tx_type: Set(TX_USAGE.to_string()),
            amount: Set(-amount),
            balance_before: Set(balance_before),
            balance_after: Set(balance_after),
            engine: Set(metadata.engine),
            resource_id: Set(metadata.resource_id),
            charge_ref: Set(None),
            amount_paid: Set(None),
            description: Set(description),
            created_at: Set(now),
        };
        log_row.insert(&txn).await?;

        txn.commit().await?;

        counter!("ledger_tokens_debited_total").increment(amount as u64);
        debug!(
            shop_id = %shop_id,
            amount,
            balance = balance_after,
            "Debited tokens from wallet"
        );

        Ok(())
    }

    /// Credit `amount` tokens to the shop's wallet, creating the wallet on
    /// first use. Records a PURCHASE transaction with the billing charge
    /// reference and paid amount.
    pub async fn credit(
        &self,
        shop_id: Uuid,
        amount: i64,
        charge_ref: Option<String>,
        amount_paid: Option<f64>,
    ) -> Result<(), LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount { amount });
        }

        let now = Utc::now().fixed_offset();
        let txn = self.db.begin().await?;

        let wallet_id = match TokenWalletEntity::find()
            .filter(WalletColumn::ShopId.eq(shop_id))
            .one(&txn)
            .await?
        {
            Some(wallet) => wallet.id,
            None => {
                let wallet = TokenWalletActiveModel {
                    id: Set(Uuid::new_v4()),
                    shop_id: Set(shop_id),
                    balance: Set(0),
                    total_purchased: Set(0),
                    total_used: Set(0),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                wallet.insert(&txn).await?.id
            }
        };

        TokenWalletEntity::update_many()
            .col_expr(
                WalletColumn::Balance,
                Expr::col(WalletColumn::Balance).add(amount),
            )
            .col_expr(
                WalletColumn::TotalPurchased,
                Expr::col(WalletColumn::TotalPurchased).add(amount),
            )
            .col_expr(WalletColumn::UpdatedAt, Expr::value(now))
            .filter(WalletColumn::Id.eq(wallet_id))
            .exec(&txn)
            .await?;

        let wallet = TokenWalletEntity::find_by_id(wallet_id)
            .one(&txn)
            .await?
            .ok_or_else(|| sea_orm::DbErr::RecordNotFound("token wallet".to_string()))?;

        let balance_after = wallet.balance;
        let balance_before = balance_after - amount;

        let description = match amount_paid {
            Some(paid) => format!("Purchased {} tokens for ${}", amount, paid),
            None => format!("Purchased {} tokens", amount),
        };

        let log_row = TokenTransactionActiveModel {
            id: Set(Uuid::new_v4()),
            wallet_id: Set(wallet.id),
            tx_type: Set(TX_PURCHASE.to_string()),
            amount: Set(amount),
            balance_before: Set(balance_before),
            balance_after: Set(balance_after),
            engine: Set(None),
            resource_id: Set(None),
            charge_ref: Set(charge_ref),
            amount_paid: Set(amount_paid),
            description: Set(Some(description)),
            created_at: Set(now),
        };
        log_row.insert(&txn).await?;

        txn.commit().await?;

        counter!("ledger_tokens_credited_total").increment(amount as u64);
        info!(
            shop_id = %shop_id,
            amount,
            balance = balance_after,
            "Credited tokens to wallet"
        );

        Ok(())
    }

    /// Point read of the current balance; zero when no wallet exists.
    ///
    /// This is advisory only. The value may be stale by the time the caller
    /// acts on it, so it must never gate a subsequent debit.
    pub async fn get_balance(&self, shop_id: Uuid) -> Result<i64, LedgerError> {
        let balance = TokenWalletEntity::find()
            .filter(WalletColumn::ShopId.eq(shop_id))
            .one(&self.db)
            .await?
            .map(|wallet| wallet.balance)
            .unwrap_or(0);

        Ok(balance)
    }

    /// Fetch the full wallet row for a shop, if one exists.
    pub async fn get_wallet(&self, shop_id: Uuid) -> Result<Option<TokenWallet>, LedgerError> {
        let wallet = TokenWalletEntity::find()
            .filter(WalletColumn::ShopId.eq(shop_id))
            .one(&self.db)
            .await?;

        Ok(wallet)
    }
}
