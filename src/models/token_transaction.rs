//! TokenTransaction entity model
//!
//! Append-only ledger log. Rows are inserted in the same database
//! transaction as the wallet mutation they record and are never updated.
//! Invariant: balance_after == balance_before + amount.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// TokenTransaction entity recording one wallet mutation
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "token_transactions")]
pub struct Model {
    /// Unique identifier for the transaction (primary key)
    #[sea_orm(primary_key)]
    pub id: Uuid,

    /// Wallet the transaction belongs to
    pub wallet_id: Uuid,

    /// Transaction type (PURCHASE, USAGE)
    pub tx_type: String,

    /// Signed amount; negative for USAGE, positive for PURCHASE
    pub amount: i64,

    /// Wallet balance immediately before this transaction
    pub balance_before: i64,

    /// Wallet balance immediately after this transaction
    pub balance_after: i64,

    /// Engine slug for usage transactions
    pub engine: Option<String>,

    /// Resource reference for usage transactions
    pub resource_id: Option<Uuid>,

    /// Billing-provider charge reference for purchases
    pub charge_ref: Option<String>,

    /// Amount paid in currency for purchases
    pub amount_paid: Option<f64>,

    /// Free-form description
    pub description: Option<String>,

    /// Timestamp when the transaction was recorded
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::token_wallet::Entity",
        from = "Column::WalletId",
        to = "super::token_wallet::Column::Id"
    )]
    TokenWallet,
}

impl Related<super::token_wallet::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TokenWallet.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
