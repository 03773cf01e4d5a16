//! TokenWallet entity model
//!
//! One prepaid wallet per shop. Invariants: balance >= 0 and
//! total_purchased - total_used - balance == 0. All mutations go through the
//! ledger's conditional updates; never read-then-write this row.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// TokenWallet entity holding a shop's prepaid token balance
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "token_wallets")]
pub struct Model {
    /// Unique identifier for the wallet (primary key)
    #[sea_orm(primary_key)]
    pub id: Uuid,

    /// Shop this wallet belongs to (1:1)
    pub shop_id: Uuid,

    /// Current spendable balance
    pub balance: i64,

    /// Lifetime tokens credited via purchases
    pub total_purchased: i64,

    /// Lifetime tokens debited for usage
    pub total_used: i64,

    /// Timestamp when the wallet was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the wallet was last updated
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::shop::Entity",
        from = "Column::ShopId",
        to = "super::shop::Column::Id"
    )]
    Shop,
    #[sea_orm(has_many = "super::token_transaction::Entity")]
    TokenTransaction,
}

impl Related<super::token_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TokenTransaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
