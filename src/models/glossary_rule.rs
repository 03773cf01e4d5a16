//! GlossaryRule entity model
//!
//! Shop-scoped term overrides. Active rules are snapshotted once at job
//! start; rules added mid-job do not apply to it.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// GlossaryRule entity representing one tenant-defined term override
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "glossary_rules")]
pub struct Model {
    /// Unique identifier for the rule (primary key)
    #[sea_orm(primary_key)]
    pub id: Uuid,

    /// Shop this rule belongs to
    pub shop_id: Uuid,

    /// Term to match in the source text
    pub term: String,

    /// Forced translation for CUSTOM_TRANSLATION rules
    pub translation: Option<String>,

    /// Rule kind (DO_NOT_TRANSLATE, CUSTOM_TRANSLATION)
    pub rule: String,

    /// Whether term matching is case sensitive
    pub case_sensitive: bool,

    /// Whether the rule participates in new job snapshots
    pub is_active: bool,

    /// Application order within the shop's rule list
    pub position: i32,

    /// Timestamp when the rule was created
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::shop::Entity",
        from = "Column::ShopId",
        to = "super::shop::Column::Id"
    )]
    Shop,
}

impl ActiveModelBehavior for ActiveModel {}
