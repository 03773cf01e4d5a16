//! Resource entity model
//!
//! A resource is a unit of translatable content owned by a shop (product,
//! page, collection). Its translation_status is a rollup recomputed after
//! each job run.

use super::shop::Entity as Shop;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Resource entity representing translatable content
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "resources")]
pub struct Model {
    /// Unique identifier for the resource (primary key)
    #[sea_orm(primary_key)]
    pub id: Uuid,

    /// Shop this resource belongs to
    pub shop_id: Uuid,

    /// Kind of resource (e.g. product, page, collection)
    pub kind: String,

    /// Display title (optional)
    pub title: Option<String>,

    /// Rollup status (PENDING, COMPLETED, PARTIALLY_COMPLETED)
    pub translation_status: String,

    /// Count of COMPLETED translation rows for this resource
    pub translated_count: i64,

    /// Number of target languages in the most recent job
    pub total_languages: i32,

    /// Timestamp when the resource was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the resource was last updated
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Shop",
        from = "Column::ShopId",
        to = "super::shop::Column::Id"
    )]
    Shop,
    #[sea_orm(has_many = "super::resource_field::Entity")]
    ResourceField,
}

impl Related<Shop> for Entity {
    fn to() -> RelationDef {
        Relation::Shop.def()
    }
}

impl Related<super::resource_field::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ResourceField.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
