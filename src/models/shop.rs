//! Shop entity model
//!
//! This module contains the SeaORM entity model for the shops table. Shops
//! are the tenants of the service.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Shop entity representing a tenant of the translation service
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "shops")]
pub struct Model {
    /// Unique identifier for the shop (primary key)
    #[sea_orm(primary_key)]
    pub id: Uuid,

    /// Storefront domain, unique across all shops
    pub domain: String,

    /// Display name for the shop (optional)
    pub name: Option<String>,

    /// Timestamp when the shop was created
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
