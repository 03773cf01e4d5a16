//! Language entity model
//!
//! Languages are global records keyed by ISO code. Target language codes on
//! a job resolve against this table; unresolved codes fail their cells.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Language entity representing a translation target
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "languages")]
pub struct Model {
    /// Unique identifier for the language (primary key)
    #[sea_orm(primary_key)]
    pub id: Uuid,

    /// ISO language code (e.g. "fr", "ja"), unique
    pub code: String,

    /// Human-readable language name
    pub name: String,

    /// Timestamp when the language was created
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
