//! Translation entity model
//!
//! One row per (resource, field, language) cell, upserted against that
//! natural key. A COMPLETED row with needs_review = false is final and is
//! skipped by subsequent automatic jobs.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Translation entity representing one translated cell
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "translations")]
pub struct Model {
    /// Unique identifier for the translation (primary key)
    #[sea_orm(primary_key)]
    pub id: Uuid,

    /// Resource the cell belongs to
    pub resource_id: Uuid,

    /// Source field of the cell
    pub field_id: Uuid,

    /// Target language of the cell
    pub language_id: Uuid,

    /// Translated text, absent until a successful dispatch
    pub translated_value: Option<String>,

    /// Cell status (PENDING, COMPLETED, FAILED)
    pub status: String,

    /// Engine slug that produced the translation
    pub engine: String,

    /// Metered cost charged for this cell
    pub tokens_used: i64,

    /// Whether a human edited the translated value
    pub is_manual_edit: bool,

    /// Whether the cell is flagged for re-translation
    pub needs_review: bool,

    /// Timestamp when the translation was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the translation was last updated
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::resource::Entity",
        from = "Column::ResourceId",
        to = "super::resource::Column::Id"
    )]
    Resource,
    #[sea_orm(
        belongs_to = "super::resource_field::Entity",
        from = "Column::FieldId",
        to = "super::resource_field::Column::Id"
    )]
    ResourceField,
    #[sea_orm(
        belongs_to = "super::language::Entity",
        from = "Column::LanguageId",
        to = "super::language::Column::Id"
    )]
    Language,
}

impl ActiveModelBehavior for ActiveModel {}
