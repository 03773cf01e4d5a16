//! TranslationJob entity model
//!
//! This module contains the SeaORM entity model for the translation_jobs
//! table, which represents one request to translate all fields of a resource
//! into a set of target languages with one engine.

use super::resource::Entity as Resource;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// TranslationJob entity representing one queued unit of translation work
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "translation_jobs")]
pub struct Model {
    /// Unique identifier for the job (primary key)
    #[sea_orm(primary_key)]
    pub id: Uuid,

    /// Shop the job belongs to
    pub shop_id: Uuid,

    /// Resource whose fields are translated
    pub resource_id: Uuid,

    /// Ordered JSON array of target language codes
    #[sea_orm(column_type = "JsonBinary")]
    pub target_language_codes: JsonValue,

    /// Engine slug used for every cell of the job
    pub engine: String,

    /// Current status (PENDING, PROCESSING, COMPLETED, FAILED)
    pub status: String,

    /// Matrix size: fields x target languages
    pub total_fields: i64,

    /// Cells translated or idempotently skipped
    pub processed_fields: i64,

    /// Cells that failed
    pub failed_fields: i64,

    /// Percentage progress, floor(processed / total * 100)
    pub progress: i32,

    /// Number of attempts made for this job
    pub attempts: i32,

    /// Timestamp when the job is scheduled to run
    pub scheduled_at: DateTimeWithTimeZone,

    /// Timestamp when the job becomes eligible for retry after backoff
    pub retry_after: Option<DateTimeWithTimeZone>,

    /// Timestamp when the job started execution
    pub started_at: Option<DateTimeWithTimeZone>,

    /// Timestamp when the job completed successfully
    pub completed_at: Option<DateTimeWithTimeZone>,

    /// Timestamp when the job failed terminally
    pub failed_at: Option<DateTimeWithTimeZone>,

    /// Error message if the job failed
    pub error: Option<String>,

    /// Timestamp when the job was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the job was last updated
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Target language codes decoded from the stored JSON array, preserving
    /// order. Non-string entries are ignored.
    pub fn target_codes(&self) -> Vec<String> {
        self.target_language_codes
            .as_array()
            .map(|codes| {
                codes
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Resource",
        from = "Column::ResourceId",
        to = "super::resource::Column::Id"
    )]
    Resource,
    #[sea_orm(
        belongs_to = "super::shop::Entity",
        from = "Column::ShopId",
        to = "super::shop::Column::Id"
    )]
    Shop,
}

impl Related<Resource> for Entity {
    fn to() -> RelationDef {
        Relation::Resource.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
