//! ResourceField entity model
//!
//! Named source-text fields of a resource. The original value is immutable
//! input to translation; position fixes the orchestrator's iteration order.

use super::resource::Entity as Resource;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// ResourceField entity holding one named piece of source text
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "resource_fields")]
pub struct Model {
    /// Unique identifier for the field (primary key)
    #[sea_orm(primary_key)]
    pub id: Uuid,

    /// Resource this field belongs to
    pub resource_id: Uuid,

    /// Field name (e.g. title, description)
    pub field_name: String,

    /// Immutable source text
    pub original_value: String,

    /// Stable ordering within the resource
    pub position: i32,

    /// Timestamp when the field was created
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Resource",
        from = "Column::ResourceId",
        to = "super::resource::Column::Id"
    )]
    Resource,
}

impl Related<Resource> for Entity {
    fn to() -> RelationDef {
        Relation::Resource.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
