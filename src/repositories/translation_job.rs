//! # TranslationJob Repository
//!
//! This module provides repository operations for the translation_jobs
//! table, encapsulating SeaORM operations for the HTTP handlers.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::translation_job::{ActiveModel, Column, Entity, Model};
use crate::orchestrator::JobStatus;

/// Repository for translation job database operations
pub struct TranslationJobRepository {
    db: DatabaseConnection,
}

impl TranslationJobRepository {
    /// Create a new TranslationJobRepository with the given database
    /// connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Enqueue a new translation job in PENDING state for the executor to
    /// claim.
    pub async fn enqueue(
        &self,
        shop_id: Uuid,
        resource_id: Uuid,
        target_language_codes: Vec<String>,
        engine: &str,
    ) -> Result<Model, ApiError> {
        let now = Utc::now().fixed_offset();

        let job = ActiveModel {
            id: Set(Uuid::new_v4()),
            shop_id: Set(shop_id),
            resource_id: Set(resource_id),
            target_language_codes: Set(serde_json::json!(target_language_codes)),
            engine: Set(engine.to_string()),
            status: Set(JobStatus::Pending.as_str().to_string()),
            total_fields: Set(0),
            processed_fields: Set(0),
            failed_fields: Set(0),
            progress: Set(0),
            attempts: Set(0),
            scheduled_at: Set(now),
            retry_after: Set(None),
            started_at: Set(None),
            completed_at: Set(None),
            failed_at: Set(None),
            error: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = job.insert(&self.db).await.map_err(|e| {
            tracing::error!("Failed to create translation job: {}", e);
            ApiError::from(e)
        })?;

        tracing::info!(
            shop_id = %shop_id,
            resource_id = %resource_id,
            job_id = %result.id,
            engine = %result.engine,
            "Translation job enqueued"
        );

        Ok(result)
    }

    /// Find a translation job by ID
    pub async fn find_by_id(&self, job_id: Uuid) -> Result<Option<Model>, ApiError> {
        let job = Entity::find_by_id(job_id).one(&self.db).await.map_err(|e| {
            tracing::error!("Failed to find translation job: {}", e);
            ApiError::from(e)
        })?;

        Ok(job)
    }

    /// List translation jobs for a shop, newest first, with an optional
    /// status filter.
    pub async fn list_by_shop(
        &self,
        shop_id: Uuid,
        status: Option<String>,
    ) -> Result<Vec<Model>, ApiError> {
        use sea_orm::QueryOrder;

        let mut query = Entity::find()
            .filter(Column::ShopId.eq(shop_id))
            .order_by_desc(Column::CreatedAt);

        if let Some(status_filter) = status {
            query = query.filter(Column::Status.eq(status_filter));
        }

        let jobs = query.all(&self.db).await.map_err(|e| {
            tracing::error!("Failed to list translation jobs: {}", e);
            ApiError::from(e)
        })?;

        Ok(jobs)
    }
}
