//! # Jobs API Handlers
//!
//! Handlers for enqueueing translation jobs and querying their progress.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::engines::ENGINE_SLUGS;
use crate::error::{ApiError, not_found, validation_error};
use crate::models::resource::Entity as ResourceEntity;
use crate::models::translation_job;
use crate::repositories::TranslationJobRepository;
use crate::server::AppState;
use sea_orm::EntityTrait;

/// Job descriptor accepted from the enqueue endpoint
#[derive(Debug, Deserialize, ToSchema)]
pub struct EnqueueJobRequest {
    /// Shop the job belongs to
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub shop_id: Uuid,
    /// Resource whose fields are translated
    #[schema(example = "550e8400-e29b-41d4-a716-446655440001")]
    pub resource_id: Uuid,
    /// Ordered list of target language codes
    #[schema(example = json!(["fr", "ja"]))]
    pub target_language_codes: Vec<String>,
    /// Engine slug (one of: lexicon, phrase, generative)
    #[schema(example = "generative")]
    pub engine: String,
}

/// Job information response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct JobInfo {
    /// Unique identifier for the job
    pub id: String,
    /// Shop the job belongs to
    pub shop_id: String,
    /// Resource whose fields are translated
    pub resource_id: String,
    /// Ordered list of target language codes
    pub target_language_codes: Vec<String>,
    /// Engine slug used for every cell
    pub engine: String,
    /// Current status of the job
    #[schema(example = "PENDING")]
    pub status: String,
    /// Matrix size: fields x target languages
    pub total_fields: i64,
    /// Cells translated or idempotently skipped
    pub processed_fields: i64,
    /// Cells that failed
    pub failed_fields: i64,
    /// Percentage progress
    pub progress: i32,
    /// Timestamp when the job was created
    pub created_at: String,
    /// Timestamp when the job started execution
    pub started_at: Option<String>,
    /// Timestamp when the job completed successfully
    pub completed_at: Option<String>,
    /// Timestamp when the job failed terminally
    pub failed_at: Option<String>,
    /// Error message if the job failed
    pub error: Option<String>,
}

/// Progress snapshot for one job, queryable mid-run
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct JobProgress {
    /// Current status of the job
    #[schema(example = "PROCESSING")]
    pub status: String,
    /// Matrix size: fields x target languages
    pub total_fields: i64,
    /// Cells translated or idempotently skipped
    pub processed_fields: i64,
    /// Cells that failed
    pub failed_fields: i64,
    /// Percentage progress
    pub progress: i32,
}

impl From<translation_job::Model> for JobInfo {
    fn from(model: translation_job::Model) -> Self {
        let target_language_codes = model.target_codes();
        Self {
            id: model.id.to_string(),
            shop_id: model.shop_id.to_string(),
            resource_id: model.resource_id.to_string(),
            target_language_codes,
            engine: model.engine,
            status: model.status,
            total_fields: model.total_fields,
            processed_fields: model.processed_fields,
            failed_fields: model.failed_fields,
            progress: model.progress,
            created_at: model.created_at.to_rfc3339(),
            started_at: model.started_at.map(|dt| dt.to_rfc3339()),
            completed_at: model.completed_at.map(|dt| dt.to_rfc3339()),
            failed_at: model.failed_at.map(|dt| dt.to_rfc3339()),
            error: model.error,
        }
    }
}

impl From<translation_job::Model> for JobProgress {
    fn from(model: translation_job::Model) -> Self {
        Self {
            status: model.status,
            total_fields: model.total_fields,
            processed_fields: model.processed_fields,
            failed_fields: model.failed_fields,
            progress: model.progress,
        }
    }
}

/// Enqueue a translation job for the background executor
#[utoipa::path(
    post,
    path = "/jobs",
    request_body = EnqueueJobRequest,
    responses(
        (status = 201, description = "Job enqueued", body = JobInfo),
        (status = 400, description = "Invalid job descriptor", body = ApiError),
        (status = 404, description = "Resource not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "jobs"
)]
pub async fn enqueue_job(
    State(state): State<AppState>,
    Json(request): Json<EnqueueJobRequest>,
) -> Result<(StatusCode, Json<JobInfo>), ApiError> {
    if request.target_language_codes.is_empty() {
        return Err(validation_error(
            "Invalid job descriptor",
            serde_json::json!({
                "target_language_codes": "At least one target language code is required"
            }),
        ));
    }

    if !ENGINE_SLUGS.contains(&request.engine.as_str()) {
        return Err(validation_error(
            "Invalid job descriptor",
            serde_json::json!({
                "engine": format!("Must be one of: {}", ENGINE_SLUGS.join(", "))
            }),
        ));
    }

    // The resource must exist and belong to the descriptor's shop
    let resource = ResourceEntity::find_by_id(request.resource_id)
        .one(&state.db)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| not_found("Resource"))?;

    if resource.shop_id != request.shop_id {
        return Err(not_found("Resource"));
    }

    let repo = TranslationJobRepository::new(state.db.clone());
    let job = repo
        .enqueue(
            request.shop_id,
            request.resource_id,
            request.target_language_codes,
            &request.engine,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(JobInfo::from(job))))
}

/// Fetch one job with full details
#[utoipa::path(
    get,
    path = "/jobs/{job_id}",
    params(
        ("job_id" = Uuid, Path, description = "Translation job ID")
    ),
    responses(
        (status = 200, description = "Job details", body = JobInfo),
        (status = 404, description = "Job not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "jobs"
)]
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobInfo>, ApiError> {
    let repo = TranslationJobRepository::new(state.db.clone());
    let job = repo
        .find_by_id(job_id)
        .await?
        .ok_or_else(|| not_found("Translation job"))?;

    Ok(Json(JobInfo::from(job)))
}

/// Query job progress; available mid-run as well as at terminal state
#[utoipa::path(
    get,
    path = "/jobs/{job_id}/progress",
    params(
        ("job_id" = Uuid, Path, description = "Translation job ID")
    ),
    responses(
        (status = 200, description = "Job progress", body = JobProgress),
        (status = 404, description = "Job not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "jobs"
)]
pub async fn get_job_progress(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobProgress>, ApiError> {
    let repo = TranslationJobRepository::new(state.db.clone());
    let job = repo
        .find_by_id(job_id)
        .await?
        .ok_or_else(|| not_found("Translation job"))?;

    Ok(Json(JobProgress::from(job)))
}
