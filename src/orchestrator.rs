//! Translation Orchestrator
//!
//! Expands a translation job into its field x language matrix, resumes
//! idempotently across retries, applies glossary preprocessing, dispatches
//! cells to the configured engine, debits metered cost before persisting,
//! and rolls the terminal status up to the job and resource rows.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use metrics::{counter, histogram};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::config::WorkerConfig;
use crate::engines::{EngineRegistry, RegistryError, TranslateRequest, TranslationEngine};
use crate::glossary::{self, GlossaryRuleData};
use crate::ledger::{LedgerError, TokenLedger, UsageMetadata};
use crate::models::glossary_rule::{
    Column as GlossaryRuleColumn, Entity as GlossaryRuleEntity,
};
use crate::models::language::{Column as LanguageColumn, Entity as LanguageEntity, Model as Language};
use crate::models::resource::{
    ActiveModel as ResourceActiveModel, Entity as ResourceEntity, Model as Resource,
};
use crate::models::resource_field::{
    Column as ResourceFieldColumn, Entity as ResourceFieldEntity, Model as ResourceFieldModel,
};
use crate::models::translation::{
    ActiveModel as TranslationActiveModel, Column as TranslationColumn,
    Entity as TranslationEntity,
};
use crate::models::translation_job::{
    ActiveModel as TranslationJobActiveModel, Column as TranslationJobColumn,
    Entity as TranslationJobEntity, Model as TranslationJobModel,
};

/// Job lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Processing => "PROCESSING",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(JobStatus::Pending),
            "PROCESSING" => Some(JobStatus::Processing),
            "COMPLETED" => Some(JobStatus::Completed),
            "FAILED" => Some(JobStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Result of a completed `run` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub total_fields: i64,
    pub processed_fields: i64,
    pub failed_fields: i64,
}

/// Fatal orchestration errors. Per-cell failures never surface here; they
/// are converted to failed-cell counters. Anything escaping `run` leaves the
/// job marked FAILED and is re-raised for the queue consumer's retry policy.
#[derive(Debug, thiserror::Error)]
pub enum OrchestrationError {
    #[error("translation job {job_id} not found")]
    JobNotFound { job_id: Uuid },

    #[error("resource {resource_id} not found for job {job_id}")]
    ResourceNotFound { resource_id: Uuid, job_id: Uuid },

    #[error("ledger failure: {0}")]
    Ledger(sea_orm::DbErr),

    #[error(transparent)]
    Db(#[from] sea_orm::DbErr),
}

/// Outcome of one (field, language) cell
enum CellOutcome {
    /// An earlier run already completed this cell
    Skipped,
    /// Engine dispatch, debit, and persist all succeeded
    Translated,
    /// Cell failed; `engine_called` drives the inter-call throttle
    Failed { reason: String, engine_called: bool },
}

/// Orchestrator for translation job execution
pub struct TranslationOrchestrator {
    db: DatabaseConnection,
    engines: Arc<EngineRegistry>,
    ledger: TokenLedger,
    cell_timeout: Duration,
    engine_throttle: Duration,
}

impl TranslationOrchestrator {
    /// Create a new orchestrator with explicit collaborators
    pub fn new(
        db: DatabaseConnection,
        engines: Arc<EngineRegistry>,
        ledger: TokenLedger,
        worker: &WorkerConfig,
    ) -> Self {
        Self {
            db,
            engines,
            ledger,
            cell_timeout: Duration::from_secs(worker.cell_timeout_seconds),
            engine_throttle: Duration::from_millis(worker.engine_throttle_ms),
        }
    }

    /// Run a translation job to its terminal state.
    ///
    /// Safe to invoke more than once for the same job: cells already
    /// COMPLETED (and not flagged for review) are skipped without engine or
    /// ledger calls, and a job already COMPLETED returns its stored outcome
    /// without side effects. A FAILED job re-enters the matrix, which is how
    /// queue-level retries make progress.
    #[instrument(skip(self), fields(job_id = %job_id))]
    pub async fn run(&self, job_id: Uuid) -> Result<JobOutcome, OrchestrationError> {
        let job = TranslationJobEntity::find_by_id(job_id)
            .one(&self.db)
            .await?
            .ok_or(OrchestrationError::JobNotFound { job_id })?;

        if job.status == JobStatus::Completed.as_str() {
            debug!("Job already completed, returning stored outcome");
            return Ok(JobOutcome {
                job_id,
                status: JobStatus::Completed,
                total_fields: job.total_fields,
                processed_fields: job.processed_fields,
                failed_fields: job.failed_fields,
            });
        }

        let start = std::time::Instant::now();
        match self.execute(&job).await {
            Ok(outcome) => {
                histogram!("translation_job_duration_seconds")
                    .record(start.elapsed().as_secs_f64());
                Ok(outcome)
            }
            Err(err) => {
                error!("Job {} failed fatally: {}", job.id, err);
                self.mark_job_failed(&job, &err.to_string()).await;
                Err(err)
            }
        }
    }

    /// Execute the field x language matrix for a loaded job.
    async fn execute(&self, job: &TranslationJobModel) -> Result<JobOutcome, OrchestrationError> {
        let resource = ResourceEntity::find_by_id(job.resource_id)
            .one(&self.db)
            .await?
            .ok_or(OrchestrationError::ResourceNotFound {
                resource_id: job.resource_id,
                job_id: job.id,
            })?;

        let fields = ResourceFieldEntity::find()
            .filter(ResourceFieldColumn::ResourceId.eq(resource.id))
            .order_by_asc(ResourceFieldColumn::Position)
            .order_by_asc(ResourceFieldColumn::CreatedAt)
            .all(&self.db)
            .await?;

        let codes = job.target_codes();
        let total_fields = (fields.len() * codes.len()) as i64;

        let languages = self.resolve_languages(&codes).await?;
        let glossary_rules = self.load_glossary_snapshot(job.shop_id).await?;
        let engine = self.engines.get(&job.engine);

        self.mark_job_processing(job, total_fields).await?;
        info!(
            total_fields,
            languages = codes.len(),
            engine = %job.engine,
            "Starting translation job"
        );

        let mut processed: i64 = 0;
        let mut failed: i64 = 0;

        // Fixed iteration order (fields outer, languages inner, stored
        // order) so resumption after a crash walks the same matrix.
        for field in &fields {
            for code in &codes {
                let language = languages
                    .iter()
                    .find(|language| &language.code == code);

                let outcome = self
                    .process_cell(job, &resource, field, code, language, &glossary_rules, &engine)
                    .await?;

                let engine_called = match outcome {
                    CellOutcome::Skipped => {
                        processed += 1;
                        counter!("translation_cells_total", "outcome" => "skipped").increment(1);
                        false
                    }
                    CellOutcome::Translated => {
                        processed += 1;
                        counter!("translation_cells_total", "outcome" => "translated")
                            .increment(1);
                        true
                    }
                    CellOutcome::Failed {
                        reason,
                        engine_called,
                    } => {
                        failed += 1;
                        counter!("translation_cells_total", "outcome" => "failed").increment(1);
                        warn!(
                            field = %field.field_name,
                            language = %code,
                            "Failed to translate cell: {}",
                            reason
                        );
                        engine_called
                    }
                };

                self.update_progress(job.id, total_fields, processed, failed)
                    .await;

                // Cooperative throttle between successive engine calls
                if engine_called {
                    sleep(self.engine_throttle).await;
                }
            }
        }

        let status = if failed == 0 {
            JobStatus::Completed
        } else {
            JobStatus::Failed
        };
        self.mark_job_terminal(job, status, total_fields, processed, failed)
            .await?;
        self.update_resource_rollup(&resource, total_fields, codes.len() as i32)
            .await?;

        info!(
            status = status.as_str(),
            processed, failed, total_fields, "Translation job finished"
        );

        Ok(JobOutcome {
            job_id: job.id,
            status,
            total_fields,
            processed_fields: processed,
            failed_fields: failed,
        })
    }

    /// Process one (field, language) cell. Returns `Err` only for failures
    /// that must abort the whole job (ledger integrity); everything else is
    /// folded into the cell outcome.
    #[allow(clippy::too_many_arguments)]
    async fn process_cell(
        &self,
        job: &TranslationJobModel,
        resource: &Resource,
        field: &ResourceFieldModel,
        code: &str,
        language: Option<&Language>,
        glossary_rules: &[GlossaryRuleData],
        engine: &Result<Arc<dyn TranslationEngine>, RegistryError>,
    ) -> Result<CellOutcome, OrchestrationError> {
        let Some(language) = language else {
            return Ok(CellOutcome::Failed {
                reason: format!("target language '{}' is not registered", code),
                engine_called: false,
            });
        };

        // Idempotent skip: a finalized cell is never re-translated
        let existing = match self.find_translation(resource.id, field.id, language.id).await {
            Ok(existing) => existing,
            Err(err) => {
                return Ok(CellOutcome::Failed {
                    reason: format!("failed to look up existing translation: {}", err),
                    engine_called: false,
                });
            }
        };
        if let Some(translation) = &existing {
            if translation.status == "COMPLETED" && !translation.needs_review {
                return Ok(CellOutcome::Skipped);
            }
        }

        let engine = match engine {
            Ok(engine) => engine,
            Err(err) => {
                return Ok(CellOutcome::Failed {
                    reason: err.to_string(),
                    engine_called: false,
                });
            }
        };

        let prepared = glossary::apply_rules(&field.original_value, glossary_rules);
        let request = TranslateRequest {
            text: prepared,
            target_language: code.to_string(),
            source_language: None,
        };

        let outcome = match timeout(self.cell_timeout, engine.translate(request)).await {
            Err(_) => {
                self.record_failed_cell(job, resource.id, field.id, language.id)
                    .await;
                return Ok(CellOutcome::Failed {
                    reason: format!(
                        "engine call timed out after {}s",
                        self.cell_timeout.as_secs()
                    ),
                    engine_called: true,
                });
            }
            Ok(Err(err)) => {
                self.record_failed_cell(job, resource.id, field.id, language.id)
                    .await;
                return Ok(CellOutcome::Failed {
                    reason: err.to_string(),
                    engine_called: true,
                });
            }
            Ok(Ok(outcome)) => outcome,
        };

        // Debit before persist: a paid result must never be stored without
        // a successful debit. On rejection the translated text is discarded.
        if outcome.cost_units > 0 {
            let metadata = UsageMetadata {
                engine: Some(job.engine.clone()),
                resource_id: Some(resource.id),
            };
            match self.ledger.debit(job.shop_id, outcome.cost_units, metadata).await {
                Ok(()) => {}
                Err(err @ LedgerError::InsufficientTokens { .. })
                | Err(err @ LedgerError::InvalidAmount { .. }) => {
                    self.record_failed_cell(job, resource.id, field.id, language.id)
                        .await;
                    return Ok(CellOutcome::Failed {
                        reason: err.to_string(),
                        engine_called: true,
                    });
                }
                Err(LedgerError::Db(err)) => {
                    return Err(OrchestrationError::Ledger(err));
                }
            }
        }

        if let Err(err) = self
            .upsert_completed_cell(
                job,
                resource.id,
                field.id,
                language.id,
                &outcome.translated_text,
                outcome.cost_units,
            )
            .await
        {
            return Ok(CellOutcome::Failed {
                reason: format!("failed to persist translation: {}", err),
                engine_called: true,
            });
        }

        Ok(CellOutcome::Translated)
    }

    async fn find_translation(
        &self,
        resource_id: Uuid,
        field_id: Uuid,
        language_id: Uuid,
    ) -> Result<Option<crate::models::translation::Model>, DbErr> {
        TranslationEntity::find()
            .filter(TranslationColumn::ResourceId.eq(resource_id))
            .filter(TranslationColumn::FieldId.eq(field_id))
            .filter(TranslationColumn::LanguageId.eq(language_id))
            .one(&self.db)
            .await
    }

    /// Upsert the cell as COMPLETED against its (resource, field, language)
    /// natural key, clearing any manual-edit flag.
    async fn upsert_completed_cell(
        &self,
        job: &TranslationJobModel,
        resource_id: Uuid,
        field_id: Uuid,
        language_id: Uuid,
        translated_text: &str,
        tokens_used: i64,
    ) -> Result<(), DbErr> {
        let now = Utc::now().fixed_offset();
        let cell = TranslationActiveModel {
            id: Set(Uuid::new_v4()),
            resource_id: Set(resource_id),
            field_id: Set(field_id),
            language_id: Set(language_id),
            translated_value: Set(Some(translated_text.to_string())),
            status: Set("COMPLETED".to_string()),
            engine: Set(job.engine.clone()),
            tokens_used: Set(tokens_used),
            is_manual_edit: Set(false),
            needs_review: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };

        TranslationEntity::insert(cell)
            .on_conflict(
                OnConflict::columns([
                    TranslationColumn::ResourceId,
                    TranslationColumn::FieldId,
                    TranslationColumn::LanguageId,
                ])
                .update_columns([
                    TranslationColumn::TranslatedValue,
                    TranslationColumn::Status,
                    TranslationColumn::Engine,
                    TranslationColumn::TokensUsed,
                    TranslationColumn::IsManualEdit,
                    TranslationColumn::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(())
    }

    /// Record a FAILED row for the cell, but only when no row exists for the
    /// key: a prior COMPLETED translation is never overwritten by a failure.
    async fn record_failed_cell(
        &self,
        job: &TranslationJobModel,
        resource_id: Uuid,
        field_id: Uuid,
        language_id: Uuid,
    ) {
        let now = Utc::now().fixed_offset();
        let cell = TranslationActiveModel {
            id: Set(Uuid::new_v4()),
            resource_id: Set(resource_id),
            field_id: Set(field_id),
            language_id: Set(language_id),
            translated_value: Set(None),
            status: Set("FAILED".to_string()),
            engine: Set(job.engine.clone()),
            tokens_used: Set(0),
            is_manual_edit: Set(false),
            needs_review: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = TranslationEntity::insert(cell)
            .on_conflict(
                OnConflict::columns([
                    TranslationColumn::ResourceId,
                    TranslationColumn::FieldId,
                    TranslationColumn::LanguageId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec(&self.db)
            .await;

        match result {
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(err) => {
                warn!("Failed to record failed cell: {}", err);
            }
        }
    }

    async fn mark_job_processing(
        &self,
        job: &TranslationJobModel,
        total_fields: i64,
    ) -> Result<(), DbErr> {
        let now = Utc::now().fixed_offset();
        let mut active: TranslationJobActiveModel = job.clone().into();
        active.status = Set(JobStatus::Processing.as_str().to_string());
        active.total_fields = Set(total_fields);
        active.processed_fields = Set(0);
        active.failed_fields = Set(0);
        active.progress = Set(0);
        active.started_at = Set(Some(now));
        active.error = Set(None);
        active.updated_at = Set(now);
        active.update(&self.db).await?;
        Ok(())
    }

    /// Persist per-cell counters so progress is queryable mid-run. Failures
    /// here are logged and skipped; the terminal update will converge the
    /// counters.
    async fn update_progress(&self, job_id: Uuid, total: i64, processed: i64, failed: i64) {
        let now = Utc::now().fixed_offset();
        let result = TranslationJobEntity::update_many()
            .col_expr(TranslationJobColumn::ProcessedFields, Expr::value(processed))
            .col_expr(TranslationJobColumn::FailedFields, Expr::value(failed))
            .col_expr(
                TranslationJobColumn::Progress,
                Expr::value(progress_pct(processed, total)),
            )
            .col_expr(TranslationJobColumn::UpdatedAt, Expr::value(now))
            .filter(TranslationJobColumn::Id.eq(job_id))
            .exec(&self.db)
            .await;

        if let Err(err) = result {
            warn!("Failed to persist job progress: {}", err);
        }
    }

    async fn mark_job_terminal(
        &self,
        job: &TranslationJobModel,
        status: JobStatus,
        total: i64,
        processed: i64,
        failed: i64,
    ) -> Result<(), DbErr> {
        let now = Utc::now().fixed_offset();
        let mut active: TranslationJobActiveModel = job.clone().into();
        active.status = Set(status.as_str().to_string());
        active.total_fields = Set(total);
        active.processed_fields = Set(processed);
        active.failed_fields = Set(failed);
        active.progress = Set(progress_pct(processed, total));
        match status {
            JobStatus::Completed => active.completed_at = Set(Some(now)),
            _ => active.failed_at = Set(Some(now)),
        }
        active.updated_at = Set(now);
        active.update(&self.db).await?;
        Ok(())
    }

    /// Recompute the resource rollup after a run. The comparison deliberately
    /// uses the current job's matrix size, not the resource's full historical
    /// field x language space; callers needing finer detail read the
    /// translation rows directly.
    async fn update_resource_rollup(
        &self,
        resource: &Resource,
        job_total_fields: i64,
        total_languages: i32,
    ) -> Result<(), DbErr> {
        let translated_count = TranslationEntity::find()
            .filter(TranslationColumn::ResourceId.eq(resource.id))
            .filter(TranslationColumn::Status.eq("COMPLETED"))
            .count(&self.db)
            .await? as i64;

        let status = if job_total_fields > 0 && translated_count == job_total_fields {
            "COMPLETED"
        } else {
            "PARTIALLY_COMPLETED"
        };

        let now = Utc::now().fixed_offset();
        let mut active: ResourceActiveModel = resource.clone().into();
        active.translation_status = Set(status.to_string());
        active.translated_count = Set(translated_count);
        active.total_languages = Set(total_languages);
        active.updated_at = Set(now);
        active.update(&self.db).await?;

        Ok(())
    }

    /// Best-effort FAILED stamp on the fatal path; the original error is
    /// re-raised regardless.
    async fn mark_job_failed(&self, job: &TranslationJobModel, message: &str) {
        let now = Utc::now().fixed_offset();
        let mut active: TranslationJobActiveModel = job.clone().into();
        active.status = Set(JobStatus::Failed.as_str().to_string());
        active.failed_at = Set(Some(now));
        active.error = Set(Some(message.to_string()));
        active.updated_at = Set(now);

        if let Err(err) = active.update(&self.db).await {
            error!("Failed to mark job {} as failed: {}", job.id, err);
        }
    }

    async fn resolve_languages(&self, codes: &[String]) -> Result<Vec<Language>, DbErr> {
        if codes.is_empty() {
            return Ok(Vec::new());
        }
        LanguageEntity::find()
            .filter(LanguageColumn::Code.is_in(codes.iter().cloned()))
            .all(&self.db)
            .await
    }

    /// Snapshot the shop's active glossary rules in application order. Rules
    /// added after this point do not apply to the running job.
    async fn load_glossary_snapshot(
        &self,
        shop_id: Uuid,
    ) -> Result<Vec<GlossaryRuleData>, DbErr> {
        let rules = GlossaryRuleEntity::find()
            .filter(GlossaryRuleColumn::ShopId.eq(shop_id))
            .filter(GlossaryRuleColumn::IsActive.eq(true))
            .order_by_asc(GlossaryRuleColumn::Position)
            .order_by_asc(GlossaryRuleColumn::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(rules.into_iter().map(GlossaryRuleData::from).collect())
    }
}

/// Progress percentage: floor(processed / total * 100)
fn progress_pct(processed: i64, total: i64) -> i32 {
    if total <= 0 {
        return 100;
    }
    ((processed * 100) / total) as i32
}
