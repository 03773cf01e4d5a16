//! Translation Executor
//!
//! Background executor responsible for claiming due translation jobs,
//! invoking the orchestrator, and re-queueing fatally failed jobs with
//! exponential backoff until the attempt limit is reached. This component
//! plays the queue-consumer role: retry and backoff mechanics live here, not
//! in the orchestrator.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::{Rng, thread_rng};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::config::WorkerConfig;
use crate::orchestrator::{JobStatus, TranslationOrchestrator};
use crate::models::translation_job::{
    self, ActiveModel as TranslationJobActiveModel, Entity as TranslationJobEntity,
};

/// Executor that drives queued translation jobs to completion
pub struct TranslationExecutor {
    db: Arc<DatabaseConnection>,
    orchestrator: Arc<TranslationOrchestrator>,
    config: WorkerConfig,
}

impl TranslationExecutor {
    /// Create a new executor
    pub fn new(
        db: DatabaseConnection,
        orchestrator: Arc<TranslationOrchestrator>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            db: Arc::new(db),
            orchestrator,
            config,
        }
    }

    /// Exponential backoff with jitter for re-queued jobs.
    /// `prior_failures` is the number of attempts already burned.
    fn calculate_backoff(&self, prior_failures: i32) -> f64 {
        let base = self.config.retry_base_seconds as f64;
        let max = self.config.retry_max_seconds as f64;
        let backoff = (base * 2_f64.powi(prior_failures.max(0))).min(max);
        let jitter = thread_rng().gen_range(0.0..(self.config.retry_jitter_factor * backoff).max(f64::EPSILON));
        backoff + jitter
    }

    /// Run the executor loop until the token is cancelled
    pub async fn run(&self, shutdown: CancellationToken) {
        info!("Starting translation executor with config: {:?}", self.config);

        loop {
            let start = std::time::Instant::now();

            match self.claim_and_run_jobs().await {
                Ok(count) => {
                    if count > 0 {
                        debug!("Executed {} translation jobs", count);
                    }
                }
                Err(e) => {
                    error!("Error executing translation jobs: {}", e);
                }
            }

            // Sleep for the remaining tick time, waking early on shutdown
            let elapsed = start.elapsed();
            let tick_duration = Duration::from_millis(self.config.tick_ms);
            let idle = tick_duration.saturating_sub(elapsed);
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Translation executor shutting down");
                    return;
                }
                _ = sleep(idle) => {}
            }
        }
    }

    /// Claim due jobs and execute them under the concurrency limit
    #[instrument(skip(self), fields(batch_size = self.config.claim_batch))]
    pub async fn claim_and_run_jobs(
        &self,
    ) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        let jobs = self.claim_jobs().await?;
        let count = jobs.len();

        if jobs.is_empty() {
            debug!("No due jobs found to claim");
            return Ok(0);
        }

        info!("Claimed {} jobs for execution", count);

        let semaphore = Arc::new(tokio::sync::Semaphore::new(self.config.concurrency));

        let mut handles = Vec::new();
        for job in jobs {
            let executor = self.clone();
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| "Failed to acquire semaphore permit")?;

            let handle = tokio::spawn(async move {
                let _permit = permit; // Holds the permit until the job completes
                executor.run_single_job(job).await;
            });
            handles.push(handle);
        }

        for handle in handles {
            let _ = handle.await;
        }

        Ok(count)
    }

    /// Atomically claim due PENDING jobs.
    ///
    /// Eligible ids are selected and then transitioned with a single
    /// conditional UPDATE re-checking the PENDING status, so a concurrent
    /// claimer can never run the same job.
    async fn claim_jobs(
        &self,
    ) -> Result<Vec<translation_job::Model>, Box<dyn std::error::Error + Send + Sync>> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        let eligible_jobs = TranslationJobEntity::find()
            .select_only()
            .column(translation_job::Column::Id)
            .filter(
                translation_job::Column::Status
                    .eq(JobStatus::Pending.as_str())
                    .and(translation_job::Column::ScheduledAt.lte(now))
                    .and(
                        translation_job::Column::RetryAfter
                            .is_null()
                            .or(translation_job::Column::RetryAfter.lte(now)),
                    ),
            )
            .order_by_asc(translation_job::Column::ScheduledAt)
            .limit(Some(self.config.claim_batch))
            .into_tuple::<Uuid>()
            .all(&txn)
            .await?;

        if eligible_jobs.is_empty() {
            txn.commit().await?;
            return Ok(Vec::new());
        }

        let update_result = TranslationJobEntity::update_many()
            .col_expr(
                translation_job::Column::Status,
                Expr::value(JobStatus::Processing.as_str()),
            )
            .col_expr(
                translation_job::Column::Attempts,
                Expr::value(Expr::col(translation_job::Column::Attempts).add(1)),
            )
            .col_expr(translation_job::Column::UpdatedAt, Expr::value(now))
            .filter(translation_job::Column::Id.is_in(eligible_jobs.clone()))
            .filter(translation_job::Column::Status.eq(JobStatus::Pending.as_str()))
            .exec(&txn)
            .await?;

        let claimed_jobs = if update_result.rows_affected > 0 {
            TranslationJobEntity::find()
                .filter(translation_job::Column::Id.is_in(eligible_jobs))
                .filter(translation_job::Column::Status.eq(JobStatus::Processing.as_str()))
                .all(&txn)
                .await?
        } else {
            Vec::new()
        };

        txn.commit().await?;
        Ok(claimed_jobs)
    }

    /// Run one claimed job under the job-level timeout and apply the retry
    /// policy on fatal failure.
    #[instrument(skip(self), fields(job_id = %job.id, shop_id = %job.shop_id, engine = %job.engine))]
    pub async fn run_single_job(&self, job: translation_job::Model) {
        let start = std::time::Instant::now();
        info!("Starting translation job {} (attempt {})", job.id, job.attempts);

        let run = tokio::time::timeout(
            Duration::from_secs(self.config.max_run_seconds),
            self.orchestrator.run(job.id),
        )
        .await;

        match run {
            Ok(Ok(outcome)) => {
                // Job-level FAILED with partial cell successes is terminal;
                // only fatal errors are retried.
                info!(
                    status = outcome.status.as_str(),
                    processed = outcome.processed_fields,
                    failed = outcome.failed_fields,
                    "Job {} finished in {:?}",
                    job.id,
                    start.elapsed()
                );
            }
            Ok(Err(err)) => {
                warn!("Job {} failed after {:?}: {}", job.id, start.elapsed(), err);
                self.apply_retry_policy(&job, &err.to_string()).await;
            }
            Err(_) => {
                warn!(
                    "Job {} timed out after {}s",
                    job.id, self.config.max_run_seconds
                );
                self.apply_retry_policy(
                    &job,
                    &format!("job timed out after {}s", self.config.max_run_seconds),
                )
                .await;
            }
        }
    }

    /// Re-queue a fatally failed job with backoff, or leave it FAILED once
    /// all attempts are used. `job.attempts` already includes the current
    /// attempt (incremented at claim time).
    async fn apply_retry_policy(&self, job: &translation_job::Model, error_msg: &str) {
        let attempts_completed = job.attempts.max(1);
        let now = Utc::now().fixed_offset();

        if attempts_completed >= self.config.max_attempts {
            let mut active: TranslationJobActiveModel = job.clone().into();
            active.status = Set(JobStatus::Failed.as_str().to_string());
            active.attempts = Set(attempts_completed);
            active.failed_at = Set(Some(now));
            active.error = Set(Some(error_msg.to_string()));
            active.updated_at = Set(now);

            if let Err(err) = active.update(&*self.db).await {
                error!("Failed to finalize job {} after retries: {}", job.id, err);
            } else {
                warn!(
                    "Job {} exhausted {} attempts, leaving failed: {}",
                    job.id, attempts_completed, error_msg
                );
            }
            return;
        }

        let backoff_seconds = self.calculate_backoff(attempts_completed - 1);
        let retry_after = now + chrono::Duration::seconds(backoff_seconds as i64);

        let mut active: TranslationJobActiveModel = job.clone().into();
        active.status = Set(JobStatus::Pending.as_str().to_string());
        active.attempts = Set(attempts_completed);
        active.retry_after = Set(Some(retry_after));
        active.error = Set(Some(error_msg.to_string()));
        active.updated_at = Set(now);

        if let Err(err) = active.update(&*self.db).await {
            error!("Failed to re-queue job {}: {}", job.id, err);
        } else {
            warn!(
                "Job {} failed (attempt {}), retrying after {:.1}s: {}",
                job.id, attempts_completed, backoff_seconds, error_msg
            );
        }
    }
}

impl Clone for TranslationExecutor {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            orchestrator: self.orchestrator.clone(),
            config: self.config.clone(),
        }
    }
}
