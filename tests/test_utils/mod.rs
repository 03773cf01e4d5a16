//! Test utilities for database-backed tests.
//!
//! Provides an in-memory SQLite database with migrations applied, fixture
//! builders for the translation domain, and a scripted mock engine.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, Set, Statement};
use uuid::Uuid;

use polyglot::config::WorkerConfig;
use polyglot::engines::{
    EngineError, EngineRegistry, TranslateOutcome, TranslateRequest, TranslationEngine,
};
use polyglot::ledger::TokenLedger;
use polyglot::models::{
    glossary_rule, language, resource, resource_field, shop, token_wallet, translation_job,
};
use polyglot::orchestrator::TranslationOrchestrator;

/// Sets up an in-memory SQLite database with all migrations applied.
#[allow(dead_code)]
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;

    Migrator::up(&db, None).await?;

    // SQLite does not enforce our Postgres foreign key semantics; disable FK
    // checks so fixtures can be inserted without the full relation graph.
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "PRAGMA foreign_keys = OFF".to_string(),
    ))
    .await?;

    Ok(db)
}

/// Creates a shop and returns its id.
#[allow(dead_code)]
pub async fn create_shop(db: &DatabaseConnection) -> Result<Uuid> {
    let now = Utc::now().fixed_offset();
    let id = Uuid::new_v4();

    shop::ActiveModel {
        id: Set(id),
        domain: Set(format!("{}.example.com", id)),
        name: Set(Some("Test Shop".to_string())),
        created_at: Set(now),
    }
    .insert(db)
    .await?;

    Ok(id)
}

/// Creates a language record for the given code.
#[allow(dead_code)]
pub async fn create_language(db: &DatabaseConnection, code: &str, name: &str) -> Result<language::Model> {
    let now = Utc::now().fixed_offset();

    let model = language::ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set(code.to_string()),
        name: Set(name.to_string()),
        created_at: Set(now),
    }
    .insert(db)
    .await?;

    Ok(model)
}

/// Creates a resource with the given (field_name, original_value) pairs in
/// order. Returns the resource and its fields.
#[allow(dead_code)]
pub async fn create_resource_with_fields(
    db: &DatabaseConnection,
    shop_id: Uuid,
    fields: &[(&str, &str)],
) -> Result<(resource::Model, Vec<resource_field::Model>)> {
    let now = Utc::now().fixed_offset();

    let resource = resource::ActiveModel {
        id: Set(Uuid::new_v4()),
        shop_id: Set(shop_id),
        kind: Set("product".to_string()),
        title: Set(None),
        translation_status: Set("PENDING".to_string()),
        translated_count: Set(0),
        total_languages: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    let mut created = Vec::new();
    for (position, (field_name, original_value)) in fields.iter().enumerate() {
        let field = resource_field::ActiveModel {
            id: Set(Uuid::new_v4()),
            resource_id: Set(resource.id),
            field_name: Set(field_name.to_string()),
            original_value: Set(original_value.to_string()),
            position: Set(position as i32),
            created_at: Set(now),
        }
        .insert(db)
        .await?;
        created.push(field);
    }

    Ok((resource, created))
}

/// Creates a wallet with the given balance (recorded as purchased so the
/// reconciliation invariant holds).
#[allow(dead_code)]
pub async fn create_wallet(
    db: &DatabaseConnection,
    shop_id: Uuid,
    balance: i64,
) -> Result<token_wallet::Model> {
    let now = Utc::now().fixed_offset();

    let wallet = token_wallet::ActiveModel {
        id: Set(Uuid::new_v4()),
        shop_id: Set(shop_id),
        balance: Set(balance),
        total_purchased: Set(balance),
        total_used: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    Ok(wallet)
}

/// Creates a PENDING translation job for the resource.
#[allow(dead_code)]
pub async fn create_job(
    db: &DatabaseConnection,
    shop_id: Uuid,
    resource_id: Uuid,
    codes: &[&str],
    engine: &str,
) -> Result<translation_job::Model> {
    let now = Utc::now().fixed_offset();

    let job = translation_job::ActiveModel {
        id: Set(Uuid::new_v4()),
        shop_id: Set(shop_id),
        resource_id: Set(resource_id),
        target_language_codes: Set(serde_json::json!(codes)),
        engine: Set(engine.to_string()),
        status: Set("PENDING".to_string()),
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
    }
    .insert(db)
    .await?;

    Ok(job)
}

/// Creates an active glossary rule for the shop.
#[allow(dead_code)]
pub async fn create_glossary_rule(
    db: &DatabaseConnection,
    shop_id: Uuid,
    term: &str,
    translation: Option<&str>,
    rule: &str,
    case_sensitive: bool,
    position: i32,
) -> Result<glossary_rule::Model> {
    let now = Utc::now().fixed_offset();

    let model = glossary_rule::ActiveModel {
        id: Set(Uuid::new_v4()),
        shop_id: Set(shop_id),
        term: Set(term.to_string()),
        translation: Set(translation.map(str::to_string)),
        rule: Set(rule.to_string()),
        case_sensitive: Set(case_sensitive),
        is_active: Set(true),
        position: Set(position),
        created_at: Set(now),
    }
    .insert(db)
    .await?;

    Ok(model)
}

/// Scripted translation engine for orchestrator tests. Records every
/// request and answers with a deterministic translation.
#[allow(dead_code)]
pub struct MockEngine {
    slug: &'static str,
    cost_per_call: i64,
    fail: bool,
    calls: Mutex<Vec<TranslateRequest>>,
}

#[allow(dead_code)]
impl MockEngine {
    /// Engine that succeeds, charging `cost_per_call` units per cell.
    pub fn new(slug: &'static str, cost_per_call: i64) -> Arc<Self> {
        Arc::new(Self {
            slug,
            cost_per_call,
            fail: false,
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Engine that fails every call with a network error.
    pub fn failing(slug: &'static str) -> Arc<Self> {
        Arc::new(Self {
            slug,
            cost_per_call: 0,
            fail: true,
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Number of translate calls received so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Copies of the requests received so far.
    pub fn calls(&self) -> Vec<TranslateRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranslationEngine for MockEngine {
    fn slug(&self) -> &'static str {
        self.slug
    }

    async fn translate(&self, request: TranslateRequest) -> Result<TranslateOutcome, EngineError> {
        self.calls.lock().unwrap().push(request.clone());

        if self.fail {
            return Err(EngineError::Network {
                details: "connection reset".to_string(),
            });
        }

        Ok(TranslateOutcome {
            translated_text: format!("[{}] {}", request.target_language, request.text),
            cost_units: self.cost_per_call,
        })
    }
}

/// Worker configuration tuned for tests (no throttle, short timeouts).
#[allow(dead_code)]
pub fn test_worker_config() -> WorkerConfig {
    let mut worker = WorkerConfig::default();
    worker.engine_throttle_ms = 0;
    worker.cell_timeout_seconds = 5;
    worker.tick_ms = 10;
    worker
}

/// Builds an orchestrator over the database with the given engines
/// registered.
#[allow(dead_code)]
pub fn build_orchestrator(
    db: &DatabaseConnection,
    engines: Vec<Arc<dyn TranslationEngine>>,
) -> TranslationOrchestrator {
    let mut registry = EngineRegistry::new();
    for engine in engines {
        registry.register(engine);
    }

    TranslationOrchestrator::new(
        db.clone(),
        Arc::new(registry),
        TokenLedger::new(db.clone()),
        &test_worker_config(),
    )
}
