//! # Polyglot Main Entry Point
//!
//! This is the main entry point for the Polyglot translation service.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use tokio_util::sync::CancellationToken;

use polyglot::config::ConfigLoader;
use polyglot::db::init_pool;
use polyglot::engines::EngineRegistry;
use polyglot::executor::TranslationExecutor;
use polyglot::ledger::TokenLedger;
use polyglot::orchestrator::TranslationOrchestrator;
use polyglot::server::run_server;
use polyglot::telemetry;

#[derive(Parser)]
#[command(name = "polyglot", about = "Translation job orchestration and token accounting service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run migrations, start the job executor and the HTTP API (default)
    Serve,
    /// Run database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_loader = ConfigLoader::new();
    let config = config_loader.load()?;
    config.validate()?;

    telemetry::init_tracing(&config)?;
    if let Ok(redacted_json) = config.redacted_json() {
        tracing::info!(profile = %config.profile, "Loaded configuration: {}", redacted_json);
    }

    let db = init_pool(&config).await?;
    Migrator::up(&db, None).await?;

    if let Some(Command::Migrate) = cli.command {
        tracing::info!("Migrations applied, exiting");
        return Ok(());
    }

    let registry = Arc::new(EngineRegistry::from_config(&config));
    let ledger = TokenLedger::new(db.clone());
    let orchestrator = Arc::new(TranslationOrchestrator::new(
        db.clone(),
        registry,
        ledger,
        &config.worker,
    ));
    let executor = TranslationExecutor::new(db.clone(), orchestrator, config.worker.clone());

    let shutdown = CancellationToken::new();
    let executor_shutdown = shutdown.clone();
    let executor_handle = tokio::spawn(async move {
        executor.run(executor_shutdown).await;
    });

    let result = run_server(config, db).await;

    shutdown.cancel();
    let _ = executor_handle.await;

    result
}
