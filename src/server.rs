//! # Server Configuration
//!
//! This module contains the server setup and configuration for the Polyglot
//! API.

use axum::{
    Router,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::handlers;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/jobs", post(handlers::jobs::enqueue_job))
        .route("/jobs/{job_id}", get(handlers::jobs::get_job))
        .route(
            "/jobs/{job_id}/progress",
            get(handlers::jobs::get_job_progress),
        )
        .route("/shops/{shop_id}/wallet", get(handlers::wallets::get_wallet))
        .route(
            "/shops/{shop_id}/wallet/credit",
            post(handlers::wallets::credit_wallet),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
}

/// Starts the server with the given configuration
pub async fn run_server(
    config: AppConfig,
    db: DatabaseConnection,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState { db };
    let app = create_app(state);

    let addr = config
        .bind_addr()
        .map_err(|e| format!("Invalid server address: {}", e))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on: {}", addr);
    tracing::info!("Running in profile: {}", config.profile);

    axum::serve(listener, app).await?;

    Ok(())
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::jobs::enqueue_job,
        crate::handlers::jobs::get_job,
        crate::handlers::jobs::get_job_progress,
        crate::handlers::wallets::get_wallet,
        crate::handlers::wallets::credit_wallet,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::error::ApiError,
            crate::handlers::jobs::EnqueueJobRequest,
            crate::handlers::jobs::JobInfo,
            crate::handlers::jobs::JobProgress,
            crate::handlers::wallets::WalletInfo,
            crate::handlers::wallets::CreditRequest,
        )
    ),
    info(
        title = "Polyglot API",
        description = "Translation job orchestration and token accounting service",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
