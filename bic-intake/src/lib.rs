//! bic-intake library - quote intake HTTP service
//!
//! Serves the quote builder, the job logger, receipt uploads and the admin
//! listings over one SQLite database.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use bic_common::config::IntakeConfig;
use bic_common::db::SqliteQuoteStore;
use sqlx::SqlitePool;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod storage;
pub mod transcription;

use storage::ReceiptStorage;
use transcription::{TranscribeError, TranscriptionClient};

/// Largest accepted request body (receipt photos, voice memos)
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    pub config: Arc<IntakeConfig>,
    /// Quote number store over the same pool
    pub quote_store: SqliteQuoteStore,
    pub receipts: ReceiptStorage,
    /// Speech-to-text client; `None` when no API key is configured
    pub transcriber: Option<Arc<TranscriptionClient>>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, config: IntakeConfig) -> Result<Self, TranscribeError> {
        let has_key = config
            .transcription
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty());
        let transcriber = if has_key {
            Some(Arc::new(TranscriptionClient::new(&config.transcription)?))
        } else {
            None
        };

        Ok(Self {
            quote_store: SqliteQuoteStore::new(db.clone()),
            receipts: ReceiptStorage::new(config.receipts_dir()),
            config: Arc::new(config),
            transcriber,
            db,
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let routes = Router::new()
        .route("/api/buildinfo", get(api::get_build_info))
        .route("/api/quotes", post(api::create_quote).get(api::list_quotes))
        .route("/api/quotes/:id", get(api::get_quote))
        .route("/api/quotes/:id/number", post(api::assign_quote_number))
        .route(
            "/api/job-logs",
            post(api::create_job_log).get(api::list_job_logs),
        )
        .route(
            "/api/job-logs/:id",
            get(api::get_job_log)
                .patch(api::update_job_log_status)
                .delete(api::delete_job_log),
        )
        .route("/api/job-logs/:id/fields", get(api::get_job_log_fields))
        .route("/api/extract", post(api::extract_text))
        .route("/api/services", get(api::list_services))
        .route(
            "/api/receipts",
            post(api::upload_receipt).get(api::list_receipts),
        )
        .route("/api/transcribe", post(api::transcribe_audio));

    let files = ServeDir::new(state.receipts.root());

    Router::new()
        .merge(routes)
        .merge(api::health_routes())
        .nest_service("/files", files)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
