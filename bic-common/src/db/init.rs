//! Database initialization
//!
//! Creates the database file and schema on first run and opens it as-is
//! afterwards. Every statement is idempotent.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Busy timeout applied to every connection, in milliseconds
pub const BUSY_TIMEOUT_MS: u64 = 5000;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Pragmas go on the connect options so every pooled connection gets them.
    // WAL lets admin listings read while quotes are being written.
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables and indexes
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_quotes_table(pool).await?;
    create_quote_services_table(pool).await?;
    create_quote_addons_table(pool).await?;
    create_job_logs_table(pool).await?;
    create_receipts_table(pool).await?;
    create_price_book_table(pool).await?;
    Ok(())
}

async fn create_quotes_table(pool: &SqlitePool) -> Result<()> {
    // quote_number UNIQUE is what makes concurrent numbering safe
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS quotes (
            id TEXT PRIMARY KEY,
            quote_number TEXT UNIQUE,
            company_context TEXT NOT NULL,
            estimate_type TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'NEW',
            client_name TEXT,
            notes TEXT,
            subtotal_services REAL NOT NULL DEFAULT 0,
            subtotal_addons REAL NOT NULL DEFAULT 0,
            subtotal REAL NOT NULL DEFAULT 0,
            total REAL NOT NULL DEFAULT 0,
            estimated_total REAL NOT NULL DEFAULT 0,
            disclaimer_text TEXT,
            disclaimer_version TEXT,
            metadata TEXT NOT NULL DEFAULT '{}',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_quotes_created_at ON quotes(created_at)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_quote_services_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS quote_services (
            id TEXT PRIMARY KEY,
            quote_id TEXT NOT NULL REFERENCES quotes(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            service_category TEXT NOT NULL,
            unit TEXT NOT NULL,
            quantity REAL NOT NULL,
            estimated_amount REAL NOT NULL,
            vehicle_type TEXT,
            passenger_count INTEGER
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_quote_services_quote ON quote_services(quote_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_quote_addons_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS quote_addons (
            id TEXT PRIMARY KEY,
            quote_id TEXT NOT NULL REFERENCES quotes(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            extra_type TEXT NOT NULL,
            unit TEXT NOT NULL,
            quantity REAL NOT NULL,
            estimated_amount REAL NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_quote_addons_quote ON quote_addons(quote_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_job_logs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS job_logs (
            id TEXT PRIMARY KEY,
            company_context TEXT NOT NULL,
            source TEXT NOT NULL DEFAULT 'voice',
            transcript TEXT NOT NULL,
            job_summary TEXT NOT NULL,
            audio_url TEXT,
            status TEXT NOT NULL DEFAULT 'logged',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_receipts_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS receipts (
            id TEXT PRIMARY KEY,
            company_context TEXT NOT NULL,
            uploader_note TEXT,
            file_name TEXT NOT NULL,
            file_path TEXT NOT NULL,
            public_url TEXT NOT NULL,
            mime_type TEXT,
            file_size INTEGER,
            related_job_log_id TEXT,
            related_quote_id TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_price_book_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS price_book (
            id TEXT PRIMARY KEY,
            company_context TEXT NOT NULL,
            label TEXT NOT NULL,
            service_name TEXT,
            unit TEXT NOT NULL,
            default_unit_price REAL NOT NULL DEFAULT 0,
            category TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
