//! bic-intake - quote intake service
//!
//! Serves the quote builder, job logger and receipt uploads for the BIC
//! businesses, numbering each quote as it is saved.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bic_common::config::{load_config, CliOverrides};
use bic_common::db::init_database;
use bic_intake::{build_router, AppState};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};

/// Command-line arguments for bic-intake
#[derive(Parser, Debug)]
#[command(name = "bic-intake")]
#[command(about = "Quote intake service for the BIC businesses")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long, env = "BIC_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding bic.db and uploaded receipts
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Address to listen on, e.g. 0.0.0.0:5740
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Build identification first, before any database delay
    info!(
        "Starting BIC Intake (bic-intake) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let config = load_config(&CliOverrides {
        config_file: args.config,
        data_dir: args.data_dir,
        bind_addr: args.bind,
    });
    config.validate().context("Invalid configuration")?;

    info!("Data directory: {}", config.data_dir.display());
    if config.transcription.api_key.is_none() {
        warn!("No speech-to-text API key configured; /api/transcribe will be unavailable");
    }

    let db_path = config.database_path();
    let pool = match init_database(&db_path).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to open database {}: {}", db_path.display(), e);
            return Err(e.into());
        }
    };

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(pool, config).context("Failed to create transcription client")?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!("bic-intake listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
