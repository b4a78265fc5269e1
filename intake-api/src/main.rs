//! intake-api - Candidate Intake service
//!
//! Stores candidate records in one JSON document and serves the listing,
//! batch merge and lookup API plus the review pages.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use intake_api::{build_router, AppState};
use intake_common::config::{Overrides, ServiceConfig};
use intake_common::JsonFileStore;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for intake-api
///
/// Unset flags fall back to INTAKE_* environment variables, then the TOML
/// config file, then built-in defaults.
#[derive(Parser, Debug)]
#[command(name = "intake-api")]
#[command(about = "Candidate intake service")]
#[command(version)]
struct Args {
    /// Address to bind
    #[arg(short, long)]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Path to the candidates JSON document
    #[arg(short, long)]
    data_file: Option<PathBuf>,

    /// Log level or tracing filter directive
    #[arg(long)]
    log_level: Option<String>,

    /// TOML config file (default: <config dir>/candidate-intake/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let resolved = ServiceConfig::resolve(&Overrides {
        bind: args.bind,
        port: args.port,
        data_file: args.data_file,
        log_level: args.log_level,
        config_file: args.config,
    })
    .context("Failed to resolve configuration")?;
    let config = resolved.config;

    // RUST_LOG wins over the configured level when set
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("intake_api={0},intake_common={0},tower_http={0}", config.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting Candidate Intake (intake-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    for note in &resolved.notes {
        note.log();
    }

    let store = JsonFileStore::new(&config.data_file);
    store
        .ensure_parent_exists()
        .context("Failed to create data directory")?;
    info!("Data file: {}", store.path().display());

    let state = AppState::new(Arc::new(store));
    let app = build_router(state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("intake-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

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
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
