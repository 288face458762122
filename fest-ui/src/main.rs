//! fest-ui - festival site service
//!
//! Serves the background track and records anonymous visitor skips.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use fest_common::config::FestConfig;
use fest_ui::{build_router, db, AppState};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for fest-ui
#[derive(Parser, Debug)]
#[command(name = "fest-ui")]
#[command(about = "Festival site service: background music and visitor tracking")]
#[command(version)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, env = "FEST_CONFIG")]
    config: Option<PathBuf>,

    /// Root folder for the visitor database
    #[arg(short, long, env = "FEST_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Address to listen on (overrides server.bind_addr)
    #[arg(short, long, env = "FEST_BIND_ADDR")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = FestConfig::resolve_and_load(args.config.as_deref())
        .context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    // Build identification first, before any slow startup work
    info!(
        "Starting festival site service (fest-ui) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = config.resolve_root_folder(args.root_folder.as_deref());
    info!("Root folder: {}", root_folder.display());

    if !config.audio.asset_path.exists() {
        warn!(
            "Audio asset not found at {}; audio routes will return 404",
            config.audio.asset_path.display()
        );
    }

    let db_path = root_folder.join(&config.server.database_file);
    let pool = match db::init_database(&db_path).await {
        Ok(pool) => {
            info!("Visitor database ready: {}", db_path.display());
            pool
        }
        Err(e) => {
            error!("Failed to open visitor database: {:#}", e);
            return Err(e);
        }
    };

    let bind_addr = args.bind.unwrap_or_else(|| config.server.bind_addr.clone());
    let app = build_router(AppState::new(pool, config.audio.clone()));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    info!("fest-ui listening on http://{}", bind_addr);
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
            warn!("Failed to install Ctrl+C handler: {}", e);
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
                warn!("Failed to install terminate handler: {}", e);
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
