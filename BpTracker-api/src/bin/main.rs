use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use bp_tracker_api::config::{AppConfig, StorageBackend};
use bp_tracker_api::create_application;
use bp_tracker_data::database::create_sqlite_pool;
use bp_tracker_data::storage::{InMemoryStore, KeyValueStore, SqliteStore};
use dotenv::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

/// The main entry point for the BP tracker API server
///
/// This function:
/// 1. Initializes environment variables from .env file
/// 2. Sets up tracing for logging
/// 3. Reads the configuration
/// 4. Opens the configured storage backend
/// 5. Loads the tracker and starts the Axum web application
/// 6. Handles graceful shutdown
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    if dotenv().is_err() {
        eprintln!("Warning: .env file not found or couldn't be read. Using environment variables.");
    }

    // Initialize tracing for structured logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_span_events(FmtSpan::CLOSE)
                .with_target(false)
                .with_ansi(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stdout),
        )
        .with(env_filter)
        .init();

    info!("Starting BP tracker API server");

    let config = AppConfig::from_env().context("Invalid configuration")?;
    info!(
        "Classification policy: {:?}, charts: {}, medication flag: {}",
        config.tracker.policy,
        config.tracker.capabilities.show_charts,
        config.tracker.capabilities.show_medication_flag
    );

    let storage = open_storage(&config);
    info!("Using {}", storage.describe());

    let app = create_application(storage, config.tracker).await;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);

    // Create a TCP listener and bind to the address
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    // Serve the application with graceful shutdown support
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Open the configured backend; SQLite failures fall back to memory
fn open_storage(config: &AppConfig) -> Arc<dyn KeyValueStore> {
    match config.storage {
        StorageBackend::Memory => Arc::new(InMemoryStore::new()),
        StorageBackend::Sqlite => match create_sqlite_pool(&config.database) {
            Ok(pool) => Arc::new(SqliteStore::new(pool)),
            Err(e) => {
                error!("Failed to open SQLite storage: {}", e);
                warn!("Readings will not outlive this process");
                Arc::new(InMemoryStore::new())
            }
        },
    }
}

/// Sets up a signal handler for graceful shutdown
///
/// Returns once CTRL+C or SIGTERM (on Unix systems) is received.
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutting down server...");
}
