use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use super::api::{self, AppState};
use super::audit::DbAuditSink;
use super::db::{BoardDb, DbHandle};
use super::projection::ColumnLabels;
use crate::config::BoardConfig;

/// Configuration for the board server.
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub busy_timeout: Duration,
    pub dev_mode: bool,
    pub labels: ColumnLabels,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from(&BoardConfig::default())
    }
}

impl From<&BoardConfig> for ServerConfig {
    fn from(config: &BoardConfig) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            db_path: config.server.db_path.clone(),
            busy_timeout: Duration::from_millis(config.server.busy_timeout_ms),
            dev_mode: config.server.dev_mode,
            labels: config.column_labels(),
        }
    }
}

/// Open the database file, creating its parent directory if needed.
pub fn open_database(db_path: &std::path::Path, busy_timeout: Duration) -> Result<BoardDb> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).context("Failed to create database directory")?;
    }
    BoardDb::new(db_path, busy_timeout).context("Failed to initialize board database")
}

/// Build the full application router: API routes plus request tracing, and
/// permissive CORS in dev mode.
pub fn build_router(state: Arc<AppState>, dev_mode: bool) -> Router {
    let app = api::api_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if dev_mode {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

/// Start the board server and run until Ctrl+C.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    let db = DbHandle::new(open_database(&config.db_path, config.busy_timeout)?);
    let state = Arc::new(AppState {
        db: db.clone(),
        labels: Arc::new(config.labels),
        audit: Arc::new(DbAuditSink::new(db)),
    });

    let app = build_router(state, config.dev_mode);

    let host = if config.dev_mode { "0.0.0.0" } else { config.host.as_str() };
    let addr = format!("{}:{}", host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let local_addr = listener.local_addr()?;
    info!(%local_addr, db = %config.db_path.display(), "Demand board listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    warn!("Shutting down...");
}
