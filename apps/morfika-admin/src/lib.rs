//! # morfika-admin
//!
//! Administration CLI for the Morfika quotation engine.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         morfika-admin                                   │
//! │                                                                         │
//! │   main.rs ── clap parse ── AppConfig::load ── init_tracing              │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │   open_store ──► Database (SQLite, migrations applied)                  │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │   commands::* (store, PrinterCatalog, QuotationEditor) ──► data               │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │   ui::* tables   or   --json                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod state;
pub mod ui;

use std::sync::Arc;

use morfika_core::QuotationRepository;
use morfika_db::{Database, DbConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::error::AppResult;

/// Initializes the tracing subscriber for logging.
///
/// ## Log Levels
/// - `RUST_LOG` (or `config.log_filter`) wins when set
/// - Default: `info,morfika=debug,sqlx=warn`
///
/// Logs go to stderr so `--json` output on stdout stays parseable.
pub fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter)
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Opens the SQLite store described by `config`, creating the database
/// directory and applying migrations as needed.
pub async fn open_store(config: &AppConfig) -> AppResult<Arc<dyn QuotationRepository>> {
    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db = Database::new(
        DbConfig::new(config.database_path.clone()).max_connections(config.max_connections),
    )
    .await?;
    info!(path = %config.database_path.display(), "Database ready");

    Ok(Arc::new(db.store()))
}
