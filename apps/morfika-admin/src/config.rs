//! # Configuration
//!
//! Loaded once at startup from environment variables with defaults.
//!
//! ## Sources (Priority Order)
//! 1. Command line flags (`--db`), applied by `main`
//! 2. Environment variables (`MORFIKA_*`, `RUST_LOG`)
//! 3. Defaults (this file), database in the platform data directory
//!
//! | Variable                  | Default                                   |
//! |---------------------------|-------------------------------------------|
//! | `MORFIKA_DB_PATH`         | `<data dir>/morfika.db`                   |
//! | `MORFIKA_MAX_CONNECTIONS` | `5`                                       |
//! | `RUST_LOG`                | `info,morfika=debug,sqlx=warn`            |

use directories::ProjectDirs;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Default tracing filter.
pub const DEFAULT_LOG_FILTER: &str = "info,morfika=debug,sqlx=warn";

/// Application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// SQLite database file.
    pub database_path: PathBuf,

    /// Upper bound of the connection pool.
    pub max_connections: u32,

    /// `tracing` env-filter directive.
    pub log_filter: String,
}

impl AppConfig {
    /// Loads configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which stands in for the
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_path = match lookup("MORFIKA_DB_PATH") {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            Some(_) => return Err(ConfigError::InvalidValue("MORFIKA_DB_PATH".to_string())),
            None => Self::default_database_path()?,
        };

        let max_connections = match lookup("MORFIKA_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::InvalidValue("MORFIKA_MAX_CONNECTIONS".to_string()))?,
            None => 5,
        };

        let log_filter = lookup("RUST_LOG")
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(AppConfig {
            database_path,
            max_connections,
            log_filter,
        })
    }

    /// Database file in the platform data directory.
    ///
    /// ## Platform-Specific Paths
    /// - **macOS**: `~/Library/Application Support/com.morfika.admin/morfika.db`
    /// - **Windows**: `%APPDATA%\morfika\admin\data\morfika.db`
    /// - **Linux**: `~/.local/share/morfika-admin/morfika.db`
    pub fn default_database_path() -> Result<PathBuf, ConfigError> {
        let dirs = ProjectDirs::from("com", "morfika", "admin").ok_or(ConfigError::NoDataDirectory)?;
        Ok(dirs.data_dir().join("morfika.db"))
    }
}

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Could not determine the application data directory")]
    NoDataDirectory,
}
