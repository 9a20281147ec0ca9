//! # App Error Type
//!
//! Unified error type for admin commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in morfika-admin                          │
//! │                                                                         │
//! │  Command Function                                                       │
//! │  Result<T, AppError>                                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Store failure? ───── RepositoryError::PersistenceUnavailable ──┐      │
//! │         │                                                        │      │
//! │         ▼                                                        ▼      │
//! │  Bad input? ───────── ValidationError / JSON / dates ─────── AppError   │
//! │         │                                                        │      │
//! │         ▼                                                        ▼      │
//! │  Success                                         main: "[CODE] message" │
//! │                                                  exit code per ErrorCode│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The machine-readable `code` is also what `--json` mode prints on failure.

use morfika_core::{CoreError, RepositoryError, ValidationError};
use morfika_db::DbError;
use serde::Serialize;

use crate::config::ConfigError;

/// Error returned from admin commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Quotation not found: 0b6f..."
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes for command failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Record not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// The store could not complete the operation; nothing was changed
    /// locally and the operation can be retried
    PersistenceUnavailable,

    /// A quotation write stopped between its steps
    IncompleteWrite,

    /// Configuration could not be loaded
    ConfigError,

    /// Internal error
    Internal,
}

impl ErrorCode {
    /// Process exit status for this code.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorCode::NotFound => 3,
            ErrorCode::ValidationError => 4,
            ErrorCode::PersistenceUnavailable | ErrorCode::IncompleteWrite => 5,
            ErrorCode::ConfigError => 6,
            ErrorCode::Internal => 1,
        }
    }
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        AppError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Internal, message)
    }
}

/// Result alias for commands.
pub type AppResult<T> = Result<T, AppError>;

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => AppError::not_found(entity, id),
            RepositoryError::ValidationFailed(e) => AppError::validation(e.to_string()),
            RepositoryError::PersistenceUnavailable(reason) => {
                tracing::error!(%reason, "Store unavailable");
                AppError::new(
                    ErrorCode::PersistenceUnavailable,
                    format!("Store unavailable, nothing was changed: {}", reason),
                )
            }
            RepositoryError::IncompleteWrite {
                quotation_id,
                reason,
            } => {
                tracing::error!(%quotation_id, %reason, "Quotation write incomplete");
                AppError::new(
                    ErrorCode::IncompleteWrite,
                    format!(
                        "Quotation {} was only partially written ({}); save it again",
                        quotation_id, reason
                    ),
                )
            }
        }
    }
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::ConnectionFailed(reason) => AppError::new(
                ErrorCode::PersistenceUnavailable,
                format!("Database connection failed: {}", reason),
            ),
            DbError::MigrationFailed(reason) => {
                tracing::error!(%reason, "Database migration failed");
                AppError::new(ErrorCode::PersistenceUnavailable, "Database migration failed")
            }
            other => RepositoryError::from(other).into(),
        }
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::PieceNotFound(id) => AppError::not_found("Piece", id),
            CoreError::Validation(e) => AppError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::validation(err.to_string())
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::internal(format!("I/O error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            AppError::validation(format!("Invalid quotation file: {}", err))
        } else {
            AppError::internal(format!("JSON error: {}", err))
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_repository_error_codes() {
        let id = Uuid::new_v4();
        let cases = [
            (RepositoryError::quotation_not_found(id), ErrorCode::NotFound),
            (
                RepositoryError::PersistenceUnavailable("disk full".into()),
                ErrorCode::PersistenceUnavailable,
            ),
            (
                RepositoryError::IncompleteWrite {
                    quotation_id: id,
                    reason: "items".into(),
                },
                ErrorCode::IncompleteWrite,
            ),
            (
                RepositoryError::ValidationFailed(ValidationError::required("clientName")),
                ErrorCode::ValidationError,
            ),
        ];

        for (err, code) in cases {
            assert_eq!(AppError::from(err).code, code);
        }
    }

    #[test]
    fn test_db_error_routes_through_repository_mapping() {
        let err = AppError::from(DbError::printer_not_found(Uuid::nil()));
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(err.message.starts_with("Printer not found"));

        let err = AppError::from(DbError::PoolExhausted);
        assert_eq!(err.code, ErrorCode::PersistenceUnavailable);
    }

    #[test]
    fn test_display_and_exit_codes() {
        let err = AppError::validation("clientName is required");
        assert_eq!(err.to_string(), "[ValidationError] clientName is required");
        assert_eq!(err.code.exit_code(), 4);
        assert_eq!(ErrorCode::Internal.exit_code(), 1);
    }
}
