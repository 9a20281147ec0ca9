//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  RepositoryError (morfika-core contract kinds)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AppError (admin CLI) ← Printed for the operator                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use morfika_core::{RepositoryError, ValidationError};
use thiserror::Error;
use uuid::Uuid;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - Updating or deleting an id that was never stored
    /// - Updating a quotation that another session already deleted
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    /// Input rejected before writing.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A stored column could not be mapped back to a domain type.
    ///
    /// ## When This Occurs
    /// - A decimal column holding something other than a decimal string
    /// - A hand-edited database with a malformed uuid or timestamp
    #[error("Column {column} holds invalid data: {reason}")]
    Decode { column: &'static str, reason: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn printer_not_found(id: Uuid) -> Self {
        DbError::NotFound {
            entity: "Printer",
            id,
        }
    }

    pub fn quotation_not_found(id: Uuid) -> Self {
        DbError::NotFound {
            entity: "Quotation",
            id,
        }
    }

    pub fn decode(column: &'static str, reason: impl ToString) -> Self {
        DbError::Decode {
            column,
            reason: reason.to_string(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::QueryFailed (lookups use fetch_optional)
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::QueryFailed("no rows returned".to_string()),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Maps storage failures onto the contract's error kinds.
///
/// ```text
/// DbError::NotFound     → RepositoryError::NotFound
/// DbError::Validation   → RepositoryError::ValidationFailed
/// everything else       → RepositoryError::PersistenceUnavailable
/// ```
impl From<DbError> for RepositoryError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => RepositoryError::NotFound { entity, id },
            DbError::Validation(v) => RepositoryError::ValidationFailed(v),
            other => RepositoryError::PersistenceUnavailable(other.to_string()),
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_to_contract_kinds() {
        let id = Uuid::new_v4();
        let err: RepositoryError = DbError::quotation_not_found(id).into();
        assert!(matches!(err, RepositoryError::NotFound { entity: "Quotation", id: found } if found == id));

        let err: RepositoryError = DbError::Validation(ValidationError::required("clientName")).into();
        assert!(matches!(err, RepositoryError::ValidationFailed(_)));

        let err: RepositoryError = DbError::PoolExhausted.into();
        assert!(matches!(err, RepositoryError::PersistenceUnavailable(_)));
    }
}
