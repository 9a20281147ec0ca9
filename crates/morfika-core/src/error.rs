//! # Error Types
//!
//! Domain-specific error types for morfika-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  morfika-core errors (this file)                                       │
//! │  ├── CoreError        - Draft editing failures                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  morfika-core repository contract (repository.rs)                      │
//! │  └── RepositoryError  - persistence-unavailable / not-found /          │
//! │                         validation-failed / incomplete-write           │
//! │                                                                         │
//! │  morfika-db errors (separate crate)                                    │
//! │  └── DbError          - SQLite operation failures                      │
//! │                                                                         │
//! │  Flow: ValidationError → RepositoryError ← DbError → AppError          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Pricing and reporting have no error type at all: they cannot fail.

use thiserror::Error;
use uuid::Uuid;

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised while editing a quotation draft.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The draft has no piece with this id.
    ///
    /// ## When This Occurs
    /// - Editing or removing a piece that was already removed
    /// - A stale piece id sent by the UI after the draft was reset
    #[error("Piece not found in draft: {0}")]
    PieceNotFound(Uuid),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before anything reaches a store, so a rejected save never leaves
/// partial state behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is below zero.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g. a stored decimal that does not parse).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates a Required error for a field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Creates a Negative error for a field.
    pub fn negative(field: impl Into<String>) -> Self {
        ValidationError::Negative {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let id = Uuid::nil();
        let err = CoreError::PieceNotFound(id);
        assert_eq!(
            err.to_string(),
            "Piece not found in draft: 00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(
            ValidationError::required("client_name").to_string(),
            "client_name is required"
        );
        assert_eq!(
            ValidationError::negative("mass_grams").to_string(),
            "mass_grams must not be negative"
        );

        let err = ValidationError::TooLong {
            field: "name".to_string(),
            max: 100,
        };
        assert_eq!(err.to_string(), "name must be at most 100 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("client_name").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
