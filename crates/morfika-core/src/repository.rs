//! # Repository Contract
//!
//! The narrow persistence interface the quotation engine consumes.
//! Implementations live in `morfika-db` (SQLite and in-memory).
//!
//! ## Write Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  upsert_quotation(q)                                                    │
//! │                                                                         │
//! │  q.id == RecordId::New          q.id == RecordId::Existing(id)          │
//! │       │                                │                                │
//! │       ▼                                ▼                                │
//! │  insert header (created_at = now) update client_name                    │
//! │  insert pieces in order          delete ALL pieces of id                │
//! │       │                          insert pieces in order                 │
//! │       │                          (created_at untouched)                 │
//! │       ▼                                ▼                                │
//! │  return fresh id                 return id                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Derived figures are never part of the contract. Callers get inputs back
//! and recompute.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::types::{PrinterConfig, Quotation};

// =============================================================================
// Repository Error
// =============================================================================

/// Failure kinds every store reports.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The backing store could not be reached or failed mid-operation.
    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    /// Update or delete targeted a record that does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    /// Input rejected before anything was written.
    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// The quotation header was written but its pieces were not.
    ///
    /// ## When This Occurs
    /// - Stores without transactions whose item write fails after the
    ///   header write succeeded. The header is left orphaned; cleaning it
    ///   up is the store's responsibility.
    #[error("Quotation {quotation_id} saved without its pieces: {reason}")]
    IncompleteWrite { quotation_id: Uuid, reason: String },
}

impl RepositoryError {
    pub fn printer_not_found(id: Uuid) -> Self {
        RepositoryError::NotFound {
            entity: "Printer",
            id,
        }
    }

    pub fn quotation_not_found(id: Uuid) -> Self {
        RepositoryError::NotFound {
            entity: "Quotation",
            id,
        }
    }
}

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

// =============================================================================
// Repository Trait
// =============================================================================

/// CRUD for printer profiles and quotations.
///
/// Stores validate their input (see [`crate::validation`]) and return
/// [`RepositoryError::ValidationFailed`] without writing when it is
/// rejected.
#[async_trait]
pub trait QuotationRepository: Send + Sync {
    /// All printer profiles, ordered by name.
    async fn list_printers(&self) -> RepositoryResult<Vec<PrinterConfig>>;

    /// Creates (`RecordId::New`) or updates a printer profile.
    async fn upsert_printer(&self, printer: &PrinterConfig) -> RepositoryResult<Uuid>;

    /// Deletes a printer. Pieces referencing it become unassigned.
    async fn delete_printer(&self, id: Uuid) -> RepositoryResult<()>;

    /// All quotations with their pieces, newest first.
    async fn list_quotations(&self) -> RepositoryResult<Vec<Quotation>>;

    /// One quotation with its pieces.
    async fn get_quotation(&self, id: Uuid) -> RepositoryResult<Quotation>;

    /// Creates or fully replaces a quotation.
    async fn upsert_quotation(&self, quotation: &Quotation) -> RepositoryResult<Uuid>;

    /// Deletes a quotation and all of its pieces.
    async fn delete_quotation(&self, id: Uuid) -> RepositoryResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let id = Uuid::nil();
        assert_eq!(
            RepositoryError::printer_not_found(id).to_string(),
            "Printer not found: 00000000-0000-0000-0000-000000000000"
        );

        let err: RepositoryError = ValidationError::required("client_name").into();
        assert_eq!(err.to_string(), "Validation failed: client_name is required");
    }
}
