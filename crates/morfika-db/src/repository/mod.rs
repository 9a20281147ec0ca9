//! # Repository Module
//!
//! SQLite repositories and the store that implements the core contract.
//!
//! ## Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Editor / report (morfika-admin)                                        │
//! │       │  Arc<dyn QuotationRepository>                                   │
//! │       ▼                                                                 │
//! │  SqliteStore  ← contract impl, DbError → RepositoryError                │
//! │  ├── PrinterRepository          printers table                          │
//! │  └── QuotationRecordRepository  quotations + quotation_items            │
//! │       │                                                                 │
//! │       │  TEXT columns ──► parse_decimal / parse_uuid / parse_timestamp  │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows are read into loosely typed `*Row` structs and converted into
//! `morfika-core` types here, at the boundary. A column that does not parse
//! is a [`DbError::Decode`], never a silent zero.

pub mod printer;
pub mod quotation;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use morfika_core::{PrinterConfig, Quotation, QuotationRepository, RepositoryResult};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::pool::Database;

pub use printer::PrinterRepository;
pub use quotation::QuotationRecordRepository;

// =============================================================================
// Column Codecs
// =============================================================================

pub(crate) fn parse_uuid(column: &'static str, text: &str) -> DbResult<Uuid> {
    Uuid::parse_str(text).map_err(|e| DbError::decode(column, e))
}

pub(crate) fn parse_decimal(column: &'static str, text: &str) -> DbResult<Decimal> {
    Decimal::from_str(text.trim()).map_err(|e| DbError::decode(column, e))
}

pub(crate) fn parse_timestamp(column: &'static str, text: &str) -> DbResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::decode(column, e))
}

/// Fixed-width RFC 3339 in UTC, so text order equals time order.
pub(crate) fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

// =============================================================================
// Contract Implementation
// =============================================================================

/// SQLite-backed [`QuotationRepository`].
///
/// Header and item writes share one transaction, so this store never
/// reports `IncompleteWrite`.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        SqliteStore { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl QuotationRepository for SqliteStore {
    async fn list_printers(&self) -> RepositoryResult<Vec<PrinterConfig>> {
        Ok(self.db.printers().list().await?)
    }

    async fn upsert_printer(&self, printer: &PrinterConfig) -> RepositoryResult<Uuid> {
        let id = self.db.printers().upsert(printer).await?;
        info!(id = %id, name = %printer.name, "Printer saved");
        Ok(id)
    }

    async fn delete_printer(&self, id: Uuid) -> RepositoryResult<()> {
        self.db.printers().delete(id).await?;
        info!(id = %id, "Printer deleted");
        Ok(())
    }

    async fn list_quotations(&self) -> RepositoryResult<Vec<Quotation>> {
        Ok(self.db.quotations().list().await?)
    }

    async fn get_quotation(&self, id: Uuid) -> RepositoryResult<Quotation> {
        let quotation = self
            .db
            .quotations()
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::quotation_not_found(id))?;
        Ok(quotation)
    }

    async fn upsert_quotation(&self, quotation: &Quotation) -> RepositoryResult<Uuid> {
        let id = self.db.quotations().save(quotation).await?;
        info!(
            id = %id,
            client = %quotation.client_name,
            pieces = quotation.pieces.len(),
            created = quotation.id.is_new(),
            "Quotation saved"
        );
        Ok(id)
    }

    async fn delete_quotation(&self, id: Uuid) -> RepositoryResult<()> {
        self.db.quotations().delete(id).await?;
        info!(id = %id, "Quotation deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
