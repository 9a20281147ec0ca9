//! # In-Memory Store
//!
//! A [`QuotationRepository`] backed by hash maps behind a tokio mutex.
//! It follows the same write rules as the SQLite store (fresh piece ids,
//! preserved `created_at`, dangling printer ids dropped, printer deletes
//! unassign pieces) and is used by tests and demos.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use morfika_core::validation::{validate_printer, validate_quotation};
use morfika_core::{
    PrinterConfig, Quotation, QuotationRepository, RecordId, RepositoryError, RepositoryResult,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

struct StoredQuotation {
    /// Insertion order, breaks `created_at` ties like SQLite's rowid.
    seq: u64,
    quotation: Quotation,
}

#[derive(Default)]
struct Inner {
    printers: HashMap<Uuid, PrinterConfig>,
    quotations: HashMap<Uuid, StoredQuotation>,
    next_seq: u64,
}

impl Inner {
    /// Copies `source` pieces with fresh ids and unknown printers dropped.
    fn normalize(&self, source: &Quotation) -> Quotation {
        let mut quotation = source.clone();
        for piece in &mut quotation.pieces {
            piece.id = Uuid::new_v4();
            if let Some(printer_id) = piece.printer_id {
                if !self.printers.contains_key(&printer_id) {
                    piece.printer_id = None;
                }
            }
        }
        quotation
    }
}

/// In-memory quotation store.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a quotation with an explicit creation time.
    pub async fn create_at(
        &self,
        quotation: &Quotation,
        created_at: DateTime<Utc>,
    ) -> RepositoryResult<Uuid> {
        validate_quotation(quotation)?;

        let mut inner = self.inner.lock().await;
        let id = Uuid::new_v4();
        let mut stored = inner.normalize(quotation);
        stored.id = RecordId::Existing(id);
        stored.created_at = created_at;

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.quotations.insert(
            id,
            StoredQuotation {
                seq,
                quotation: stored,
            },
        );
        debug!(id = %id, "Quotation stored in memory");
        Ok(id)
    }
}

#[async_trait]
impl QuotationRepository for InMemoryStore {
    async fn list_printers(&self) -> RepositoryResult<Vec<PrinterConfig>> {
        let inner = self.inner.lock().await;
        let mut printers: Vec<PrinterConfig> = inner.printers.values().cloned().collect();
        printers.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.id.existing().cmp(&b.id.existing()))
        });
        Ok(printers)
    }

    async fn upsert_printer(&self, printer: &PrinterConfig) -> RepositoryResult<Uuid> {
        validate_printer(printer)?;

        let mut inner = self.inner.lock().await;
        let id = match printer.id {
            RecordId::New => Uuid::new_v4(),
            RecordId::Existing(id) if inner.printers.contains_key(&id) => id,
            RecordId::Existing(id) => return Err(RepositoryError::printer_not_found(id)),
        };

        let mut stored = printer.clone();
        stored.id = RecordId::Existing(id);
        inner.printers.insert(id, stored);
        Ok(id)
    }

    async fn delete_printer(&self, id: Uuid) -> RepositoryResult<()> {
        let mut inner = self.inner.lock().await;
        if inner.printers.remove(&id).is_none() {
            return Err(RepositoryError::printer_not_found(id));
        }

        for stored in inner.quotations.values_mut() {
            for piece in &mut stored.quotation.pieces {
                if piece.printer_id == Some(id) {
                    piece.printer_id = None;
                }
            }
        }
        Ok(())
    }

    async fn list_quotations(&self) -> RepositoryResult<Vec<Quotation>> {
        let inner = self.inner.lock().await;
        let mut stored: Vec<&StoredQuotation> = inner.quotations.values().collect();
        stored.sort_by(|a, b| {
            b.quotation
                .created_at
                .cmp(&a.quotation.created_at)
                .then_with(|| b.seq.cmp(&a.seq))
        });
        Ok(stored.into_iter().map(|s| s.quotation.clone()).collect())
    }

    async fn get_quotation(&self, id: Uuid) -> RepositoryResult<Quotation> {
        let inner = self.inner.lock().await;
        inner
            .quotations
            .get(&id)
            .map(|s| s.quotation.clone())
            .ok_or_else(|| RepositoryError::quotation_not_found(id))
    }

    async fn upsert_quotation(&self, quotation: &Quotation) -> RepositoryResult<Uuid> {
        let id = match quotation.id {
            RecordId::New => return self.create_at(quotation, Utc::now()).await,
            RecordId::Existing(id) => id,
        };

        validate_quotation(quotation)?;

        let mut inner = self.inner.lock().await;
        let replacement = inner.normalize(quotation);
        let stored = inner
            .quotations
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::quotation_not_found(id))?;

        stored.quotation.client_name = replacement.client_name;
        stored.quotation.pieces = replacement.pieces;
        Ok(id)
    }

    async fn delete_quotation(&self, id: Uuid) -> RepositoryResult<()> {
        let mut inner = self.inner.lock().await;
        inner
            .quotations
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::quotation_not_found(id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
