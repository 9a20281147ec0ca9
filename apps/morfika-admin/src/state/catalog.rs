//! # Catalog State
//!
//! The locally held view of persisted records: printer profiles and saved
//! quotations.
//!
//! ## Write Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  command ──► store.write() ──► Ok ──► store.list() ──► replace view    │
//! │                    │                                                    │
//! │                    └──────────► Err ──► view untouched, error returned  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The view is replaced from a fresh store listing after every confirmed
//! write. There are no optimistic updates, so a failed write never leaves
//! the view showing a change the store does not have.
//!
//! A reload that fails after a confirmed write does not fail the write.
//! It is logged and the stale view is replaced on the next read.

use std::sync::{Arc, Mutex, PoisonError};

use morfika_core::{PrinterConfig, Quotation, QuotationRepository};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::AppResult;

/// Snapshot of persisted records.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub printers: Vec<PrinterConfig>,

    /// Newest first, as the store lists them.
    pub quotations: Vec<Quotation>,
}

/// Shared catalog state.
#[derive(Debug, Clone, Default)]
pub struct PrinterCatalog {
    catalog: Arc<Mutex<Catalog>>,
}

impl PrinterCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Executes a function with read access to the catalog.
    pub fn with_catalog<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Catalog) -> R,
    {
        let catalog = self.catalog.lock().unwrap_or_else(PoisonError::into_inner);
        f(&catalog)
    }

    fn with_catalog_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Catalog) -> R,
    {
        let mut catalog = self.catalog.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut catalog)
    }

    pub fn printers(&self) -> Vec<PrinterConfig> {
        self.with_catalog(|c| c.printers.clone())
    }

    pub fn quotations(&self) -> Vec<Quotation> {
        self.with_catalog(|c| c.quotations.clone())
    }

    /// Reloads printers and quotations from the store.
    ///
    /// Both listings are fetched before either is applied.
    pub async fn refresh(&self, store: &dyn QuotationRepository) -> AppResult<()> {
        let printers = store.list_printers().await?;
        let quotations = store.list_quotations().await?;
        debug!(
            printers = printers.len(),
            quotations = quotations.len(),
            "Catalog refreshed"
        );

        self.with_catalog_mut(|c| {
            c.printers = printers;
            c.quotations = quotations;
        });
        Ok(())
    }

    /// Reloads printers only.
    pub async fn refresh_printers(&self, store: &dyn QuotationRepository) -> AppResult<()> {
        let printers = store.list_printers().await?;
        self.with_catalog_mut(|c| c.printers = printers);
        Ok(())
    }

    /// Creates or updates a printer profile.
    pub async fn save_printer(
        &self,
        store: &dyn QuotationRepository,
        printer: &PrinterConfig,
    ) -> AppResult<Uuid> {
        let id = store.upsert_printer(printer).await?;
        self.reload_after_write(store).await;
        Ok(id)
    }

    /// Deletes a printer profile.
    ///
    /// Quotation pieces that ran on it become unassigned in the store, so
    /// quotations are reloaded as well.
    pub async fn delete_printer(&self, store: &dyn QuotationRepository, id: Uuid) -> AppResult<()> {
        store.delete_printer(id).await?;
        self.reload_after_write(store).await;
        Ok(())
    }

    /// Deletes a saved quotation.
    pub async fn delete_quotation(
        &self,
        store: &dyn QuotationRepository,
        id: Uuid,
    ) -> AppResult<()> {
        store.delete_quotation(id).await?;
        self.reload_after_write(store).await;
        Ok(())
    }

    /// Reloads after a write the store has already confirmed.
    pub(crate) async fn reload_after_write(&self, store: &dyn QuotationRepository) {
        if let Err(e) = self.refresh(store).await {
            warn!(error = %e, "Catalog reload after a confirmed write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::FailingStore;
    use morfika_core::Money;
    use morfika_db::InMemoryStore;
    use rust_decimal_macros::dec;

    fn printer(name: &str) -> PrinterConfig {
        PrinterConfig::new(name, dec!(400), Money::from_units(907), Money::from_units(25))
    }

    #[tokio::test]
    async fn test_save_printer_refreshes_view() {
        let store = InMemoryStore::new();
        let catalog = PrinterCatalog::new();

        let id = catalog.save_printer(&store, &printer("Ender 3")).await.unwrap();

        let printers = catalog.printers();
        assert_eq!(printers.len(), 1);
        assert_eq!(printers[0].id.existing(), Some(id));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_view_untouched() {
        let store = InMemoryStore::new();
        let catalog = PrinterCatalog::new();
        catalog.save_printer(&store, &printer("Ender 3")).await.unwrap();

        let failing = FailingStore::unavailable();
        assert!(catalog.save_printer(&failing, &printer("Prusa")).await.is_err());
        assert_eq!(catalog.printers().len(), 1);
        assert_eq!(catalog.printers()[0].name, "Ender 3");
    }

    #[tokio::test]
    async fn test_confirmed_write_succeeds_when_reload_fails() {
        let store = FailingStore::reads_fail();
        let catalog = PrinterCatalog::new();

        let id = catalog.save_printer(&store, &printer("Ender 3")).await.unwrap();
        catalog.delete_printer(&store, id).await.unwrap();
        catalog.delete_quotation(&store, Uuid::new_v4()).await.unwrap();
        assert!(catalog.refresh(&store).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_missing_printer_is_an_error() {
        let store = InMemoryStore::new();
        let catalog = PrinterCatalog::new();
        let id = catalog.save_printer(&store, &printer("Ender 3")).await.unwrap();

        assert!(catalog.delete_printer(&store, Uuid::new_v4()).await.is_err());
        assert_eq!(catalog.printers().len(), 1);

        catalog.delete_printer(&store, id).await.unwrap();
        assert!(catalog.printers().is_empty());
    }
}
