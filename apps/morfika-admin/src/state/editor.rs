//! # Quotation Editor State
//!
//! Holds the quotation being edited: a new draft or a loaded copy of a
//! saved quotation.
//!
//! ## Editor Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Editor Lifecycle                                     │
//! │                                                                         │
//! │  ┌──────────┐  add_piece   ┌──────────┐   save() Ok   ┌──────────┐      │
//! │  │  Empty   │─────────────►│  Draft   │──────────────►│  Empty   │      │
//! │  │  draft   │  load(q)     │ (edited) │               │  draft   │      │
//! │  └──────────┘─────────────►└──────────┘               └──────────┘      │
//! │                              │      ▲                                   │
//! │                  save() Err  │      │                                   │
//! │                              └──────┘ draft kept as-is for retry        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Totals shown while editing use the editor profit figure. Saved
//! quotations in reports use the report profit figure; see
//! [`QuotationTotals`] for the difference.

use std::sync::{Arc, Mutex, PoisonError};

use morfika_core::error::CoreResult;
use morfika_core::pricing::price_quotation;
use morfika_core::validation::validate_quotation;
use morfika_core::{
    CoreError, PrintPiece, PrinterConfig, Quotation, QuotationRepository, QuotationTotals,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::PrinterCatalog;
use crate::error::AppResult;

/// Shared editor state.
#[derive(Debug, Clone)]
pub struct QuotationEditor {
    draft: Arc<Mutex<Quotation>>,
}

impl Default for QuotationEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl QuotationEditor {
    /// Creates an editor holding an empty draft.
    pub fn new() -> Self {
        QuotationEditor {
            draft: Arc::new(Mutex::new(Quotation::draft(""))),
        }
    }

    /// Executes a function with read access to the draft.
    pub fn with_draft<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Quotation) -> R,
    {
        let draft = self.draft.lock().unwrap_or_else(PoisonError::into_inner);
        f(&draft)
    }

    fn with_draft_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Quotation) -> R,
    {
        let mut draft = self.draft.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut draft)
    }

    /// Copy of the current draft.
    pub fn snapshot(&self) -> Quotation {
        self.with_draft(Quotation::clone)
    }

    pub fn set_client_name(&self, name: impl Into<String>) {
        let name = name.into();
        self.with_draft_mut(|d| d.client_name = name);
    }

    /// Appends a piece under a fresh handle and returns that handle.
    pub fn add_piece(&self, piece: PrintPiece) -> Uuid {
        let id = Uuid::new_v4();
        self.with_draft_mut(|d| d.pieces.push(PrintPiece { id, ..piece }));
        debug!(piece_id = %id, "Piece added to draft");
        id
    }

    /// Appends a piece with the editor defaults.
    pub fn add_blank_piece(&self) -> Uuid {
        self.add_piece(PrintPiece::draft())
    }

    /// Replaces the inputs of piece `id`, keeping its handle.
    pub fn update_piece(&self, id: Uuid, piece: PrintPiece) -> CoreResult<()> {
        self.with_draft_mut(|d| {
            let slot = d
                .pieces
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or(CoreError::PieceNotFound(id))?;
            *slot = PrintPiece { id, ..piece };
            Ok(())
        })
    }

    pub fn remove_piece(&self, id: Uuid) -> CoreResult<()> {
        self.with_draft_mut(|d| {
            let before = d.pieces.len();
            d.pieces.retain(|p| p.id != id);
            if d.pieces.len() == before {
                return Err(CoreError::PieceNotFound(id));
            }
            Ok(())
        })
    }

    /// Replaces the draft with `quotation`, saved or not.
    pub fn load(&self, quotation: Quotation) {
        debug!(id = %quotation.id, pieces = quotation.pieces.len(), "Draft loaded");
        self.with_draft_mut(|d| *d = quotation);
    }

    /// Discards the draft.
    pub fn reset(&self) {
        self.with_draft_mut(|d| *d = Quotation::draft(""));
    }

    /// Live totals of the draft against `printers`.
    pub fn totals(&self, printers: &[PrinterConfig]) -> QuotationTotals {
        self.with_draft(|d| price_quotation(&d.pieces, printers))
    }

    /// Persists the draft.
    ///
    /// ## Behavior
    /// - Validation failures are reported before the store is touched
    /// - On success the draft is reset and the catalog reloaded; a failed
    ///   reload is logged and does not turn the save into an error
    /// - On any store failure the draft is left exactly as it was, so the
    ///   user can retry without re-entering anything
    pub async fn save(
        &self,
        store: &dyn QuotationRepository,
        catalog: &PrinterCatalog,
    ) -> AppResult<Uuid> {
        let draft = self.snapshot();
        validate_quotation(&draft)?;

        let id = match store.upsert_quotation(&draft).await {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, client = %draft.client_name, "Quotation save failed, draft kept");
                return Err(e.into());
            }
        };

        info!(id = %id, pieces = draft.pieces.len(), "Quotation saved");
        self.reset();
        catalog.reload_after_write(store).await;
        Ok(id)
    }
}
