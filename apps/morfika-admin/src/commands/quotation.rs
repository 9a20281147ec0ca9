//! # Quotation Commands
//!
//! Pricing, saving and browsing quotations.
//!
//! ## Input File
//! `quote price` and `quote save` read a JSON document:
//! ```json
//! {
//!   "clientName": "Ana Pérez",
//!   "pieces": [
//!     {
//!       "name": "Soporte celular",
//!       "material": "PLA",
//!       "materialCostPerKg": "70000",
//!       "massGrams": "50",
//!       "printMinutes": "120",
//!       "printerId": "7f0c..."
//!     }
//!   ]
//! }
//! ```
//! Omitted post-processing fields are zero. Every command re-prices from
//! the current printer profiles; no derived figure is ever stored.

use std::path::Path;

use chrono::{DateTime, Utc};
use morfika_core::pricing::price_quotation;
use morfika_core::{Money, PrintPiece, Quotation, QuotationRepository, QuotationTotals, RecordId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::AppResult;
use crate::state::{PrinterCatalog, QuotationEditor};

/// Quotation read from an input file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationInput {
    pub client_name: String,
    #[serde(default)]
    pub pieces: Vec<PrintPiece>,
}

impl QuotationInput {
    /// Reads and parses `path`.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// A quotation together with its derived figures.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationView {
    pub quotation: Quotation,
    pub totals: QuotationTotals,
}

/// One line of the saved-quotations listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationSummary {
    pub id: Uuid,
    pub client_name: String,
    pub created_at: DateTime<Utc>,
    pub piece_count: usize,
    pub total_filament_grams: Decimal,
    pub net_sale_total: Money,
    /// Editor profit (print production only); see [`QuotationTotals`].
    pub editor_profit: Money,
}

/// Fills the editor draft from `input`, replacing any pieces it held.
fn fill_draft(editor: &QuotationEditor, input: QuotationInput) {
    editor.set_client_name(input.client_name);
    for piece in input.pieces {
        editor.add_piece(piece);
    }
}

/// Prices `input` without saving it.
pub async fn price_quotation_input(
    store: &dyn QuotationRepository,
    catalog: &PrinterCatalog,
    editor: &QuotationEditor,
    input: QuotationInput,
) -> AppResult<QuotationView> {
    debug!(pieces = input.pieces.len(), "price_quotation command");
    catalog.refresh_printers(store).await?;

    editor.reset();
    fill_draft(editor, input);

    let totals = editor.totals(&catalog.printers());
    Ok(QuotationView {
        quotation: editor.snapshot(),
        totals,
    })
}

/// Saves `input` as a new quotation, or as the new content of
/// `existing` when given.
///
/// Updating keeps the original creation time and replaces all pieces.
pub async fn save_quotation(
    store: &dyn QuotationRepository,
    catalog: &PrinterCatalog,
    editor: &QuotationEditor,
    input: QuotationInput,
    existing: Option<Uuid>,
) -> AppResult<Uuid> {
    debug!(existing = ?existing, "save_quotation command");

    match existing {
        Some(id) => {
            let mut saved = store.get_quotation(id).await?;
            saved.pieces.clear();
            editor.load(saved);
        }
        None => editor.reset(),
    }
    fill_draft(editor, input);

    let id = editor.save(store, catalog).await?;
    info!(id = %id, "save_quotation complete");
    Ok(id)
}

/// Lists saved quotations, newest first.
pub async fn list_quotations(
    store: &dyn QuotationRepository,
    catalog: &PrinterCatalog,
) -> AppResult<Vec<QuotationSummary>> {
    debug!("list_quotations command");
    catalog.refresh(store).await?;

    let summaries = catalog.with_catalog(|c| {
        c.quotations
            .iter()
            .filter_map(|q| {
                let id = q.id.existing()?;
                let totals = price_quotation(&q.pieces, &c.printers);
                Some(QuotationSummary {
                    id,
                    client_name: q.client_name.clone(),
                    created_at: q.created_at,
                    piece_count: q.piece_count(),
                    total_filament_grams: totals.total_filament_grams,
                    net_sale_total: totals.net_sale_total,
                    editor_profit: totals.editor_profit,
                })
            })
            .collect()
    });
    Ok(summaries)
}

/// Loads quotation `id` and prices it against the current printers.
pub async fn show_quotation(
    store: &dyn QuotationRepository,
    catalog: &PrinterCatalog,
    id: Uuid,
) -> AppResult<QuotationView> {
    debug!(id = %id, "show_quotation command");
    catalog.refresh_printers(store).await?;

    let quotation = store.get_quotation(id).await?;
    let totals = price_quotation(&quotation.pieces, &catalog.printers());
    Ok(QuotationView { quotation, totals })
}

/// Deletes quotation `id` with all its pieces.
pub async fn delete_quotation(
    store: &dyn QuotationRepository,
    catalog: &PrinterCatalog,
    id: Uuid,
) -> AppResult<()> {
    debug!(id = %id, "delete_quotation command");
    catalog.delete_quotation(store, id).await?;
    info!(id = %id, "Quotation deleted");
    Ok(())
}

/// True when the view is of a saved quotation.
pub fn is_saved(view: &QuotationView) -> bool {
    !matches!(view.quotation.id, RecordId::New)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use morfika_core::PrinterConfig;
    use morfika_db::InMemoryStore;
    use rust_decimal_macros::dec;

    const INPUT: &str = r#"{
        "clientName": "Ana",
        "pieces": [
            {
                "name": "Soporte",
                "material": "PLA",
                "materialCostPerKg": "70000",
                "massGrams": "50",
                "printMinutes": "120"
            }
        ]
    }"#;

    fn input_with_printer(printer_id: Uuid) -> QuotationInput {
        let mut input = QuotationInput::from_json(INPUT).unwrap();
        input.pieces[0].printer_id = Some(printer_id);
        input
    }

    async fn setup() -> (InMemoryStore, PrinterCatalog, QuotationEditor, Uuid) {
        let store = InMemoryStore::new();
        let printer_id = store
            .upsert_printer(&PrinterConfig::new(
                "Ender 3",
                dec!(400),
                Money::from_units(907),
                Money::from_units(25),
            ))
            .await
            .unwrap();
        (store, PrinterCatalog::new(), QuotationEditor::new(), printer_id)
    }

    #[test]
    fn test_input_parsing() {
        let input = QuotationInput::from_json(INPUT).unwrap();
        assert_eq!(input.client_name, "Ana");
        assert_eq!(input.pieces[0].mass_grams, dec!(50));
        assert!(input.pieces[0].primer_consumed_ml.is_zero());

        let err = QuotationInput::from_json("{ not json").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_price_uses_stored_printers() {
        let (store, catalog, editor, printer_id) = setup().await;

        let view = price_quotation_input(&store, &catalog, &editor, input_with_printer(printer_id))
            .await
            .unwrap();

        assert!(!is_saved(&view));
        // 400 W for 2 h at 907/kWh
        assert_eq!(view.totals.breakdown.energy, Money::new(dec!(725.6)));
        assert_eq!(view.totals.breakdown.machine, Money::from_units(3_000));
        assert!(store.list_quotations().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_list_show_delete() {
        let (store, catalog, editor, printer_id) = setup().await;

        let id = save_quotation(&store, &catalog, &editor, input_with_printer(printer_id), None)
            .await
            .unwrap();

        let listed = list_quotations(&store, &catalog).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);
        assert_eq!(listed[0].piece_count, 1);

        let view = show_quotation(&store, &catalog, id).await.unwrap();
        assert!(is_saved(&view));
        assert_eq!(view.totals.net_sale_total, listed[0].net_sale_total);

        delete_quotation(&store, &catalog, id).await.unwrap();
        assert!(list_quotations(&store, &catalog).await.unwrap().is_empty());

        let err = show_quotation(&store, &catalog, id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_save_over_existing_replaces_pieces() {
        let (store, catalog, editor, printer_id) = setup().await;
        let id = save_quotation(&store, &catalog, &editor, input_with_printer(printer_id), None)
            .await
            .unwrap();
        let created_at = store.get_quotation(id).await.unwrap().created_at;

        let mut input = input_with_printer(printer_id);
        input.client_name = "Ana B.".to_string();
        input.pieces.push(PrintPiece::draft());
        let same = save_quotation(&store, &catalog, &editor, input, Some(id))
            .await
            .unwrap();
        assert_eq!(same, id);

        let stored = store.get_quotation(id).await.unwrap();
        assert_eq!(stored.client_name, "Ana B.");
        assert_eq!(stored.pieces.len(), 2);
        assert_eq!(stored.created_at, created_at);
    }

    #[tokio::test]
    async fn test_deleted_printer_reprices_saved_quotation() {
        let (store, catalog, editor, printer_id) = setup().await;
        let id = save_quotation(&store, &catalog, &editor, input_with_printer(printer_id), None)
            .await
            .unwrap();
        let before = show_quotation(&store, &catalog, id).await.unwrap();

        crate::commands::printer::delete_printer(&store, &catalog, printer_id)
            .await
            .unwrap();
        let after = show_quotation(&store, &catalog, id).await.unwrap();

        assert!(after.totals.breakdown.energy.is_zero());
        assert!(after.totals.breakdown.machine.is_zero());
        assert!(after.totals.net_sale_total < before.totals.net_sale_total);
    }
}
