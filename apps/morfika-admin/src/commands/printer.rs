//! # Printer Commands
//!
//! CRUD over printer cost profiles.
//!
//! Editing a profile changes the figures of every saved quotation whose
//! pieces reference it, since quotations are always re-priced from the
//! current profiles.

use morfika_core::{Money, PrinterConfig, QuotationRepository, RecordId};
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::state::PrinterCatalog;

/// Fields to change on an existing printer. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct PrinterPatch {
    pub name: Option<String>,
    pub power_draw_watts: Option<Decimal>,
    pub energy_unit_cost: Option<Decimal>,
    pub machine_minute_cost: Option<Decimal>,
}

impl PrinterPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.power_draw_watts.is_none()
            && self.energy_unit_cost.is_none()
            && self.machine_minute_cost.is_none()
    }

    fn apply(self, printer: &mut PrinterConfig) {
        if let Some(name) = self.name {
            printer.name = name;
        }
        if let Some(watts) = self.power_draw_watts {
            printer.power_draw_watts = watts;
        }
        if let Some(cost) = self.energy_unit_cost {
            printer.energy_unit_cost = Money::new(cost);
        }
        if let Some(cost) = self.machine_minute_cost {
            printer.machine_minute_cost = Money::new(cost);
        }
    }
}

/// Lists all printers, ordered by name.
pub async fn list_printers(
    store: &dyn QuotationRepository,
    catalog: &PrinterCatalog,
) -> AppResult<Vec<PrinterConfig>> {
    debug!("list_printers command");
    catalog.refresh_printers(store).await?;
    Ok(catalog.printers())
}

/// Creates a printer profile and returns it as stored.
pub async fn add_printer(
    store: &dyn QuotationRepository,
    catalog: &PrinterCatalog,
    printer: PrinterConfig,
) -> AppResult<PrinterConfig> {
    debug!(name = %printer.name, "add_printer command");
    let printer = PrinterConfig {
        id: RecordId::New,
        ..printer
    };
    let id = catalog.save_printer(store, &printer).await?;
    info!(id = %id, name = %printer.name, "Printer created");
    Ok(stored_printer(catalog, id, printer))
}

/// Changes the given fields of printer `id`.
pub async fn update_printer(
    store: &dyn QuotationRepository,
    catalog: &PrinterCatalog,
    id: Uuid,
    patch: PrinterPatch,
) -> AppResult<PrinterConfig> {
    debug!(id = %id, "update_printer command");
    if patch.is_empty() {
        return Err(AppError::validation("Nothing to update"));
    }

    catalog.refresh_printers(store).await?;
    let mut printer = find_printer(catalog, id)?;
    patch.apply(&mut printer);

    catalog.save_printer(store, &printer).await?;
    info!(id = %id, "Printer updated");
    Ok(stored_printer(catalog, id, printer))
}

/// Deletes printer `id`. Pieces that ran on it become unassigned.
pub async fn delete_printer(
    store: &dyn QuotationRepository,
    catalog: &PrinterCatalog,
    id: Uuid,
) -> AppResult<()> {
    debug!(id = %id, "delete_printer command");
    catalog.delete_printer(store, id).await?;
    info!(id = %id, "Printer deleted");
    Ok(())
}

/// The printer as reloaded from the store, or `written` under its new id
/// when the reload after the write did not go through.
fn stored_printer(catalog: &PrinterCatalog, id: Uuid, written: PrinterConfig) -> PrinterConfig {
    find_printer(catalog, id).unwrap_or(PrinterConfig {
        id: RecordId::Existing(id),
        ..written
    })
}

fn find_printer(catalog: &PrinterCatalog, id: Uuid) -> AppResult<PrinterConfig> {
    catalog
        .with_catalog(|c| {
            c.printers
                .iter()
                .find(|p| p.id.existing() == Some(id))
                .cloned()
        })
        .ok_or_else(|| AppError::not_found("Printer", id))
}
