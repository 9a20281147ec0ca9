//! # Validation Module
//!
//! Input rules enforced before a printer or quotation reaches a store.
//!
//! ## Where Validation Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  QuotationEditor::save()  ──► validate_quotation()  (fail fast, draft   │
//! │                                                      kept)              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  QuotationRepository impl ──► validate_quotation() / validate_printer() │
//! │           │                    → RepositoryError::ValidationFailed      │
//! │           ▼                                                             │
//! │  SQLite  ──► NOT NULL, foreign keys                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Pricing itself never validates: it prices whatever it is given.
//!
//! ## Usage
//! ```rust
//! use morfika_core::validation::{validate_client_name, validate_non_negative};
//! use rust_decimal_macros::dec;
//!
//! assert!(validate_client_name("Ana Pérez").is_ok());
//! assert!(validate_client_name("   ").is_err());
//! assert!(validate_non_negative("massGrams", dec!(-1)).is_err());
//! ```

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{PrintPiece, PrinterConfig, Quotation};
use crate::{MAX_CLIENT_NAME_LEN, MAX_PRINTER_NAME_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn validate_name(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a quotation's client name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
pub fn validate_client_name(name: &str) -> ValidationResult<()> {
    validate_name("clientName", name, MAX_CLIENT_NAME_LEN)
}

/// Validates a printer's display name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 100 characters
pub fn validate_printer_name(name: &str) -> ValidationResult<()> {
    validate_name("name", name, MAX_PRINTER_NAME_LEN)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Rejects quantities below zero.
pub fn validate_non_negative(field: &str, value: Decimal) -> ValidationResult<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::negative(field));
    }
    Ok(())
}

/// Rejects prices below zero.
pub fn validate_non_negative_money(field: &str, value: Money) -> ValidationResult<()> {
    if value.is_negative() {
        return Err(ValidationError::negative(field));
    }
    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates a printer profile before it is written.
pub fn validate_printer(printer: &PrinterConfig) -> ValidationResult<()> {
    validate_printer_name(&printer.name)?;
    validate_non_negative("powerDrawWatts", printer.power_draw_watts)?;
    validate_non_negative_money("energyUnitCost", printer.energy_unit_cost)?;
    validate_non_negative_money("machineMinuteCost", printer.machine_minute_cost)?;
    Ok(())
}

/// Validates every numeric input of a piece.
///
/// `position` is the piece's index in its quotation and ends up in the
/// field name (`pieces[2].massGrams`).
pub fn validate_piece(position: usize, piece: &PrintPiece) -> ValidationResult<()> {
    let field = |name: &str| format!("pieces[{}].{}", position, name);

    let quantities = [
        ("massGrams", piece.mass_grams),
        ("printMinutes", piece.print_minutes),
        ("primerConsumedMl", piece.primer_consumed_ml),
        ("postProcessingMinutes", piece.post_processing_minutes),
    ];
    for (name, value) in quantities {
        validate_non_negative(&field(name), value)?;
    }

    let prices = [
        ("materialCostPerKg", piece.material_cost_per_kg),
        ("primerCostPer200ml", piece.primer_cost_per_200ml),
        ("sandingPaintCost", piece.sanding_paint_cost),
        ("postProcessingHourlyRate", piece.post_processing_hourly_rate),
    ];
    for (name, value) in prices {
        validate_non_negative_money(&field(name), value)?;
    }

    Ok(())
}

/// Validates a quotation and all of its pieces.
pub fn validate_quotation(quotation: &Quotation) -> ValidationResult<()> {
    validate_client_name(&quotation.client_name)?;
    for (position, piece) in quotation.pieces.iter().enumerate() {
        validate_piece(position, piece)?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
