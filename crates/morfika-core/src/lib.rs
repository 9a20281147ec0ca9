//! # morfika-core: Pure Pricing Logic for 3D-Print Quotations
//!
//! This crate is the **heart** of the quotation engine. It turns raw
//! production inputs (filament, printer power draw, print time,
//! post-processing labor) into sale prices, and rolls saved quotations up
//! into day-by-day profit reports. Everything here is a pure function.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Quotation Engine Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Admin surface (web UI / CLI)                    │   │
//! │  │    Piece editor ──► Live totals ──► Save ──► Daily report       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ morfika-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌────────────┐  │   │
//! │  │   │   types   │  │  pricing  │  │  report   │  │ repository │  │   │
//! │  │   │ Printer   │  │ PieceCost │  │ DayBucket │  │  contract  │  │   │
//! │  │   │ Quotation │  │ Totals    │  │ GrandTotal│  │  (trait)   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 morfika-db (Persistence Layer)                  │   │
//! │  │         SQLite store, in-memory store, row mapping              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Printer profiles, print pieces, quotations, record ids
//! - [`money`] - Decimal-backed money type
//! - [`pricing`] - Per-piece and per-quotation cost/price formulas
//! - [`report`] - Day-bucketed financial reports
//! - [`repository`] - The persistence contract the core consumes
//! - [`validation`] - Input rules enforced before persisting
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Derived values are never stored**: every figure is recomputed from
//!    the saved inputs, so printer edits and formula changes apply to history.
//! 2. **Pricing never fails**: an unresolved printer contributes zero cost.
//! 3. **Exact decimals**: all money is `rust_decimal::Decimal`, never `f64`.
//!
//! ## Example Usage
//!
//! ```rust
//! use morfika_core::pricing::price_quotation;
//! use morfika_core::{Money, PrintPiece, PrinterConfig};
//! use rust_decimal_macros::dec;
//!
//! let printer = PrinterConfig::saved(
//!     uuid::Uuid::new_v4(),
//!     "Ender 3",
//!     dec!(400),
//!     Money::new(dec!(907)),
//!     Money::new(dec!(25)),
//! );
//!
//! let mut piece = PrintPiece::draft();
//! piece.mass_grams = dec!(50);
//! piece.print_minutes = dec!(120);
//! piece.printer_id = printer.id.existing();
//! piece.post_processing_minutes = dec!(0);
//!
//! let totals = price_quotation(&[piece], &[printer]);
//! assert_eq!(totals.net_sale_total.amount(), dec!(14747.449600));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod report;
pub mod repository;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use pricing::{CostBreakdown, PieceCosts, QuotationTotals};
pub use report::{DailyRow, DateRange, QuotationReport, ReportAggregator, ReportTotals};
pub use repository::{QuotationRepository, RepositoryError, RepositoryResult};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Material label a new piece starts with.
pub const DEFAULT_MATERIAL: &str = "PLA";

/// Filament price per kilogram a new piece starts with (PLA spool).
pub const DEFAULT_MATERIAL_COST_PER_KG: i64 = 70_000;

/// Post-processing minutes a new piece starts with (support removal).
pub const DEFAULT_POST_PROCESSING_MINUTES: i64 = 5;

/// Hourly labor rate for post-processing a new piece starts with.
pub const DEFAULT_POST_PROCESSING_HOURLY_RATE: i64 = 20_000;

/// Maximum length of a client name.
pub const MAX_CLIENT_NAME_LEN: usize = 200;

/// Maximum length of a printer name.
pub const MAX_PRINTER_NAME_LEN: usize = 100;
