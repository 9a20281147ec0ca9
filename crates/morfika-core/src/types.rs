//! # Domain Types
//!
//! Core domain types of the quotation engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────────┐        ┌──────────────────────────────┐      │
//! │  │    PrinterConfig     │        │          Quotation           │      │
//! │  │  ──────────────────  │        │  ──────────────────────────  │      │
//! │  │  id (RecordId)       │        │  id (RecordId)               │      │
//! │  │  name                │◄───┐   │  client_name                 │      │
//! │  │  power_draw_watts    │    │   │  created_at                  │      │
//! │  │  energy_unit_cost    │    │   │  pieces ─────────┐           │      │
//! │  │  machine_minute_cost │    │   └──────────────────┼───────────┘      │
//! │  └──────────────────────┘    │                      ▼                   │
//! │                              │   ┌──────────────────────────────┐      │
//! │                              │   │          PrintPiece          │      │
//! │                              └───│  printer_id (Option<Uuid>)   │      │
//! │                                  │  material, mass, minutes     │      │
//! │                                  │  post-processing inputs      │      │
//! │                                  └──────────────────────────────┘      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only inputs live here. Costs, margins and totals are derived on demand by
//! [`crate::pricing`] and never stored.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;
use crate::{
    DEFAULT_MATERIAL, DEFAULT_MATERIAL_COST_PER_KG, DEFAULT_POST_PROCESSING_HOURLY_RATE,
    DEFAULT_POST_PROCESSING_MINUTES,
};

// =============================================================================
// Record Identity
// =============================================================================

/// Identity of a persisted record.
///
/// A draft that was never saved is `New`; anything that came back from a
/// store is `Existing`. Stores decide between insert and update from this
/// alone.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS,
)]
#[serde(tag = "state", content = "id", rename_all = "snake_case")]
#[ts(export)]
pub enum RecordId {
    /// Not yet persisted.
    #[default]
    New,
    /// Persisted under this id.
    Existing(Uuid),
}

impl RecordId {
    /// Returns the stored id, if any.
    #[inline]
    pub fn existing(&self) -> Option<Uuid> {
        match self {
            RecordId::New => None,
            RecordId::Existing(id) => Some(*id),
        }
    }

    /// True for unsaved drafts.
    #[inline]
    pub fn is_new(&self) -> bool {
        matches!(self, RecordId::New)
    }
}

impl From<Uuid> for RecordId {
    fn from(id: Uuid) -> Self {
        RecordId::Existing(id)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::New => write!(f, "new"),
            RecordId::Existing(id) => write!(f, "{}", id),
        }
    }
}

// =============================================================================
// Printer Config
// =============================================================================

/// A printer's operating-cost profile.
///
/// Editing a profile changes the recomputed figures of every historical
/// quotation that references it. That is accepted behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PrinterConfig {
    #[serde(default)]
    pub id: RecordId,

    /// Display name (required).
    pub name: String,

    /// Rated consumption in watts.
    #[ts(type = "string")]
    pub power_draw_watts: Decimal,

    /// Electricity price per kWh.
    pub energy_unit_cost: Money,

    /// Amortized machine cost per minute of printing.
    pub machine_minute_cost: Money,
}

impl PrinterConfig {
    /// Creates an unsaved printer profile.
    pub fn new(
        name: impl Into<String>,
        power_draw_watts: Decimal,
        energy_unit_cost: Money,
        machine_minute_cost: Money,
    ) -> Self {
        PrinterConfig {
            id: RecordId::New,
            name: name.into(),
            power_draw_watts,
            energy_unit_cost,
            machine_minute_cost,
        }
    }

    /// Creates a profile that already exists in a store.
    pub fn saved(
        id: Uuid,
        name: impl Into<String>,
        power_draw_watts: Decimal,
        energy_unit_cost: Money,
        machine_minute_cost: Money,
    ) -> Self {
        PrinterConfig {
            id: RecordId::Existing(id),
            ..PrinterConfig::new(name, power_draw_watts, energy_unit_cost, machine_minute_cost)
        }
    }
}

// =============================================================================
// Print Piece
// =============================================================================

/// One item in a quotation.
///
/// All numeric inputs are non-negative (enforced by
/// [`crate::validation::validate_piece`] before persisting). A piece without a
/// printer, or whose printer no longer exists, simply carries no energy or
/// machine-time cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PrintPiece {
    /// Handle used by the editor; stores assign their own row ids.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    #[serde(default)]
    pub name: String,

    /// Opaque reference to an uploaded image. Carried, never interpreted.
    #[serde(default)]
    pub image_reference: Option<String>,

    /// Free-text material label (PLA, PETG, resin...).
    pub material: String,

    pub material_cost_per_kg: Money,

    /// Filament consumed, in grams.
    #[ts(type = "string")]
    pub mass_grams: Decimal,

    #[ts(type = "string")]
    pub print_minutes: Decimal,

    /// Printer the piece runs on; `None` means no printer costs apply.
    #[serde(default)]
    pub printer_id: Option<Uuid>,

    // -------------------------------------------------------------------------
    // Post-processing
    // -------------------------------------------------------------------------
    /// Price of a 200 ml primer can.
    #[serde(default)]
    pub primer_cost_per_200ml: Money,

    #[serde(default)]
    #[ts(type = "string")]
    pub primer_consumed_ml: Decimal,

    /// Flat sanding/paint cost.
    #[serde(default)]
    pub sanding_paint_cost: Money,

    #[serde(default)]
    #[ts(type = "string")]
    pub post_processing_minutes: Decimal,

    #[serde(default)]
    pub post_processing_hourly_rate: Money,
}

impl PrintPiece {
    /// A fresh piece as the editor offers it: PLA at the default spool
    /// price, five minutes of post-processing at the default hourly rate,
    /// everything else zero.
    pub fn draft() -> Self {
        PrintPiece {
            id: Uuid::new_v4(),
            name: String::new(),
            image_reference: None,
            material: DEFAULT_MATERIAL.to_string(),
            material_cost_per_kg: Money::from_units(DEFAULT_MATERIAL_COST_PER_KG),
            mass_grams: Decimal::ZERO,
            print_minutes: Decimal::ZERO,
            printer_id: None,
            primer_cost_per_200ml: Money::ZERO,
            primer_consumed_ml: Decimal::ZERO,
            sanding_paint_cost: Money::ZERO,
            post_processing_minutes: Decimal::from(DEFAULT_POST_PROCESSING_MINUTES),
            post_processing_hourly_rate: Money::from_units(DEFAULT_POST_PROCESSING_HOURLY_RATE),
        }
    }
}

impl Default for PrintPiece {
    fn default() -> Self {
        PrintPiece::draft()
    }
}

// =============================================================================
// Quotation
// =============================================================================

/// A client quotation: the unit of persistence.
///
/// Pieces have no lifecycle outside their quotation. Saving an existing
/// quotation replaces its whole piece list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Quotation {
    #[serde(default)]
    pub id: RecordId,

    pub client_name: String,

    #[serde(default)]
    pub pieces: Vec<PrintPiece>,

    /// Assigned by the store when the quotation is first created.
    #[ts(as = "String")]
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Quotation {
    /// Creates an unsaved quotation with no pieces.
    pub fn draft(client_name: impl Into<String>) -> Self {
        Quotation {
            id: RecordId::New,
            client_name: client_name.into(),
            pieces: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Combined filament mass of all pieces.
    pub fn total_filament_grams(&self) -> Decimal {
        self.pieces
            .iter()
            .fold(Decimal::ZERO, |acc, p| acc.saturating_add(p.mass_grams))
    }

    /// Number of pieces.
    #[inline]
    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
