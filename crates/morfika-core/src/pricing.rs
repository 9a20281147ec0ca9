//! # Pricing Engine
//!
//! Deterministic cost and price computation for print pieces and quotations.
//! Every function here is pure and infallible: a missing or unresolved
//! printer contributes zero energy and machine cost instead of failing.
//!
//! ## Piece Pricing Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        price_piece()                                    │
//! │                                                                         │
//! │  material   = cost_per_kg / 1000 × grams                                │
//! │  energy     = watts / 1000 × minutes / 60 × cost_per_kWh   (0 w/o printer)
//! │  machine    = minutes × cost_per_minute                    (0 w/o printer)
//! │  surcharge  = 30% × (material + energy + machine)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  base       = material + energy + machine + surcharge                   │
//! │  print_cost = base × (1 + margin_rate(grams))                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  post       = primer/200 × ml + sanding_paint + minutes/60 × hourly     │
//! │  sale_price = print_cost + post                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Margin Curve
//! ```text
//!  margin
//!  170% ┤■■■■
//!       │
//!   59% ┤    ╲
//!       │      ╲  0.60 − grams × 0.0006
//!   15% ┤        ╲       ■■■■■■■■■■■■■  (flat from 900 g)
//!    6% ┤          ╲____│
//!       └────┬──────────┬────────────── grams
//!           20         900
//! ```
//! The step from ~6% back up to 15% at exactly 900 g is intentional and is
//! not smoothed.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;
use crate::types::{PrintPiece, PrinterConfig};

// =============================================================================
// Constants
// =============================================================================

/// Contingency for failed or aborted prints, applied to the production base.
pub const FAILURE_SURCHARGE_RATE: Decimal = dec!(0.30);

/// Pieces lighter than this get the small-piece margin.
pub const SMALL_PIECE_MAX_GRAMS: Decimal = dec!(20);

/// Pieces at or above this mass get the flat bulk margin.
pub const BULK_PIECE_MIN_GRAMS: Decimal = dec!(900);

/// Margin for pieces under 20 g (170%).
pub const SMALL_PIECE_MARGIN: Decimal = dec!(1.70);

/// Starting point of the linear margin between 20 g and 900 g (60%).
pub const LINEAR_MARGIN_BASE: Decimal = dec!(0.60);

/// Margin lost per gram between 20 g and 900 g.
pub const LINEAR_MARGIN_SLOPE: Decimal = dec!(0.0006);

/// Margin for pieces of 900 g and more (15%).
pub const BULK_PIECE_MARGIN: Decimal = dec!(0.15);

/// Group discount earned per kilogram of combined filament (10%).
pub const GROUP_DISCOUNT_PER_KG: Decimal = dec!(0.10);

/// Ceiling of the group discount (10%).
pub const GROUP_DISCOUNT_CAP: Decimal = dec!(0.10);

/// Size of the primer can the primer price refers to.
const PRIMER_CAN_ML: Decimal = dec!(200);

const GRAMS_PER_KG: Decimal = dec!(1000);
const WATTS_PER_KW: Decimal = dec!(1000);
const MINUTES_PER_HOUR: Decimal = dec!(60);

// =============================================================================
// Per-Piece Formulas
// =============================================================================

/// Finds the printer a piece references. Unknown or absent ids resolve to
/// `None`, which prices as "no printer".
pub fn resolve_printer(printers: &[PrinterConfig], printer_id: Option<Uuid>) -> Option<&PrinterConfig> {
    let id = printer_id?;
    printers.iter().find(|p| p.id.existing() == Some(id))
}

/// Filament price per gram.
#[inline]
pub fn cost_per_gram(material_cost_per_kg: Money) -> Money {
    material_cost_per_kg / GRAMS_PER_KG
}

/// Cost of the filament a piece consumes.
///
/// ## Example
/// ```rust
/// use morfika_core::pricing::material_cost;
/// use morfika_core::Money;
/// use rust_decimal_macros::dec;
///
/// let cost = material_cost(Money::new(dec!(70000)), dec!(50));
/// assert_eq!(cost.amount(), dec!(3500));
/// ```
#[inline]
pub fn material_cost(material_cost_per_kg: Money, mass_grams: Decimal) -> Money {
    cost_per_gram(material_cost_per_kg) * mass_grams
}

/// Electricity consumed while printing: kWh used × price per kWh.
pub fn energy_cost(printer: Option<&PrinterConfig>, print_minutes: Decimal) -> Money {
    let Some(printer) = printer else {
        return Money::ZERO;
    };
    let kwh = (printer.power_draw_watts / WATTS_PER_KW).saturating_mul(print_minutes / MINUTES_PER_HOUR);
    printer.energy_unit_cost * kwh
}

/// Machine wear: minutes of use × cost per minute.
pub fn machine_cost(printer: Option<&PrinterConfig>, print_minutes: Decimal) -> Money {
    match printer {
        Some(printer) => printer.machine_minute_cost * print_minutes,
        None => Money::ZERO,
    }
}

/// Fixed 30% contingency on the pre-margin production base.
#[inline]
pub fn failure_surcharge(material: Money, energy: Money, machine: Money) -> Money {
    (material + energy + machine) * FAILURE_SURCHARGE_RATE
}

/// Markup applied to a piece's production base, by filament mass.
///
/// ## Example
/// ```rust
/// use morfika_core::pricing::margin_rate;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(margin_rate(dec!(19)), dec!(1.70));
/// assert_eq!(margin_rate(dec!(50)), dec!(0.57));
/// assert_eq!(margin_rate(dec!(900)), dec!(0.15));
/// ```
pub fn margin_rate(mass_grams: Decimal) -> Decimal {
    if mass_grams < SMALL_PIECE_MAX_GRAMS {
        SMALL_PIECE_MARGIN
    } else if mass_grams < BULK_PIECE_MIN_GRAMS {
        LINEAR_MARGIN_BASE - mass_grams * LINEAR_MARGIN_SLOPE
    } else {
        BULK_PIECE_MARGIN
    }
}

/// Primer cost: price per ml of a 200 ml can × ml used.
#[inline]
pub fn primer_cost(primer_cost_per_200ml: Money, primer_consumed_ml: Decimal) -> Money {
    (primer_cost_per_200ml / PRIMER_CAN_ML) * primer_consumed_ml
}

/// Labor cost of post-processing at an hourly rate.
#[inline]
pub fn post_processing_labor(minutes: Decimal, hourly_rate: Money) -> Money {
    hourly_rate * (minutes / MINUTES_PER_HOUR)
}

/// Full post-processing cost of a piece (primer + sanding/paint + labor).
pub fn post_processing_cost(piece: &PrintPiece) -> Money {
    primer_cost(piece.primer_cost_per_200ml, piece.primer_consumed_ml)
        + piece.sanding_paint_cost
        + post_processing_labor(piece.post_processing_minutes, piece.post_processing_hourly_rate)
}

/// Group discount rate for a quotation.
///
/// 10% per kilogram of combined filament, capped at 10%, and only for
/// quotations with more than one piece.
///
/// ## Example
/// ```rust
/// use morfika_core::pricing::group_discount_rate;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(group_discount_rate(dec!(500), 2), dec!(0.05));
/// assert_eq!(group_discount_rate(dec!(5000), 2), dec!(0.10));
/// assert_eq!(group_discount_rate(dec!(5000), 1), dec!(0));
/// ```
pub fn group_discount_rate(total_filament_grams: Decimal, item_count: usize) -> Decimal {
    if item_count <= 1 {
        return Decimal::ZERO;
    }
    ((total_filament_grams / GRAMS_PER_KG) * GROUP_DISCOUNT_PER_KG).min(GROUP_DISCOUNT_CAP)
}

// =============================================================================
// Cost Breakdown
// =============================================================================

/// Production cost split by category.
///
/// Summed per piece, per quotation and per report row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CostBreakdown {
    pub material: Money,
    pub energy: Money,
    pub machine: Money,
    pub failure_surcharge: Money,
    pub primer: Money,
    pub sanding_paint: Money,
    pub post_processing_labor: Money,
}

impl CostBreakdown {
    /// Material + energy + machine + failure surcharge.
    pub fn print_production(&self) -> Money {
        self.material + self.energy + self.machine + self.failure_surcharge
    }

    /// Primer + sanding/paint + labor.
    pub fn post_processing(&self) -> Money {
        self.primer + self.sanding_paint + self.post_processing_labor
    }

    /// Every category combined.
    pub fn total(&self) -> Money {
        self.print_production() + self.post_processing()
    }
}

impl AddAssign for CostBreakdown {
    fn add_assign(&mut self, other: Self) {
        self.material += other.material;
        self.energy += other.energy;
        self.machine += other.machine;
        self.failure_surcharge += other.failure_surcharge;
        self.primer += other.primer;
        self.sanding_paint += other.sanding_paint;
        self.post_processing_labor += other.post_processing_labor;
    }
}

// =============================================================================
// Piece Costs
// =============================================================================

/// Every derived figure of one piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PieceCosts {
    pub piece_id: Uuid,
    pub cost_per_gram: Money,
    pub breakdown: CostBreakdown,
    #[ts(type = "string")]
    pub margin_rate: Decimal,
    /// Production base with margin applied.
    pub print_cost: Money,
    pub post_processing_cost: Money,
    /// Price the client sees for this piece before any group discount.
    pub sale_price: Money,
}

impl PieceCosts {
    /// Material + energy + machine + failure surcharge (no margin).
    #[inline]
    pub fn print_production_cost(&self) -> Money {
        self.breakdown.print_production()
    }
}

/// Prices one piece against the known printer profiles.
pub fn price_piece(piece: &PrintPiece, printers: &[PrinterConfig]) -> PieceCosts {
    let printer = resolve_printer(printers, piece.printer_id);

    let material = material_cost(piece.material_cost_per_kg, piece.mass_grams);
    let energy = energy_cost(printer, piece.print_minutes);
    let machine = machine_cost(printer, piece.print_minutes);
    let surcharge = failure_surcharge(material, energy, machine);
    let margin = margin_rate(piece.mass_grams);

    let base = material + energy + machine + surcharge;
    let print_cost = base * (Decimal::ONE + margin);

    let primer = primer_cost(piece.primer_cost_per_200ml, piece.primer_consumed_ml);
    let labor = post_processing_labor(piece.post_processing_minutes, piece.post_processing_hourly_rate);
    let post = primer + piece.sanding_paint_cost + labor;

    PieceCosts {
        piece_id: piece.id,
        cost_per_gram: cost_per_gram(piece.material_cost_per_kg),
        breakdown: CostBreakdown {
            material,
            energy,
            machine,
            failure_surcharge: surcharge,
            primer,
            sanding_paint: piece.sanding_paint_cost,
            post_processing_labor: labor,
        },
        margin_rate: margin,
        print_cost,
        post_processing_cost: post,
        sale_price: print_cost + post,
    }
}

// =============================================================================
// Quotation Totals
// =============================================================================

/// Every derived figure of a quotation.
///
/// ## Two Profit Figures
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  editor_profit = net_sale − Σ print production                          │
/// │                  (post-processing cost NOT subtracted)                  │
/// │                                                                         │
/// │  report_profit = net_sale − (Σ print production + Σ post-processing)    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
/// KNOWN INCONSISTENCY: the live editor and the historical report disagree
/// on profit whenever a quotation has post-processing. Both figures are kept
/// exactly as the shop uses them; reconciling them is a product decision.
/// Never collapse them into one "profit".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct QuotationTotals {
    pub pieces: Vec<PieceCosts>,
    #[ts(type = "string")]
    pub total_filament_grams: Decimal,
    /// Σ piece sale prices.
    pub gross_sale_total: Money,
    #[ts(type = "string")]
    pub group_discount_rate: Decimal,
    /// Gross sale after the group discount: what the client pays.
    pub net_sale_total: Money,
    /// Σ (material + energy + machine + failure surcharge).
    pub print_production_cost: Money,
    /// Σ (primer + sanding/paint + labor).
    pub post_processing_cost: Money,
    pub breakdown: CostBreakdown,
    /// Profit shown in the live quotation editor.
    pub editor_profit: Money,
    /// Profit shown in the historical report.
    pub report_profit: Money,
}

impl QuotationTotals {
    /// Print production + post-processing.
    pub fn total_production_cost(&self) -> Money {
        self.print_production_cost + self.post_processing_cost
    }
}

/// Prices a whole quotation.
///
/// ## Example
/// ```rust
/// use morfika_core::pricing::price_quotation;
/// use morfika_core::PrintPiece;
/// use rust_decimal_macros::dec;
///
/// let mut a = PrintPiece::draft();
/// a.mass_grams = dec!(250);
/// let mut b = PrintPiece::draft();
/// b.mass_grams = dec!(250);
///
/// let totals = price_quotation(&[a, b], &[]);
/// assert_eq!(totals.group_discount_rate, dec!(0.05));
/// ```
pub fn price_quotation(pieces: &[PrintPiece], printers: &[PrinterConfig]) -> QuotationTotals {
    let costs: Vec<PieceCosts> = pieces.iter().map(|p| price_piece(p, printers)).collect();

    let total_filament_grams = pieces
        .iter()
        .fold(Decimal::ZERO, |acc, p| acc.saturating_add(p.mass_grams));
    let gross_sale_total: Money = costs.iter().map(|c| c.sale_price).sum();
    let discount = group_discount_rate(total_filament_grams, pieces.len());
    let net_sale_total = gross_sale_total.apply_discount(discount);

    let mut breakdown = CostBreakdown::default();
    for c in &costs {
        breakdown += c.breakdown;
    }

    let print_production_cost: Money = costs.iter().map(|c| c.print_production_cost()).sum();
    let post_processing_cost: Money = costs.iter().map(|c| c.post_processing_cost).sum();

    QuotationTotals {
        pieces: costs,
        total_filament_grams,
        gross_sale_total,
        group_discount_rate: discount,
        net_sale_total,
        print_production_cost,
        post_processing_cost,
        breakdown,
        // Post-processing deliberately left out here; see the type docs.
        editor_profit: net_sale_total - print_production_cost,
        report_profit: net_sale_total - (print_production_cost + post_processing_cost),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecordId;

    fn test_printer() -> PrinterConfig {
        PrinterConfig::saved(
            Uuid::new_v4(),
            "Ender 3 V2",
            dec!(400),
            Money::new(dec!(907)),
            Money::new(dec!(25)),
        )
    }

    /// 50 g / 120 min piece on the reference printer, no post-processing.
    fn reference_piece(printer: &PrinterConfig) -> PrintPiece {
        PrintPiece {
            name: "Soporte celular".to_string(),
            material_cost_per_kg: Money::from_units(70_000),
            mass_grams: dec!(50),
            print_minutes: dec!(120),
            printer_id: printer.id.existing(),
            post_processing_minutes: Decimal::ZERO,
            post_processing_hourly_rate: Money::ZERO,
            ..PrintPiece::draft()
        }
    }

    fn piece_with_mass(grams: Decimal) -> PrintPiece {
        PrintPiece {
            mass_grams: grams,
            ..PrintPiece::draft()
        }
    }

    #[test]
    fn test_margin_boundaries() {
        assert_eq!(margin_rate(dec!(0)), dec!(1.70));
        assert_eq!(margin_rate(dec!(19)), dec!(1.70));
        assert_eq!(margin_rate(dec!(19.999)), dec!(1.70));
        assert_eq!(margin_rate(dec!(20)), dec!(0.588));
        assert_eq!(margin_rate(dec!(899)), dec!(0.0606));
        assert_eq!(margin_rate(dec!(900)), dec!(0.15));
        assert_eq!(margin_rate(dec!(5000)), dec!(0.15));
    }

    #[test]
    fn test_margin_jumps_up_at_900_grams() {
        let below = margin_rate(dec!(899.9));
        let at = margin_rate(dec!(900));
        assert!(below < dec!(0.061));
        assert_eq!(at, dec!(0.15));
        assert!(at > below);
    }

    #[test]
    fn test_group_discount() {
        assert_eq!(group_discount_rate(dec!(500), 2), dec!(0.05));
        assert_eq!(group_discount_rate(dec!(1000), 2), dec!(0.10));
        assert_eq!(group_discount_rate(dec!(5000), 2), dec!(0.10));
        assert_eq!(group_discount_rate(dec!(5000), 1), Decimal::ZERO);
        assert_eq!(group_discount_rate(dec!(300), 0), Decimal::ZERO);
    }

    #[test]
    fn test_reference_piece_end_to_end() {
        let printer = test_printer();
        let piece = reference_piece(&printer);

        let costs = price_piece(&piece, std::slice::from_ref(&printer));

        assert_eq!(costs.cost_per_gram.amount(), dec!(70));
        assert_eq!(costs.breakdown.material.amount(), dec!(3500));
        assert_eq!(costs.breakdown.energy.amount(), dec!(725.6));
        assert_eq!(costs.breakdown.machine.amount(), dec!(3000));
        assert_eq!(costs.breakdown.failure_surcharge.amount(), dec!(2167.68));
        assert_eq!(costs.margin_rate, dec!(0.57));
        assert_eq!(costs.print_cost.amount(), dec!(14747.4496));
        assert_eq!(costs.print_cost.rounded().amount(), dec!(14747));
        assert!(costs.post_processing_cost.is_zero());
        assert_eq!(costs.sale_price, costs.print_cost);
    }

    #[test]
    fn test_unresolved_printer_costs_nothing() {
        let printer = test_printer();
        let mut piece = reference_piece(&printer);
        piece.printer_id = Some(Uuid::new_v4());

        let costs = price_piece(&piece, &[printer]);
        assert!(costs.breakdown.energy.is_zero());
        assert!(costs.breakdown.machine.is_zero());
        assert_eq!(costs.breakdown.material.amount(), dec!(3500));
        assert_eq!(costs.breakdown.failure_surcharge.amount(), dec!(1050));
    }

    #[test]
    fn test_unsaved_printer_never_resolves() {
        let draft_printer = PrinterConfig::new("Draft", dec!(400), Money::from_units(907), Money::from_units(25));
        assert_eq!(draft_printer.id, RecordId::New);
        assert!(resolve_printer(&[draft_printer], Some(Uuid::nil())).is_none());
        assert!(resolve_printer(&[], None).is_none());
    }

    #[test]
    fn test_post_processing_cost() {
        let piece = PrintPiece {
            primer_cost_per_200ml: Money::from_units(30_000),
            primer_consumed_ml: dec!(20),
            sanding_paint_cost: Money::from_units(4_000),
            post_processing_minutes: dec!(90),
            post_processing_hourly_rate: Money::from_units(20_000),
            ..PrintPiece::draft()
        };

        // 3000 primer + 4000 flat + 30000 labor
        assert_eq!(post_processing_cost(&piece).amount(), dec!(37000));

        let costs = price_piece(&piece, &[]);
        assert_eq!(costs.breakdown.primer.amount(), dec!(3000));
        assert_eq!(costs.breakdown.sanding_paint.amount(), dec!(4000));
        assert_eq!(costs.breakdown.post_processing_labor.amount(), dec!(30000));
        assert_eq!(costs.breakdown.post_processing(), costs.post_processing_cost);
    }

    #[test]
    fn test_single_piece_never_discounted() {
        let totals = price_quotation(&[piece_with_mass(dec!(2500))], &[]);
        assert!(totals.group_discount_rate.is_zero());
        assert_eq!(totals.net_sale_total, totals.gross_sale_total);
    }

    #[test]
    fn test_quotation_totals_and_both_profits() {
        let printer = test_printer();
        let mut a = reference_piece(&printer);
        a.sanding_paint_cost = Money::from_units(2_000);
        let mut b = reference_piece(&printer);
        b.mass_grams = dec!(450);

        let totals = price_quotation(&[a.clone(), b.clone()], std::slice::from_ref(&printer));
        let ca = price_piece(&a, std::slice::from_ref(&printer));
        let cb = price_piece(&b, std::slice::from_ref(&printer));

        assert_eq!(totals.total_filament_grams, dec!(500));
        assert_eq!(totals.group_discount_rate, dec!(0.05));
        assert_eq!(totals.gross_sale_total, ca.sale_price + cb.sale_price);
        assert_eq!(
            totals.net_sale_total.amount(),
            totals.gross_sale_total.amount() * dec!(0.95)
        );

        let print_prod = ca.print_production_cost() + cb.print_production_cost();
        assert_eq!(totals.print_production_cost, print_prod);
        assert_eq!(totals.post_processing_cost.amount(), dec!(2000));
        assert_eq!(totals.editor_profit, totals.net_sale_total - print_prod);
        assert_eq!(
            totals.report_profit,
            totals.net_sale_total - print_prod - Money::from_units(2_000)
        );
        assert_eq!(totals.editor_profit - totals.report_profit, totals.post_processing_cost);
        assert_eq!(totals.breakdown.total(), totals.total_production_cost());
    }

    #[test]
    fn test_empty_quotation_is_all_zero() {
        let totals = price_quotation(&[], &[]);
        assert!(totals.pieces.is_empty());
        assert!(totals.net_sale_total.is_zero());
        assert!(totals.editor_profit.is_zero());
        assert!(totals.report_profit.is_zero());
    }

    #[test]
    fn test_recomputation_is_idempotent() {
        let printer = test_printer();
        let pieces = vec![
            reference_piece(&printer),
            PrintPiece {
                print_minutes: dec!(47),
                mass_grams: dec!(333.3),
                printer_id: printer.id.existing(),
                ..PrintPiece::draft()
            },
        ];
        let printers = vec![printer];

        let first = price_quotation(&pieces, &printers);
        let second = price_quotation(&pieces, &printers);
        assert_eq!(first, second);
    }

    fn power_of_ten(exp: u32) -> Decimal {
        Decimal::from_i128_with_scale(10i128.pow(exp), 0)
    }

    #[test]
    fn test_extreme_inputs_saturate_instead_of_panicking() {
        let printer = PrinterConfig::saved(
            Uuid::new_v4(),
            "Industrial",
            power_of_ten(25),
            Money::new(power_of_ten(25)),
            Money::new(power_of_ten(25)),
        );
        let piece = PrintPiece {
            material_cost_per_kg: Money::new(power_of_ten(20)),
            mass_grams: power_of_ten(15),
            print_minutes: power_of_ten(25),
            printer_id: printer.id.existing(),
            ..PrintPiece::draft()
        };
        let heavy = PrintPiece {
            mass_grams: Decimal::MAX,
            ..piece.clone()
        };

        let totals = price_quotation(&[piece, heavy], std::slice::from_ref(&printer));

        assert_eq!(totals.total_filament_grams, Decimal::MAX);
        assert_eq!(totals.gross_sale_total.amount(), Decimal::MAX);
        assert_eq!(totals.group_discount_rate, GROUP_DISCOUNT_CAP);
        assert!(totals.net_sale_total < totals.gross_sale_total);
        assert!(totals.pieces.iter().all(|c| c.breakdown.energy.amount() == Decimal::MAX));
    }
}
