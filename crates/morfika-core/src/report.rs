//! # Report Aggregation
//!
//! Rolls saved quotations up into per-day financial rows plus a grand total.
//!
//! ## Aggregation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  quotations ──► filter by DateRange (local time, inclusive)             │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │             price_quotation() with CURRENT printer profiles             │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │             bucket by local calendar date (BTreeMap<NaiveDate, _>)      │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │             rows newest-first  +  grand total                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Figures are recomputed on every build: editing a printer's costs changes
//! the report for every quotation that references it.
//!
//! Profit here is the REPORT profit (net sale minus print production minus
//! post-processing), which differs from the editor profit. See
//! [`crate::pricing::QuotationTotals`].
//!
//! The time zone is injected so tests stay deterministic. Production code
//! uses [`ReportAggregator::local`].

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::money::{saturating_div, Money};
use crate::pricing::{price_quotation, CostBreakdown, QuotationTotals};
use crate::types::{PrinterConfig, Quotation};

// =============================================================================
// Date Range
// =============================================================================

/// Inclusive calendar-day window. A missing bound is unbounded.
///
/// `from` starts at 00:00 and `to` covers its whole day up to the next
/// midnight, both in the aggregator's time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DateRange {
    #[ts(as = "Option<String>")]
    pub from: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// No bounds at all.
    pub fn all() -> Self {
        DateRange::default()
    }

    pub fn between(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        DateRange { from, to }
    }

    /// First day of `today`'s month through `today`.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::NaiveDate;
    /// use morfika_core::DateRange;
    ///
    /// let today = NaiveDate::from_ymd_opt(2024, 3, 17).unwrap();
    /// let range = DateRange::month_to_date(today);
    /// assert_eq!(range.from, NaiveDate::from_ymd_opt(2024, 3, 1));
    /// assert_eq!(range.to, Some(today));
    /// ```
    pub fn month_to_date(today: NaiveDate) -> Self {
        DateRange {
            from: today.with_day(1),
            to: Some(today),
        }
    }

    /// Whether a local timestamp falls inside the window.
    pub fn contains(&self, local: NaiveDateTime) -> bool {
        if let Some(from) = self.from {
            if local < from.and_time(NaiveTime::MIN) {
                return false;
            }
        }
        if let Some(to) = self.to {
            // Half-open against the next midnight, so sub-millisecond
            // timestamps late on `to` still count.
            if let Some(next_day) = to.succ_opt() {
                if local >= next_day.and_time(NaiveTime::MIN) {
                    return false;
                }
            }
        }
        true
    }
}

// =============================================================================
// Report Totals
// =============================================================================

/// Accumulated figures for a set of quotations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReportTotals {
    pub quotation_count: u32,
    pub net_sale_total: Money,
    pub print_production_cost: Money,
    pub post_processing_cost: Money,
    /// Net sale minus print production minus post-processing.
    pub net_profit: Money,
    pub breakdown: CostBreakdown,
    /// `net_profit / net_sale_total × 100`, or 0 when there are no sales.
    #[ts(type = "string")]
    pub margin_percent: Decimal,
}

impl ReportTotals {
    /// Folds one priced quotation in.
    pub fn add(&mut self, totals: &QuotationTotals) {
        self.quotation_count += 1;
        self.net_sale_total += totals.net_sale_total;
        self.print_production_cost += totals.print_production_cost;
        self.post_processing_cost += totals.post_processing_cost;
        self.net_profit += totals.report_profit;
        self.breakdown += totals.breakdown;
        self.refresh_margin();
    }

    /// Folds another accumulator in.
    pub fn merge(&mut self, other: &ReportTotals) {
        self.quotation_count += other.quotation_count;
        self.net_sale_total += other.net_sale_total;
        self.print_production_cost += other.print_production_cost;
        self.post_processing_cost += other.post_processing_cost;
        self.net_profit += other.net_profit;
        self.breakdown += other.breakdown;
        self.refresh_margin();
    }

    fn refresh_margin(&mut self) {
        self.margin_percent = if self.net_sale_total.is_zero() {
            Decimal::ZERO
        } else {
            saturating_div(self.net_profit.amount(), self.net_sale_total.amount())
                .saturating_mul(Decimal::ONE_HUNDRED)
        };
    }
}

// =============================================================================
// Report Rows
// =============================================================================

/// One calendar day of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DailyRow {
    #[ts(as = "String")]
    pub date: NaiveDate,
    #[serde(flatten)]
    pub totals: ReportTotals,
}

/// The finished report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct QuotationReport {
    pub range: DateRange,
    /// Newest day first. Days without quotations are omitted.
    pub days: Vec<DailyRow>,
    pub grand_total: ReportTotals,
}

impl QuotationReport {
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

// =============================================================================
// Aggregator
// =============================================================================

/// Builds reports in a fixed time zone.
#[derive(Debug, Clone)]
pub struct ReportAggregator<Tz: TimeZone> {
    tz: Tz,
}

impl ReportAggregator<Local> {
    /// Aggregator bucketing by the machine's local time zone.
    pub fn local() -> Self {
        ReportAggregator { tz: Local }
    }
}

impl<Tz: TimeZone> ReportAggregator<Tz> {
    pub fn new(tz: Tz) -> Self {
        ReportAggregator { tz }
    }

    /// Local wall-clock time of a stored timestamp.
    pub fn local_datetime(&self, at: &DateTime<Utc>) -> NaiveDateTime {
        at.with_timezone(&self.tz).naive_local()
    }

    /// Month-to-date window as of `now`, in this aggregator's zone.
    pub fn month_to_date(&self, now: &DateTime<Utc>) -> DateRange {
        DateRange::month_to_date(self.local_datetime(now).date())
    }

    /// Month-to-date window as of the current instant.
    pub fn current_month(&self) -> DateRange {
        self.month_to_date(&Utc::now())
    }

    /// Aggregates `quotations` inside `range`, priced against `printers`.
    pub fn build(
        &self,
        quotations: &[Quotation],
        printers: &[PrinterConfig],
        range: DateRange,
    ) -> QuotationReport {
        let mut buckets: BTreeMap<NaiveDate, ReportTotals> = BTreeMap::new();

        for quotation in quotations {
            let local = self.local_datetime(&quotation.created_at);
            if !range.contains(local) {
                continue;
            }
            let totals = price_quotation(&quotation.pieces, printers);
            buckets.entry(local.date()).or_default().add(&totals);
        }

        let mut grand_total = ReportTotals::default();
        let days = buckets
            .into_iter()
            .rev()
            .map(|(date, totals)| {
                grand_total.merge(&totals);
                DailyRow { date, totals }
            })
            .collect();

        QuotationReport {
            range,
            days,
            grand_total,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PrintPiece, RecordId};
    use chrono::FixedOffset;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn quotation(created_at: DateTime<Utc>, grams: Decimal) -> Quotation {
        let piece = PrintPiece {
            mass_grams: grams,
            post_processing_minutes: Decimal::ZERO,
            ..PrintPiece::draft()
        };
        Quotation {
            id: RecordId::Existing(Uuid::new_v4()),
            client_name: "Cliente".to_string(),
            pieces: vec![piece],
            created_at,
        }
    }

    fn utc_aggregator() -> ReportAggregator<Utc> {
        ReportAggregator::new(Utc)
    }

    #[test]
    fn test_range_bounds_are_inclusive_whole_days() {
        let range = DateRange::between(Some(date(2024, 3, 1)), Some(date(2024, 3, 31)));
        let start = date(2024, 3, 1).and_hms_opt(0, 0, 0).unwrap();
        let end = date(2024, 3, 31).and_hms_milli_opt(23, 59, 59, 999).unwrap();

        assert!(range.contains(start));
        assert!(range.contains(end));
        let last_micro = date(2024, 3, 31).and_hms_micro_opt(23, 59, 59, 999_999).unwrap();
        assert!(range.contains(last_micro));
        assert!(!range.contains(date(2024, 2, 29).and_hms_opt(23, 59, 59).unwrap()));
        assert!(!range.contains(date(2024, 4, 1).and_hms_opt(0, 0, 0).unwrap()));
        assert!(DateRange::all().contains(start));
    }

    #[test]
    fn test_same_day_quotations_share_a_bucket() {
        let printer = PrinterConfig::saved(
            Uuid::new_v4(),
            "Ender 3",
            dec!(400),
            Money::from_units(907),
            Money::from_units(25),
        );
        let printers = std::slice::from_ref(&printer);

        let mut morning = quotation(at(2024, 3, 10, 9, 0), dec!(100));
        morning.pieces[0].printer_id = printer.id.existing();
        morning.pieces.push(PrintPiece {
            mass_grams: dec!(15),
            primer_cost_per_200ml: Money::from_units(12_000),
            primer_consumed_ml: dec!(20),
            sanding_paint_cost: Money::from_units(3_000),
            printer_id: printer.id.existing(),
            ..PrintPiece::draft()
        });
        let mut evening = quotation(at(2024, 3, 10, 18, 30), dec!(950));
        evening.pieces.push(PrintPiece {
            mass_grams: dec!(400),
            print_minutes: dec!(300),
            printer_id: printer.id.existing(),
            ..PrintPiece::draft()
        });

        let a = price_quotation(&morning.pieces, printers);
        let b = price_quotation(&evening.pieces, printers);
        let report = utc_aggregator().build(&[morning, evening], printers, DateRange::all());

        assert_eq!(report.days.len(), 1);
        assert_eq!(report.days[0].date, date(2024, 3, 10));
        let day = &report.days[0].totals;
        assert_eq!(day.quotation_count, 2);
        assert_eq!(day.net_sale_total, a.net_sale_total + b.net_sale_total);
        assert_eq!(day.print_production_cost, a.print_production_cost + b.print_production_cost);
        assert_eq!(day.post_processing_cost, a.post_processing_cost + b.post_processing_cost);
        assert_eq!(day.net_profit, a.report_profit + b.report_profit);

        let mut breakdown = a.breakdown;
        breakdown += b.breakdown;
        assert_eq!(day.breakdown, breakdown);
        assert_eq!(&report.grand_total, day);
    }

    #[test]
    fn test_extreme_totals_do_not_panic() {
        let mut q = quotation(at(2024, 3, 10, 9, 0), dec!(100));
        q.pieces[0].sanding_paint_cost = Money::new(Decimal::MAX);
        q.pieces[0].material_cost_per_kg = Money::ZERO;

        let report = utc_aggregator().build(&[q.clone(), q], &[], DateRange::all());
        assert_eq!(report.grand_total.quotation_count, 2);
        assert_eq!(report.grand_total.post_processing_cost.amount(), Decimal::MAX);
    }

    #[test]
    fn test_quotations_outside_range_are_excluded() {
        let quotations = vec![
            quotation(at(2024, 2, 28, 12, 0), dec!(100)),
            quotation(at(2024, 3, 5, 12, 0), dec!(100)),
        ];
        let range = DateRange::between(Some(date(2024, 3, 1)), None);

        let report = utc_aggregator().build(&quotations, &[], range);
        assert_eq!(report.grand_total.quotation_count, 1);
        assert_eq!(report.days[0].date, date(2024, 3, 5));
    }

    #[test]
    fn test_days_are_newest_first_and_sum_to_grand_total() {
        let quotations = vec![
            quotation(at(2024, 3, 1, 10, 0), dec!(50)),
            quotation(at(2024, 3, 3, 10, 0), dec!(500)),
            quotation(at(2024, 3, 2, 10, 0), dec!(950)),
        ];

        let report = utc_aggregator().build(&quotations, &[], DateRange::all());
        let dates: Vec<NaiveDate> = report.days.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![date(2024, 3, 3), date(2024, 3, 2), date(2024, 3, 1)]);

        let summed: Money = report.days.iter().map(|d| d.totals.net_sale_total).sum();
        assert_eq!(summed, report.grand_total.net_sale_total);
        let profit: Money = report.days.iter().map(|d| d.totals.net_profit).sum();
        assert_eq!(profit, report.grand_total.net_profit);
    }

    #[test]
    fn test_profit_subtracts_post_processing() {
        let mut q = quotation(at(2024, 3, 10, 9, 0), dec!(100));
        q.pieces[0].sanding_paint_cost = Money::from_units(5_000);

        let totals = price_quotation(&q.pieces, &[]);
        let report = utc_aggregator().build(&[q], &[], DateRange::all());

        assert_eq!(report.grand_total.net_profit, totals.report_profit);
        assert_eq!(report.grand_total.post_processing_cost.amount(), dec!(5000));
        assert!(report.grand_total.net_profit < totals.editor_profit);
    }

    #[test]
    fn test_margin_is_zero_without_sales() {
        let mut q = quotation(at(2024, 3, 10, 9, 0), Decimal::ZERO);
        q.pieces.clear();

        let report = utc_aggregator().build(&[q], &[], DateRange::all());
        assert_eq!(report.grand_total.quotation_count, 1);
        assert!(report.grand_total.net_sale_total.is_zero());
        assert_eq!(report.grand_total.margin_percent, Decimal::ZERO);
    }

    #[test]
    fn test_margin_percent() {
        let mut totals = ReportTotals::default();
        totals.merge(&ReportTotals {
            quotation_count: 1,
            net_sale_total: Money::from_units(10_000),
            net_profit: Money::from_units(2_500),
            ..ReportTotals::default()
        });
        assert_eq!(totals.margin_percent, dec!(25));
    }

    #[test]
    fn test_buckets_follow_injected_time_zone() {
        // 02:00 UTC on the 10th is still the 9th in UTC-3.
        let q = quotation(at(2024, 3, 10, 2, 0), dec!(100));
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();

        let report = ReportAggregator::new(offset).build(&[q.clone()], &[], DateRange::all());
        assert_eq!(report.days[0].date, date(2024, 3, 9));

        let report = utc_aggregator().build(&[q], &[], DateRange::all());
        assert_eq!(report.days[0].date, date(2024, 3, 10));
    }

    #[test]
    fn test_month_to_date_uses_local_day() {
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();
        let range = ReportAggregator::new(offset).month_to_date(&at(2024, 4, 1, 1, 0));
        assert_eq!(range.from, Some(date(2024, 3, 1)));
        assert_eq!(range.to, Some(date(2024, 3, 31)));
    }

    #[test]
    fn test_empty_input() {
        let report = utc_aggregator().build(&[], &[], DateRange::all());
        assert!(report.is_empty());
        assert_eq!(report.grand_total, ReportTotals::default());
    }
}
