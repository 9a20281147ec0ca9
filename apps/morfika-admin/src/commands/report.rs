//! # Report Command
//!
//! Daily breakdown of saved quotations over a date window.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  (no flags)       → first of the current month .. today                 │
//! │  --from / --to    → inclusive calendar days, either bound optional      │
//! │  --all            → every saved quotation                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Days are calendar days in the aggregator's time zone. Report profit
//! subtracts post-processing as well as print production.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use morfika_core::{DateRange, QuotationReport, QuotationRepository, ReportAggregator};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::state::PrinterCatalog;

/// Requested report window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub all: bool,
}

impl ReportQuery {
    /// Resolves the query to a concrete window as of `now`.
    pub fn resolve<Tz: TimeZone>(
        &self,
        aggregator: &ReportAggregator<Tz>,
        now: &DateTime<Utc>,
    ) -> AppResult<DateRange> {
        if self.all {
            if self.from.is_some() || self.to.is_some() {
                return Err(AppError::validation("--all cannot be combined with --from/--to"));
            }
            return Ok(DateRange::all());
        }

        match (self.from, self.to) {
            (None, None) => Ok(aggregator.month_to_date(now)),
            (Some(from), Some(to)) if from > to => Err(AppError::validation(format!(
                "Report start {} is after its end {}",
                from, to
            ))),
            (from, to) => Ok(DateRange::between(from, to)),
        }
    }
}

/// Builds the report for `query`, pricing every quotation against the
/// current printer profiles.
pub async fn quotation_report<Tz: TimeZone>(
    store: &dyn QuotationRepository,
    catalog: &PrinterCatalog,
    aggregator: &ReportAggregator<Tz>,
    query: ReportQuery,
    now: DateTime<Utc>,
) -> AppResult<QuotationReport> {
    let range = query.resolve(aggregator, &now)?;
    debug!(from = ?range.from, to = ?range.to, "quotation_report command");

    catalog.refresh(store).await?;
    let report = catalog.with_catalog(|c| aggregator.build(&c.quotations, &c.printers, range));

    debug!(
        days = report.days.len(),
        quotations = report.grand_total.quotation_count,
        "Report built"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use morfika_core::{Money, PrintPiece, Quotation};
    use morfika_db::InMemoryStore;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, h, 0, 0).unwrap()
    }

    fn quotation(client: &str) -> Quotation {
        let mut q = Quotation::draft(client);
        q.pieces.push(PrintPiece {
            mass_grams: dec!(50),
            print_minutes: dec!(60),
            primer_cost_per_200ml: Money::from_units(12_000),
            primer_consumed_ml: dec!(20),
            ..PrintPiece::draft()
        });
        q
    }

    #[test]
    fn test_resolve_windows() {
        let aggregator = ReportAggregator::new(Utc);
        let now = at(17, 12);

        let default = ReportQuery::default().resolve(&aggregator, &now).unwrap();
        assert_eq!(default, DateRange::between(Some(date(2024, 3, 1)), Some(date(2024, 3, 17))));

        let all = ReportQuery {
            all: true,
            ..ReportQuery::default()
        };
        assert_eq!(all.resolve(&aggregator, &now).unwrap(), DateRange::all());

        let open_end = ReportQuery {
            from: Some(date(2024, 2, 1)),
            ..ReportQuery::default()
        };
        assert_eq!(
            open_end.resolve(&aggregator, &now).unwrap(),
            DateRange::between(Some(date(2024, 2, 1)), None)
        );
    }

    #[test]
    fn test_resolve_rejects_bad_windows() {
        let aggregator = ReportAggregator::new(Utc);
        let now = at(17, 12);

        let inverted = ReportQuery {
            from: Some(date(2024, 3, 10)),
            to: Some(date(2024, 3, 1)),
            all: false,
        };
        let err = inverted.resolve(&aggregator, &now).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let mixed = ReportQuery {
            from: Some(date(2024, 3, 1)),
            to: None,
            all: true,
        };
        assert!(mixed.resolve(&aggregator, &now).is_err());
    }

    #[tokio::test]
    async fn test_report_over_store() {
        let store = InMemoryStore::new();
        store.create_at(&quotation("Ana"), at(2, 9)).await.unwrap();
        store.create_at(&quotation("Luis"), at(2, 18)).await.unwrap();
        store.create_at(&quotation("Eva"), at(5, 10)).await.unwrap();
        store.create_at(&quotation("Old"), Utc.with_ymd_and_hms(2024, 2, 28, 10, 0, 0).unwrap())
            .await
            .unwrap();

        let catalog = PrinterCatalog::new();
        let report = quotation_report(
            &store,
            &catalog,
            &ReportAggregator::new(Utc),
            ReportQuery::default(),
            at(17, 12),
        )
        .await
        .unwrap();

        let days: Vec<NaiveDate> = report.days.iter().map(|d| d.date).collect();
        assert_eq!(days, vec![date(2024, 3, 5), date(2024, 3, 2)]);
        assert_eq!(report.days[1].totals.quotation_count, 2);
        assert_eq!(report.grand_total.quotation_count, 3);

        // Report profit subtracts the primer as well.
        let grand = &report.grand_total;
        assert_eq!(
            grand.net_profit,
            grand.net_sale_total - grand.print_production_cost - grand.post_processing_cost
        );
        assert!(!grand.post_processing_cost.is_zero());
    }

    #[tokio::test]
    async fn test_empty_report() {
        let store = InMemoryStore::new();
        let catalog = PrinterCatalog::new();
        let report = quotation_report(
            &store,
            &catalog,
            &ReportAggregator::new(Utc),
            ReportQuery {
                all: true,
                ..ReportQuery::default()
            },
            at(17, 12),
        )
        .await
        .unwrap();

        assert!(report.is_empty());
        assert!(report.grand_total.margin_percent.is_zero());
    }
}
