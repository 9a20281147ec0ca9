//! Table rendering for command results.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use morfika_core::{Money, PrinterConfig, QuotationReport, ReportTotals};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::commands::quotation::is_saved;
use crate::commands::{QuotationSummary, QuotationView};
use crate::error::AppResult;

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Right-aligned amount cell.
pub fn money_cell(value: Money) -> Cell {
    let cell = Cell::new(value.to_string()).set_alignment(CellAlignment::Right);
    if value.is_negative() {
        cell.fg(Color::Red)
    } else {
        cell
    }
}

fn number_cell(value: Decimal) -> Cell {
    Cell::new(value.normalize().to_string()).set_alignment(CellAlignment::Right)
}

fn percent_cell(value: Decimal) -> Cell {
    Cell::new(format!("{:.1}%", value)).set_alignment(CellAlignment::Right)
}

fn bold(cell: Cell) -> Cell {
    cell.add_attribute(Attribute::Bold)
}

/// Pretty JSON for `--json` output.
pub fn to_json<T: Serialize>(value: &T) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn printers_table(printers: &[PrinterConfig]) -> Table {
    let mut table = new_styled_table();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Name"),
        header_cell("Watts"),
        header_cell("Per kWh"),
        header_cell("Per minute"),
    ]);

    for printer in printers {
        table.add_row(vec![
            Cell::new(printer.id.to_string()),
            Cell::new(&printer.name),
            number_cell(printer.power_draw_watts),
            money_cell(printer.energy_unit_cost),
            money_cell(printer.machine_minute_cost),
        ]);
    }
    table
}

pub fn quotations_table(quotations: &[QuotationSummary]) -> Table {
    let mut table = new_styled_table();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Created"),
        header_cell("Client"),
        header_cell("Pieces"),
        header_cell("Grams"),
        header_cell("Net sale"),
        header_cell("Profit"),
    ]);

    for q in quotations {
        table.add_row(vec![
            Cell::new(q.id.to_string()),
            Cell::new(q.created_at.format("%Y-%m-%d %H:%M").to_string()),
            Cell::new(&q.client_name),
            Cell::new(q.piece_count).set_alignment(CellAlignment::Right),
            number_cell(q.total_filament_grams),
            money_cell(q.net_sale_total.rounded()),
            money_cell(q.editor_profit.rounded()),
        ]);
    }
    table
}

/// Per-piece costs followed by the quotation totals.
pub fn quotation_tables(view: &QuotationView) -> (Table, Table) {
    let mut pieces = new_styled_table();
    pieces.set_header(vec![
        header_cell("Piece"),
        header_cell("Material"),
        header_cell("Grams"),
        header_cell("Minutes"),
        header_cell("Base cost"),
        header_cell("Margin"),
        header_cell("Print cost"),
        header_cell("Post-proc."),
        header_cell("Sale"),
    ]);

    for (piece, costs) in view.quotation.pieces.iter().zip(&view.totals.pieces) {
        pieces.add_row(vec![
            Cell::new(&piece.name),
            Cell::new(&piece.material),
            number_cell(piece.mass_grams),
            number_cell(piece.print_minutes),
            money_cell(costs.breakdown.print_production()),
            percent_cell(costs.margin_rate * Decimal::ONE_HUNDRED),
            money_cell(costs.print_cost),
            money_cell(costs.post_processing_cost),
            money_cell(costs.sale_price),
        ]);
    }

    let t = &view.totals;
    let mut totals = new_styled_table();
    let status = if is_saved(view) {
        view.quotation.id.to_string()
    } else {
        "unsaved".to_string()
    };
    totals.set_header(vec![header_cell(&view.quotation.client_name), header_cell(&status)]);
    let rows = [
        ("Material", t.breakdown.material),
        ("Energy", t.breakdown.energy),
        ("Machine", t.breakdown.machine),
        ("Failure surcharge", t.breakdown.failure_surcharge),
        ("Primer", t.breakdown.primer),
        ("Sanding / paint", t.breakdown.sanding_paint),
        ("Post-processing labor", t.breakdown.post_processing_labor),
        ("Gross sale", t.gross_sale_total),
    ];
    for (label, value) in rows {
        totals.add_row(vec![Cell::new(label), money_cell(value)]);
    }
    totals.add_row(vec![
        Cell::new("Group discount"),
        percent_cell(t.group_discount_rate * Decimal::ONE_HUNDRED),
    ]);
    totals.add_row(vec![bold(Cell::new("Net sale")), bold(money_cell(t.net_sale_total.rounded()))]);
    totals.add_row(vec![bold(Cell::new("Profit")), bold(money_cell(t.editor_profit.rounded()))]);

    (pieces, totals)
}

fn report_cells(label: String, totals: &ReportTotals) -> Vec<Cell> {
    vec![
        Cell::new(label),
        Cell::new(totals.quotation_count).set_alignment(CellAlignment::Right),
        money_cell(totals.net_sale_total.rounded()),
        money_cell(totals.print_production_cost.rounded()),
        money_cell(totals.post_processing_cost.rounded()),
        money_cell(totals.net_profit.rounded()),
        percent_cell(totals.margin_percent),
    ]
}

pub fn report_table(report: &QuotationReport) -> Table {
    let mut table = new_styled_table();
    table.set_header(vec![
        header_cell("Date"),
        header_cell("Quotes"),
        header_cell("Net sale"),
        header_cell("Production"),
        header_cell("Post-proc."),
        header_cell("Profit"),
        header_cell("Margin"),
    ]);

    for day in &report.days {
        table.add_row(report_cells(day.date.format("%Y-%m-%d").to_string(), &day.totals));
    }

    let total_row: Vec<Cell> = report_cells("Total".to_string(), &report.grand_total)
        .into_iter()
        .map(bold)
        .collect();
    table.add_row(total_row);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use morfika_core::RecordId;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[test]
    fn test_printers_table_lists_every_printer() {
        let printers = vec![
            PrinterConfig {
                id: RecordId::Existing(Uuid::nil()),
                ..PrinterConfig::new("Ender 3", dec!(400), Money::from_units(907), Money::from_units(25))
            },
            PrinterConfig::new("Prusa MK4", dec!(300.50), Money::from_units(907), Money::from_units(35)),
        ];

        let rendered = printers_table(&printers).to_string();
        assert!(rendered.contains("Ender 3"));
        assert!(rendered.contains("Prusa MK4"));
        assert!(rendered.contains("300.5"));
        assert!(rendered.contains("907.00"));
    }

    #[test]
    fn test_empty_report_still_has_total_row() {
        let report = QuotationReport {
            range: morfika_core::DateRange::all(),
            days: Vec::new(),
            grand_total: ReportTotals::default(),
        };
        let rendered = report_table(&report).to_string();
        assert!(rendered.contains("Total"));
        assert!(rendered.contains("0.0%"));
    }
}
