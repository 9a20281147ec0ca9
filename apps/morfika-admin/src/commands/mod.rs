//! # Commands Module
//!
//! One function per CLI operation. Each takes the store plus the state it
//! needs and returns plain data; rendering lives in [`crate::ui`].
//!
//! ## Command Categories
//! | Category  | Commands                                                  |
//! |-----------|-----------------------------------------------------------|
//! | Printers  | list, add, update, delete                                 |
//! | Quotation | price, save, list, show, delete                           |
//! | Report    | quotation_report                                          |

pub mod printer;
pub mod quotation;
pub mod report;

pub use printer::{add_printer, delete_printer, list_printers, update_printer, PrinterPatch};
pub use quotation::{
    delete_quotation, list_quotations, price_quotation_input, save_quotation, show_quotation,
    QuotationInput, QuotationSummary, QuotationView,
};
pub use report::{quotation_report, ReportQuery};
