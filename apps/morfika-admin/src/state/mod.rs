//! # State Module
//!
//! Manages application state for the admin CLI.
//!
//! Separate state types instead of one `AppState`, so commands declare
//! exactly what they touch:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────────┐  ┌──────────────────┐  ┌──────────────────┐   │
//! │  │ Arc<dyn Quotation-   │  │  PrinterCatalog  │  │  QuotationEditor │   │
//! │  │   Repository>        │  │                  │  │                  │   │
//! │  │  (SQLite or memory)  │  │  Arc<Mutex<      │  │  Arc<Mutex<      │   │
//! │  │                      │  │    Catalog>>     │  │    Quotation>>   │   │
//! │  └──────────────────────┘  └──────────────────┘  └──────────────────┘   │
//! │                                                                         │
//! │  • store: thread-safe on its own (pool or tokio mutex)                  │
//! │  • catalog: replaced only after confirmed writes                        │
//! │  • editor: one draft; kept intact when a save fails                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Locks are never held across an `.await`; async methods copy what they
//! need out of the mutex first.

mod catalog;
mod editor;

pub use catalog::{Catalog, PrinterCatalog};
pub use editor::QuotationEditor;
