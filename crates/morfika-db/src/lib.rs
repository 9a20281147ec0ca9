//! # morfika-db: Persistence for Morfika Quotations
//!
//! Implements the `morfika-core` repository contract on SQLite (via sqlx)
//! and in memory.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Quotation Data Flow                                │
//! │                                                                         │
//! │  morfika-admin (editor save, report load)                              │
//! │       │  Arc<dyn QuotationRepository>                                   │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     morfika-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ PrinterRepo   │    │ 001_init.sql │  │   │
//! │  │   │ SqlitePool    │◄───│ QuotationRepo │    │              │  │   │
//! │  │   │               │    │ SqliteStore   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   InMemoryStore (memory.rs) ── same contract, no SQLite         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   <platform data dir>/morfika.db                                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types and the mapping to contract errors
//! - [`repository`] - SQLite repositories and [`SqliteStore`]
//! - [`memory`] - [`InMemoryStore`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use morfika_db::{Database, DbConfig};
//! use morfika_core::QuotationRepository;
//!
//! let db = Database::new(DbConfig::new("path/to/morfika.db")).await?;
//! let store = db.store();
//! let quotations = store.list_quotations().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use memory::InMemoryStore;
pub use pool::{Database, DbConfig};

pub use repository::printer::PrinterRepository;
pub use repository::quotation::QuotationRecordRepository;
pub use repository::SqliteStore;
