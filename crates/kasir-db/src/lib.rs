//! # kasir-db: Storage and Checkout for Kasir
//!
//! This crate owns everything that touches the database: the SQLite pool,
//! embedded migrations, repositories, and the checkout orchestrator that
//! ties kasir-core's planner to row locks and a single transaction.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasir Data Flow                                  │
//! │                                                                         │
//! │  HTTP handler (external) ── Vec<CartItem> ──┐                          │
//! │                                             ▼                          │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     kasir-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ Inventory     │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ OrderLedger   │    │ 001_initial  │  │   │
//! │  │   │ DbConfig      │    │ Product/Order │    │  _schema.sql │  │   │
//! │  │   │               │    │ Report        │    │              │  │   │
//! │  │   └───────┬───────┘    └───────▲───────┘    └──────────────┘  │   │
//! │  │           │                    │                               │   │
//! │  │           └──► CheckoutService ┘                               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 SQLite Database (WAL)  ./kasir.db               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and repository access
//! - [`config`] - Pool and deadline configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types and their checkout mapping
//! - [`repository`] - Repository implementations
//! - [`checkout`] - The checkout orchestrator
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kasir_core::CartItem;
//! use kasir_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::from_env()?).await?;
//!
//! let order = db
//!     .checkout()
//!     .checkout(&[CartItem::new(1, 2), CartItem::new(2, 1)])
//!     .await?;
//!
//! let report = db.reports().today().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::CheckoutService;
pub use config::{ConfigError, DbConfig};
pub use error::{DbError, DbResult};
pub use pool::Database;

// Repository re-exports for convenience
pub use repository::inventory::InventoryStore;
pub use repository::order::{OrderLedger, OrderRepository};
pub use repository::product::ProductRepository;
pub use repository::report::ReportRepository;
