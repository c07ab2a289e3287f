//! # Repository Module
//!
//! Database repository implementations for Kasir.
//!
//! ## Two Kinds of Repository
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Pool-scoped (own a SqlitePool, one statement = one implicit tx)       │
//! │  ├── ProductRepository  - admin CRUD, restock                          │
//! │  ├── OrderRepository    - read committed orders                        │
//! │  └── ReportRepository   - revenue / best seller                        │
//! │                                                                         │
//! │  Transaction-scoped (take &mut Transaction, never commit)              │
//! │  ├── InventoryStore     - lock_and_read, decrement                     │
//! │  └── OrderLedger        - insert order + lines                         │
//! │                                                                         │
//! │  Only CheckoutService opens, commits or rolls back the transaction     │
//! │  the transaction-scoped stores write into.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod inventory;
pub mod order;
pub mod product;
pub mod report;
