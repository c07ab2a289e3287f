//! # kasir-core: Pure Business Logic for the Kasir checkout engine
//!
//! This crate holds every rule of checkout that can be expressed without
//! touching storage: the domain types, integer money, validation, and the
//! checkout planner that turns a cart plus a set of locked stock snapshots
//! into order lines (or a precise failure).
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasir Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          HTTP / JSON layer (external collaborator)              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Vec<CartItem>                          │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                kasir-db (CheckoutService)                       │   │
//! │  │   begin ─► lock sorted ─► plan ─► decrement ─► insert ─► commit │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ uses                                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kasir-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ checkout  │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ lock_order│  │   rules   │  │   │
//! │  │   │   Order   │  │           │  │ plan      │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, CartItem, Order, OrderLine, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Checkout and validation error types
//! - [`validation`] - Input validation
//! - [`checkout`] - Lock ordering and line/total planning
//!
//! ## Example Usage
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use kasir_core::checkout::{lock_order, plan_checkout};
//! use kasir_core::{CartItem, StockSnapshot};
//!
//! let cart = vec![CartItem::new(7, 2), CartItem::new(3, 1)];
//! assert_eq!(lock_order(&cart), vec![3, 7]);
//!
//! let mut locked = BTreeMap::new();
//! locked.insert(3, StockSnapshot::new(3, "Teh Botol", 500, 10));
//! locked.insert(7, StockSnapshot::new(7, "Roti", 1200, 4));
//!
//! let plan = plan_checkout(&cart, &locked).unwrap();
//! assert_eq!(plan.total().cents(), 2 * 1200 + 500);
//! ```

pub mod checkout;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use checkout::{CheckoutPlan, PlannedLine};
pub use error::{CheckoutError, ValidationError};
pub use money::Money;
pub use types::*;
