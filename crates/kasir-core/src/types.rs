//! # Domain Types
//!
//! Core domain types used throughout Kasir.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Order      │   │   OrderLine     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │   │  id (i64)       │   │  order_id (FK)  │       │
//! │  │  name           │   │  reference      │   │  name_snapshot  │       │
//! │  │  price_cents    │   │  total_cents    │   │  unit_price     │       │
//! │  │  stock          │   │  lines[]        │   │  subtotal       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    CartItem     │   │  StockSnapshot  │   │  SalesReport    │       │
//! │  │  (input only)   │   │ (read under     │   │  revenue        │       │
//! │  │  product_id     │   │  row lock)      │   │  orders         │       │
//! │  │  quantity       │   │                 │   │  best_seller?   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Order lines copy the product name and unit price at checkout time, so an
//! order reads the same forever even if the product is renamed or repriced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier, assigned by storage.
    pub id: i64,

    /// Display name shown to cashier and copied onto order lines.
    pub name: String,

    /// Price in the smallest currency unit.
    pub price_cents: i64,

    /// Units on hand. Never negative.
    pub stock: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// Fields of a product before storage assigns its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    pub price_cents: i64,
    pub stock: i64,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, price_cents: i64, stock: i64) -> Self {
        NewProduct {
            name: name.into(),
            price_cents,
            stock,
        }
    }
}

// =============================================================================
// Cart Item
// =============================================================================

/// One requested line of a checkout. Ephemeral: never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartItem {
    pub product_id: i64,
    pub quantity: i64,
}

impl CartItem {
    #[inline]
    pub const fn new(product_id: i64, quantity: i64) -> Self {
        CartItem {
            product_id,
            quantity,
        }
    }
}

// =============================================================================
// Stock Snapshot
// =============================================================================

/// Product state as read while holding its row lock.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockSnapshot {
    pub product_id: i64,
    pub name: String,
    pub price_cents: i64,
    pub stock: i64,
}

impl StockSnapshot {
    pub fn new(product_id: i64, name: impl Into<String>, price_cents: i64, stock: i64) -> Self {
        StockSnapshot {
            product_id,
            name: name.into(),
            price_cents,
            stock,
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// A committed order. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    /// Assigned by storage on insert.
    pub id: i64,

    /// Public reference (UUID v4) safe to print on receipts.
    pub reference: String,

    /// Σ lines[i].subtotal_cents.
    pub total_cents: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// In cart order.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub lines: Vec<OrderLine>,
}

impl Order {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Checks that the total and every subtotal are exactly reconstructible
    /// from the lines.
    pub fn is_consistent(&self) -> bool {
        let lines_ok = self.lines.iter().all(OrderLine::is_consistent);
        let sum = Money::checked_sum(self.lines.iter().map(OrderLine::subtotal));
        lines_ok && sum == Some(self.total())
    }
}

// =============================================================================
// Order Line
// =============================================================================

/// A line item of an order.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderLine {
    pub id: i64,
    pub order_id: i64,
    /// 1-based position in the cart.
    pub line_no: i64,
    pub product_id: i64,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Unit price at time of sale (frozen).
    pub unit_price_cents: i64,
    pub quantity: i64,
    /// unit_price_cents × quantity.
    pub subtotal_cents: i64,
}

impl OrderLine {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    pub fn is_consistent(&self) -> bool {
        self.unit_price_cents.checked_mul(self.quantity) == Some(self.subtotal_cents)
    }
}

// =============================================================================
// Sales Report
// =============================================================================

/// Aggregate over committed orders in a half-open time range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesReport {
    pub total_revenue_cents: i64,
    pub total_orders: i64,
    /// `None` when no order falls in the range.
    pub best_seller: Option<BestSeller>,
}

/// Product with the highest sold quantity in a report range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct BestSeller {
    pub product_id: i64,
    pub name: String,
    pub quantity_sold: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
