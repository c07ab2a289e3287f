//! # Checkout Planning
//!
//! The storage-free half of checkout: which rows to lock and in what order,
//! and what the order looks like once every row is locked.
//!
//! ## Lock → Validate → Mutate
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  cart: [{B,1}, {A,5}, {B,2}]                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  lock_order(cart) = [A, B]      ← ascending, distinct                   │
//! │       │                                                                 │
//! │       ▼  (kasir-db locks A then B, reads StockSnapshot for each)        │
//! │                                                                         │
//! │  plan_checkout(cart, locked)    ← walks the cart in CART order          │
//! │       ├── B missing?              → NotFound(B)                         │
//! │       ├── remaining(B) < 1?       → InsufficientStock(B, ...)           │
//! │       ├── remaining(A) < 5?       → InsufficientStock(A, ...)           │
//! │       ├── remaining(B) - 1 < 2?   → InsufficientStock(B, ...)           │
//! │       └── OK → CheckoutPlan { lines (cart order), total }               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every client locks in the same global order, so two checkouts over
//! overlapping product sets can never wait on each other in a cycle.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::CheckoutError;
use crate::money::Money;
use crate::types::{CartItem, StockSnapshot};

// =============================================================================
// Lock Order
// =============================================================================

/// Distinct product ids of the cart in ascending order.
///
/// ## Example
/// ```rust
/// use kasir_core::checkout::lock_order;
/// use kasir_core::CartItem;
///
/// let cart = [CartItem::new(9, 1), CartItem::new(2, 1), CartItem::new(9, 4)];
/// assert_eq!(lock_order(&cart), vec![2, 9]);
/// ```
pub fn lock_order(items: &[CartItem]) -> Vec<i64> {
    items
        .iter()
        .map(|item| item.product_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// =============================================================================
// Plan
// =============================================================================

/// One validated line, priced from the locked snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedLine {
    pub product_id: i64,
    pub name_snapshot: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
    pub subtotal_cents: i64,
}

/// Everything needed to write an order, computed while holding the locks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutPlan {
    lines: Vec<PlannedLine>,
    total: Money,
}

impl CheckoutPlan {
    /// Lines in cart order.
    pub fn lines(&self) -> &[PlannedLine] {
        &self.lines
    }

    pub fn total(&self) -> Money {
        self.total
    }

    /// Net quantity to take from each product, ascending by product id.
    pub fn decrements(&self) -> BTreeMap<i64, i64> {
        let mut out = BTreeMap::new();
        for line in &self.lines {
            *out.entry(line.product_id).or_insert(0) += line.quantity;
        }
        out
    }
}

/// Validates the cart against locked stock and prices every line.
///
/// `locked` must hold a snapshot for every product that exists; an id from
/// the cart with no entry is reported as `NotFound`. Stock consumed by earlier
/// lines of the same cart is not available to later lines.
///
/// Pure: calling this has no effect on `locked`.
pub fn plan_checkout(
    items: &[CartItem],
    locked: &BTreeMap<i64, StockSnapshot>,
) -> Result<CheckoutPlan, CheckoutError> {
    let mut remaining: BTreeMap<i64, i64> = locked
        .iter()
        .map(|(id, snapshot)| (*id, snapshot.stock))
        .collect();

    let mut lines = Vec::with_capacity(items.len());
    let mut total = Money::zero();

    for item in items {
        let snapshot = locked.get(&item.product_id).ok_or(CheckoutError::NotFound {
            product_id: item.product_id,
        })?;

        let available = remaining.entry(item.product_id).or_insert(snapshot.stock);
        if *available < item.quantity {
            return Err(CheckoutError::InsufficientStock {
                product_id: item.product_id,
                available: *available,
                requested: item.quantity,
            });
        }
        *available -= item.quantity;

        let subtotal = Money::from_cents(snapshot.price_cents)
            .checked_mul_quantity(item.quantity)
            .ok_or_else(|| CheckoutError::invalid_item(item.product_id, "subtotal overflows"))?;
        total = total
            .checked_add(subtotal)
            .ok_or_else(|| CheckoutError::invalid_item(item.product_id, "order total overflows"))?;

        lines.push(PlannedLine {
            product_id: item.product_id,
            name_snapshot: snapshot.name.clone(),
            unit_price_cents: snapshot.price_cents,
            quantity: item.quantity,
            subtotal_cents: subtotal.cents(),
        });
    }

    Ok(CheckoutPlan { lines, total })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn locked(rows: &[(i64, &str, i64, i64)]) -> BTreeMap<i64, StockSnapshot> {
        rows.iter()
            .map(|(id, name, price, stock)| (*id, StockSnapshot::new(*id, *name, *price, *stock)))
            .collect()
    }

    #[test]
    fn test_lock_order_is_sorted_and_distinct() {
        let cart = [
            CartItem::new(30, 1),
            CartItem::new(10, 1),
            CartItem::new(20, 1),
            CartItem::new(10, 2),
        ];
        assert_eq!(lock_order(&cart), vec![10, 20, 30]);
    }

    #[test]
    fn test_lock_order_ignores_cart_order() {
        let ab = [CartItem::new(1, 1), CartItem::new(2, 1)];
        let ba = [CartItem::new(2, 1), CartItem::new(1, 1)];
        assert_eq!(lock_order(&ab), lock_order(&ba));
    }

    #[test]
    fn test_plan_computes_subtotals_and_total() {
        let stock = locked(&[(1, "Kopi", 300, 10), (2, "Teh", 250, 10)]);
        let cart = [CartItem::new(2, 4), CartItem::new(1, 3)];

        let plan = plan_checkout(&cart, &stock).unwrap();

        assert_eq!(plan.lines().len(), 2);
        assert_eq!(plan.lines()[0].product_id, 2);
        assert_eq!(plan.lines()[0].subtotal_cents, 1000);
        assert_eq!(plan.lines()[1].name_snapshot, "Kopi");
        assert_eq!(plan.lines()[1].subtotal_cents, 900);
        assert_eq!(plan.total().cents(), 1900);
    }

    #[test]
    fn test_plan_not_found_reports_missing_id() {
        let stock = locked(&[(1, "Kopi", 300, 10)]);
        let cart = [CartItem::new(1, 1), CartItem::new(99, 1)];

        let err = plan_checkout(&cart, &stock).unwrap_err();
        assert_eq!(err, CheckoutError::NotFound { product_id: 99 });
    }

    #[test]
    fn test_plan_insufficient_stock_carries_numbers() {
        let stock = locked(&[(1, "Kopi", 300, 10), (2, "Teh", 250, 40)]);
        let cart = [CartItem::new(1, 5), CartItem::new(2, 1000)];

        let err = plan_checkout(&cart, &stock).unwrap_err();
        assert_eq!(
            err,
            CheckoutError::InsufficientStock {
                product_id: 2,
                available: 40,
                requested: 1000,
            }
        );
    }

    #[test]
    fn test_plan_duplicates_share_stock() {
        let stock = locked(&[(1, "Kopi", 300, 5)]);

        let ok = plan_checkout(&[CartItem::new(1, 2), CartItem::new(1, 3)], &stock).unwrap();
        assert_eq!(ok.lines().len(), 2);
        assert_eq!(ok.decrements().get(&1), Some(&5));

        let err = plan_checkout(&[CartItem::new(1, 3), CartItem::new(1, 3)], &stock).unwrap_err();
        assert_eq!(
            err,
            CheckoutError::InsufficientStock {
                product_id: 1,
                available: 2,
                requested: 3,
            }
        );
    }

    #[test]
    fn test_plan_reports_failures_in_cart_order() {
        // 5 is missing and 1 is short; 5 comes first in the cart.
        let stock = locked(&[(1, "Kopi", 300, 0)]);
        let cart = [CartItem::new(5, 1), CartItem::new(1, 1)];

        let err = plan_checkout(&cart, &stock).unwrap_err();
        assert_eq!(err, CheckoutError::NotFound { product_id: 5 });
    }

    #[test]
    fn test_plan_overflow_is_validation() {
        let stock = locked(&[(1, "Emas", i64::MAX, i64::MAX)]);
        let err = plan_checkout(&[CartItem::new(1, 2)], &stock).unwrap_err();
        assert_eq!(err.kind(), "validation");
        assert_eq!(err.product_id(), Some(1));
    }

    #[test]
    fn test_plan_free_item() {
        let stock = locked(&[(1, "Kantong", 0, 3)]);
        let plan = plan_checkout(&[CartItem::new(1, 3)], &stock).unwrap();
        assert!(plan.total().is_zero());
    }
}
