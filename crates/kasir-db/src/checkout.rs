//! # Checkout Service
//!
//! Turns a cart into a committed order, or into exactly one failure with no
//! side effects.
//!
//! ## Transaction Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      checkout(items)                                    │
//! │                                                                         │
//! │  validate_cart ──✗──► Validation            (no storage touched)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌──────────────── timeout(checkout_timeout) ─────────────────────┐    │
//! │  │ BEGIN                                                          │    │
//! │  │   lock_and_read(id) for id in lock_order(items)  (ascending)   │    │
//! │  │   plan_checkout(items, locked) ──✗──► ROLLBACK, NotFound /     │    │
//! │  │        │                              InsufficientStock        │    │
//! │  │        ▼                                                       │    │
//! │  │   decrement(id, qty) for each product                          │    │
//! │  │   OrderLedger::insert(plan)                                    │    │
//! │  └────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ├── deadline passed        → Timeout  (tx dropped = rolled back) │
//! │       ▼                                                                 │
//! │  COMMIT  (awaited to completion, outside the deadline)                 │
//! │       │                                                                 │
//! │       ├── busy / pool timeout    → Timeout                             │
//! │       ├── other storage failure  → Internal                            │
//! │       └── committed              → Ok(Order)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The service holds no mutable state. Concurrent checkouts coordinate only
//! through the database locks.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};

use crate::error::DbError;
use crate::repository::inventory::InventoryStore;
use crate::repository::order::OrderLedger;
use kasir_core::checkout::{lock_order, plan_checkout};
use kasir_core::validation::validate_cart;
use kasir_core::{CartItem, CheckoutError, Order};

/// Checkout orchestrator.
///
/// ## Usage
/// ```rust,ignore
/// let service = db.checkout();
///
/// match service.checkout(&[CartItem::new(1, 2), CartItem::new(4, 1)]).await {
///     Ok(order) => println!("order {} total {}", order.id, order.total()),
///     Err(CheckoutError::InsufficientStock { product_id, available, requested }) => { ... }
///     Err(e) => eprintln!("{e}"),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CheckoutService {
    pool: SqlitePool,
    timeout: Duration,
}

impl CheckoutService {
    /// Creates a checkout service with a whole-transaction deadline.
    pub fn new(pool: SqlitePool, timeout: Duration) -> Self {
        CheckoutService { pool, timeout }
    }

    /// Deadline applied to each checkout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Checks out a cart.
    ///
    /// ## Returns
    /// * `Ok(Order)` - committed; stock for every line has been taken
    /// * `Err(CheckoutError::Validation)` - empty cart or quantity <= 0
    /// * `Err(CheckoutError::NotFound)` - unknown product id
    /// * `Err(CheckoutError::InsufficientStock)` - not enough units under lock
    /// * `Err(CheckoutError::Timeout)` - lock wait or deadline exceeded
    /// * `Err(CheckoutError::Internal)` - storage failure
    ///
    /// Every error leaves products and orders exactly as they were.
    pub async fn checkout(&self, items: &[CartItem]) -> Result<Order, CheckoutError> {
        validate_cart(items)?;

        debug!(lines = items.len(), "Starting checkout");

        let result = match tokio::time::timeout(self.timeout, self.prepare(items)).await {
            Ok(Ok((tx, order))) => commit(tx, order).await,
            Ok(Err(e)) => Err(e),
            Err(_) => {
                warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Checkout deadline exceeded, transaction rolled back"
                );
                Err(CheckoutError::Timeout)
            }
        };

        match &result {
            Ok(order) => info!(
                order_id = order.id,
                reference = %order.reference,
                total_cents = order.total_cents,
                lines = order.lines.len(),
                "Checkout committed"
            ),
            Err(CheckoutError::Internal { message }) => {
                warn!(error = %message, "Checkout failed")
            }
            Err(e) => debug!(kind = e.kind(), product_id = ?e.product_id(), "Checkout rejected"),
        }

        result
    }

    /// Everything up to, but not including, COMMIT.
    ///
    /// The deadline covers only this part. Dropping the returned transaction
    /// rolls it back, so cancelling here never leaves a trace.
    async fn prepare(
        &self,
        items: &[CartItem],
    ) -> Result<(Transaction<'static, Sqlite>, Order), CheckoutError> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let mut locked = BTreeMap::new();
        for product_id in lock_order(items) {
            if let Some(snapshot) = InventoryStore::lock_and_read(&mut tx, product_id).await? {
                locked.insert(product_id, snapshot);
            }
        }

        let plan = match plan_checkout(items, &locked) {
            Ok(plan) => plan,
            Err(e) => {
                rollback(tx).await;
                return Err(e);
            }
        };

        for (product_id, amount) in plan.decrements() {
            InventoryStore::decrement(&mut tx, product_id, amount).await?;
        }

        let order = OrderLedger::insert(&mut tx, &plan, Utc::now()).await?;

        Ok((tx, order))
    }
}

/// Commits outside the deadline: once COMMIT is sent its outcome is awaited,
/// never abandoned, so `Timeout` is only reported for work that was undone.
async fn commit(tx: Transaction<'static, Sqlite>, order: Order) -> Result<Order, CheckoutError> {
    tx.commit().await.map_err(DbError::from)?;
    Ok(order)
}

/// Ends a transaction that made no changes worth keeping.
///
/// A failed rollback is logged, not returned: the connection discards the
/// transaction when it goes back to the pool either way.
async fn rollback(tx: Transaction<'_, Sqlite>) {
    if let Err(e) = tx.rollback().await {
        warn!(error = %e, "Rollback failed");
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DbConfig;
    use crate::pool::Database;
    use kasir_core::NewProduct;

    async fn setup() -> (Database, i64, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let kopi = db.products().insert(&NewProduct::new("Kopi", 1099, 10)).await.unwrap();
        let roti = db.products().insert(&NewProduct::new("Roti", 250, 3)).await.unwrap();
        (db, kopi.id, roti.id)
    }

    async fn stock(db: &Database, id: i64) -> i64 {
        db.products().get_by_id(id).await.unwrap().unwrap().stock
    }

    #[tokio::test]
    async fn test_checkout_commits_order_and_stock() {
        let (db, kopi, roti) = setup().await;

        let order = db
            .checkout()
            .checkout(&[CartItem::new(kopi, 2), CartItem::new(roti, 3)])
            .await
            .unwrap();

        assert_eq!(order.total_cents, 2 * 1099 + 3 * 250);
        assert!(order.is_consistent());
        assert_eq!(stock(&db, kopi).await, 8);
        assert_eq!(stock(&db, roti).await, 0);

        let stored = db.orders().get_by_id(order.id).await.unwrap().unwrap();
        assert_eq!(stored, order);
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected() {
        let (db, _, _) = setup().await;
        let err = db.checkout().checkout(&[]).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Validation { product_id: None, .. }));
    }

    #[tokio::test]
    async fn test_insufficient_stock_changes_nothing() {
        let (db, kopi, roti) = setup().await;

        let err = db
            .checkout()
            .checkout(&[CartItem::new(kopi, 5), CartItem::new(roti, 4)])
            .await
            .unwrap_err();

        assert_eq!(
            err,
            CheckoutError::InsufficientStock {
                product_id: roti,
                available: 3,
                requested: 4
            }
        );
        assert_eq!(stock(&db, kopi).await, 10);
        assert_eq!(stock(&db, roti).await, 3);
        assert_eq!(db.orders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_connection_is_released_after_rejection() {
        // The in-memory pool has one connection; a leaked transaction would
        // make the second checkout time out.
        let (db, kopi, _) = setup().await;
        let service = db.checkout();

        assert!(service.checkout(&[CartItem::new(999, 1)]).await.is_err());
        assert!(service.checkout(&[CartItem::new(kopi, 1)]).await.is_ok());
    }
}
