//! # Order Repository
//!
//! The order ledger: append-only orders and their lines.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. PLAN (kasir-core, under row locks)                                 │
//! │     └── plan_checkout() → CheckoutPlan { lines, total }                │
//! │                                                                         │
//! │  2. RECORD (inside the checkout transaction)                           │
//! │     └── OrderLedger::insert() → orders row + one order_lines row       │
//! │         per cart line, numbered from 1 in cart order                   │
//! │                                                                         │
//! │  3. COMMIT                                                             │
//! │     └── visible to OrderRepository and ReportRepository                │
//! │                                                                         │
//! │  There is no step 4: UPDATE and DELETE on either table abort in a      │
//! │  trigger.                                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use kasir_core::{CheckoutPlan, Order, OrderLine};

// =============================================================================
// Write Side
// =============================================================================

/// Writes orders inside a caller-owned transaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderLedger;

impl OrderLedger {
    /// Records a planned checkout as an order with its lines.
    ///
    /// ## Snapshot Pattern
    /// Name and unit price are copied from the plan, which took them from
    /// the locked product rows. Later product edits never reach the ledger.
    pub async fn insert(
        tx: &mut Transaction<'_, Sqlite>,
        plan: &CheckoutPlan,
        created_at: DateTime<Utc>,
    ) -> DbResult<Order> {
        let reference = Uuid::new_v4().to_string();
        let total_cents = plan.total().cents();

        let order_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO orders (reference, total_cents, created_at)
            VALUES (?1, ?2, ?3)
            RETURNING id
            "#,
        )
        .bind(&reference)
        .bind(total_cents)
        .bind(created_at)
        .fetch_one(&mut **tx)
        .await?;

        debug!(order_id, reference = %reference, total_cents, "Order row inserted");

        let mut lines = Vec::with_capacity(plan.lines().len());

        for (index, planned) in plan.lines().iter().enumerate() {
            let line_no = index as i64 + 1;

            let line = sqlx::query_as::<_, OrderLine>(
                r#"
                INSERT INTO order_lines (
                    order_id, line_no, product_id,
                    name_snapshot, unit_price_cents, quantity, subtotal_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                RETURNING
                    id, order_id, line_no, product_id,
                    name_snapshot, unit_price_cents, quantity, subtotal_cents
                "#,
            )
            .bind(order_id)
            .bind(line_no)
            .bind(planned.product_id)
            .bind(&planned.name_snapshot)
            .bind(planned.unit_price_cents)
            .bind(planned.quantity)
            .bind(planned.subtotal_cents)
            .fetch_one(&mut **tx)
            .await?;

            lines.push(line);
        }

        Ok(Order {
            id: order_id,
            reference,
            total_cents,
            created_at,
            lines,
        })
    }
}

// =============================================================================
// Read Side
// =============================================================================

/// Repository for reading committed orders.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets an order with its lines.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, reference, total_cents, created_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match order {
            Some(mut order) => {
                order.lines = self.get_lines(order.id).await?;
                Ok(Some(order))
            }
            None => Ok(None),
        }
    }

    /// Gets an order by its public reference.
    pub async fn get_by_reference(&self, reference: &str) -> DbResult<Option<Order>> {
        let id: Option<i64> = sqlx::query_scalar("SELECT id FROM orders WHERE reference = ?1")
            .bind(reference)
            .fetch_optional(&self.pool)
            .await?;

        match id {
            Some(id) => self.get_by_id(id).await,
            None => Ok(None),
        }
    }

    /// Gets the lines of an order in line order.
    pub async fn get_lines(&self, order_id: i64) -> DbResult<Vec<OrderLine>> {
        let lines = sqlx::query_as::<_, OrderLine>(
            r#"
            SELECT
                id, order_id, line_no, product_id,
                name_snapshot, unit_price_cents, quantity, subtotal_cents
            FROM order_lines
            WHERE order_id = ?1
            ORDER BY line_no
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Most recent orders first, without lines.
    pub async fn list_recent(&self, limit: i64) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, reference, total_cents, created_at
            FROM orders
            ORDER BY id DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Counts committed orders.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DbConfig;
    use crate::error::DbError;
    use crate::pool::Database;
    use kasir_core::checkout::plan_checkout;
    use kasir_core::{CartItem, NewProduct, StockSnapshot};
    use std::collections::BTreeMap;

    async fn record(db: &Database, items: &[CartItem]) -> Order {
        let mut locked = BTreeMap::new();
        for item in items {
            let p = db.products().get_by_id(item.product_id).await.unwrap().unwrap();
            locked.insert(p.id, StockSnapshot::new(p.id, p.name, p.price_cents, p.stock));
        }
        let plan = plan_checkout(items, &locked).unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        let order = OrderLedger::insert(&mut tx, &plan, Utc::now()).await.unwrap();
        tx.commit().await.unwrap();
        order
    }

    #[tokio::test]
    async fn test_insert_numbers_lines_in_cart_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let a = db.products().insert(&NewProduct::new("Kopi", 300, 10)).await.unwrap();
        let b = db.products().insert(&NewProduct::new("Roti", 1200, 10)).await.unwrap();

        let order = record(&db, &[CartItem::new(b.id, 1), CartItem::new(a.id, 2)]).await;

        assert_eq!(order.total_cents, 1800);
        assert!(order.is_consistent());
        assert_eq!(order.lines[0].line_no, 1);
        assert_eq!(order.lines[0].product_id, b.id);
        assert_eq!(order.lines[1].line_no, 2);
        assert_eq!(order.lines[1].subtotal_cents, 600);

        let stored = db.orders().get_by_id(order.id).await.unwrap().unwrap();
        assert_eq!(stored.reference, order.reference);
        assert_eq!(stored.lines, order.lines);

        let by_ref = db.orders().get_by_reference(&order.reference).await.unwrap().unwrap();
        assert_eq!(by_ref.id, order.id);
    }

    #[tokio::test]
    async fn test_uncommitted_order_is_not_visible() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let a = db.products().insert(&NewProduct::new("Kopi", 300, 10)).await.unwrap();

        let mut locked = BTreeMap::new();
        locked.insert(a.id, StockSnapshot::new(a.id, "Kopi", 300, 10));
        let plan = plan_checkout(&[CartItem::new(a.id, 1)], &locked).unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        OrderLedger::insert(&mut tx, &plan, Utc::now()).await.unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(db.orders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_orders_are_immutable() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let a = db.products().insert(&NewProduct::new("Kopi", 300, 10)).await.unwrap();
        let order = record(&db, &[CartItem::new(a.id, 1)]).await;

        let update = sqlx::query("UPDATE orders SET total_cents = 0 WHERE id = ?1")
            .bind(order.id)
            .execute(db.pool())
            .await;
        assert!(update.is_err());

        let delete = sqlx::query("DELETE FROM order_lines WHERE order_id = ?1")
            .bind(order.id)
            .execute(db.pool())
            .await;
        assert!(delete.is_err());

        let stored = db.orders().get_by_id(order.id).await.unwrap().unwrap();
        assert_eq!(stored.total_cents, 300);
        assert_eq!(stored.lines.len(), 1);
    }

    #[tokio::test]
    async fn test_ordered_product_cannot_be_deleted() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let a = db.products().insert(&NewProduct::new("Kopi", 300, 10)).await.unwrap();
        record(&db, &[CartItem::new(a.id, 1)]).await;

        let err = db.products().delete(a.id).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_list_recent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let a = db.products().insert(&NewProduct::new("Kopi", 300, 10)).await.unwrap();
        let first = record(&db, &[CartItem::new(a.id, 1)]).await;
        let second = record(&db, &[CartItem::new(a.id, 2)]).await;

        let recent = db.orders().list_recent(10).await.unwrap();
        let ids: Vec<i64> = recent.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert!(recent.iter().all(|o| o.lines.is_empty()));
        assert_eq!(db.orders().count().await.unwrap(), 2);
    }
}
