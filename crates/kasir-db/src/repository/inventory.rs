//! # Inventory Store
//!
//! Transaction-scoped stock operations used by checkout.
//!
//! ## Row Locks on SQLite
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  lock_and_read(tx, id)                                                  │
//! │                                                                         │
//! │    UPDATE products SET stock = stock WHERE id = ?                       │
//! │    RETURNING id, name, price_cents, stock                               │
//! │                                                                         │
//! │  • A write statement: takes the database write lock, waiting up to      │
//! │    busy_timeout for any other writer to commit or roll back            │
//! │  • Value-preserving: nothing changes if the transaction aborts          │
//! │  • RETURNING: the row as seen by the lock holder, never a stale read   │
//! │                                                                         │
//! │  SQLite's write lock covers every row, so holding it for one product   │
//! │  holds it for all. Callers still lock in ascending id order.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use kasir_core::StockSnapshot;
use sqlx::{Sqlite, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Stock reads and writes inside a caller-owned transaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryStore;

impl InventoryStore {
    /// Locks a product row and returns its current name, price and stock.
    ///
    /// ## Returns
    /// * `Ok(Some(snapshot))` - row locked until the transaction ends
    /// * `Ok(None)` - no such product
    /// * `Err(DbError::Busy)` - lock not acquired within busy_timeout
    pub async fn lock_and_read(
        tx: &mut Transaction<'_, Sqlite>,
        product_id: i64,
    ) -> DbResult<Option<StockSnapshot>> {
        let snapshot = sqlx::query_as::<_, StockSnapshot>(
            r#"
            UPDATE products
            SET stock = stock
            WHERE id = ?1
            RETURNING id AS product_id, name, price_cents, stock
            "#,
        )
        .bind(product_id)
        .fetch_optional(&mut **tx)
        .await?;

        debug!(product_id, found = snapshot.is_some(), "Product row locked");
        Ok(snapshot)
    }

    /// Takes `amount` units from a product locked by [`lock_and_read`].
    ///
    /// The caller has already checked `stock >= amount` under the lock. The
    /// `stock >= amount` guard in the statement is a backstop: if it matches
    /// nothing the transaction is in a state the caller must abort.
    ///
    /// [`lock_and_read`]: InventoryStore::lock_and_read
    pub async fn decrement(
        tx: &mut Transaction<'_, Sqlite>,
        product_id: i64,
        amount: i64,
    ) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock - ?2,
                updated_at = ?3
            WHERE id = ?1 AND stock >= ?2
            "#,
        )
        .bind(product_id)
        .bind(amount)
        .bind(now)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::TransactionFailed(format!(
                "conditional decrement of {amount} matched no row for product {product_id}"
            )));
        }

        debug!(product_id, amount, "Stock decremented");
        Ok(())
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

    #[tokio::test]
    async fn test_lock_and_read_returns_current_row() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = db.products().insert(&NewProduct::new("Kopi", 300, 7)).await.unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        let snapshot = InventoryStore::lock_and_read(&mut tx, product.id)
            .await
            .unwrap()
            .unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(snapshot, StockSnapshot::new(product.id, "Kopi", 300, 7));
    }

    #[tokio::test]
    async fn test_lock_and_read_missing_product() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        let snapshot = InventoryStore::lock_and_read(&mut tx, 404).await.unwrap();
        tx.rollback().await.unwrap();

        assert!(snapshot.is_none());
    }

    #[tokio::test]
    async fn test_decrement_is_undone_by_rollback() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = db.products().insert(&NewProduct::new("Teh", 250, 10)).await.unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        InventoryStore::lock_and_read(&mut tx, product.id).await.unwrap();
        InventoryStore::decrement(&mut tx, product.id, 4).await.unwrap();
        tx.rollback().await.unwrap();

        let after = db.products().get_by_id(product.id).await.unwrap().unwrap();
        assert_eq!(after.stock, 10);
    }

    #[tokio::test]
    async fn test_decrement_refuses_to_go_negative() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = db.products().insert(&NewProduct::new("Teh", 250, 2)).await.unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        let err = InventoryStore::decrement(&mut tx, product.id, 3).await.unwrap_err();
        tx.rollback().await.unwrap();

        assert!(matches!(err, DbError::TransactionFailed(_)));
    }
}
