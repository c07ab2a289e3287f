//! # Product Repository
//!
//! Administrative product operations: the path that creates products and
//! adjusts stock outside of checkout.
//!
//! ## Stock Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Who Writes products.stock                            │
//! │                                                                         │
//! │  CheckoutService ──► InventoryStore::decrement   (inside checkout tx)  │
//! │                                                                         │
//! │  Admin path     ──► ProductRepository::insert    (initial stock)       │
//! │                 ──► ProductRepository::update    (absolute, validated) │
//! │                 ──► ProductRepository::restock   (delta, always > 0)   │
//! │                                                                         │
//! │  The CHECK (stock >= 0) constraint backs both paths.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use kasir_core::validation::{validate_new_product, validate_restock_amount};
use kasir_core::{NewProduct, Product};

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let kopi = repo.insert(&NewProduct::new("Kopi", 300, 50)).await?;
/// let found = repo.get_by_id(kopi.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists all products ordered by id.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price_cents, stock, created_at, updated_at
            FROM products
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price_cents, stock, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product and returns it with its assigned id.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product
    /// * `Err(DbError::Invalid)` - Empty name, negative price or stock
    pub async fn insert(&self, product: &NewProduct) -> DbResult<Product> {
        validate_new_product(product)?;

        debug!(name = %product.name, "Inserting product");

        let now = Utc::now();

        let inserted = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, price_cents, stock, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            RETURNING id, name, price_cents, stock, created_at, updated_at
            "#,
        )
        .bind(product.name.trim())
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(inserted)
    }

    /// Replaces name, price and stock of an existing product.
    ///
    /// Past orders are unaffected: their lines carry name and price snapshots.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Updated row
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, id: i64, changes: &NewProduct) -> DbResult<Product> {
        validate_new_product(changes)?;

        debug!(id, "Updating product");

        let now = Utc::now();

        let updated = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                name = ?2,
                price_cents = ?3,
                stock = ?4,
                updated_at = ?5
            WHERE id = ?1
            RETURNING id, name, price_cents, stock, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.name.trim())
        .bind(changes.price_cents)
        .bind(changes.stock)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Adds `amount` units to a product's stock.
    ///
    /// A delta update rather than an absolute one, so it composes with
    /// checkouts committing concurrently.
    pub async fn restock(&self, id: i64, amount: i64) -> DbResult<Product> {
        validate_restock_amount(amount)?;

        debug!(id, amount, "Restocking product");

        let now = Utc::now();

        let updated = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                stock = stock + ?2,
                updated_at = ?3
            WHERE id = ?1
            RETURNING id, name, price_cents, stock, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(amount)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Deletes a product.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    /// * `Err(DbError::ForeignKeyViolation)` - Product appears on an order
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts total products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
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
    use crate::pool::Database;

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = db().await;
        let repo = db.products();

        let kopi = repo.insert(&NewProduct::new("  Kopi Susu ", 1500, 20)).await.unwrap();
        assert!(kopi.id > 0);
        assert_eq!(kopi.name, "Kopi Susu");

        let found = repo.get_by_id(kopi.id).await.unwrap().unwrap();
        assert_eq!(found, kopi);
        assert!(repo.get_by_id(kopi.id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_product() {
        let db = db().await;
        let err = db.products().insert(&NewProduct::new("", 100, 1)).await.unwrap_err();
        assert!(matches!(err, DbError::Invalid(_)));

        let err = db.products().insert(&NewProduct::new("Kopi", 100, -1)).await.unwrap_err();
        assert!(matches!(err, DbError::Invalid(_)));
        assert_eq!(db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_id() {
        let db = db().await;
        let repo = db.products();
        let a = repo.insert(&NewProduct::new("A", 1, 1)).await.unwrap();
        let b = repo.insert(&NewProduct::new("B", 2, 2)).await.unwrap();

        let ids: Vec<i64> = repo.list().await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[tokio::test]
    async fn test_update_and_restock() {
        let db = db().await;
        let repo = db.products();
        let p = repo.insert(&NewProduct::new("Teh", 250, 5)).await.unwrap();

        let updated = repo.update(p.id, &NewProduct::new("Teh Manis", 300, 8)).await.unwrap();
        assert_eq!(updated.name, "Teh Manis");
        assert_eq!(updated.price_cents, 300);
        assert_eq!(updated.stock, 8);

        let restocked = repo.restock(p.id, 2).await.unwrap();
        assert_eq!(restocked.stock, 10);

        assert!(matches!(repo.restock(p.id, 0).await, Err(DbError::Invalid(_))));
        assert!(matches!(
            repo.update(999, &NewProduct::new("X", 1, 1)).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let db = db().await;
        let repo = db.products();
        let p = repo.insert(&NewProduct::new("Roti", 1200, 3)).await.unwrap();

        repo.delete(p.id).await.unwrap();
        assert!(repo.get_by_id(p.id).await.unwrap().is_none());
        assert!(matches!(repo.delete(p.id).await, Err(DbError::NotFound { .. })));
    }
}
