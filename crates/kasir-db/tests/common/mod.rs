use std::time::Duration;

use kasir_core::{NewProduct, Product};
use kasir_db::{Database, DbConfig};
use tempfile::TempDir;

/// File-backed database in a fresh temp dir.
///
/// Keep the `TempDir` alive for as long as the database is used.
pub async fn file_db(max_connections: u32) -> (TempDir, Database) {
    file_db_with(max_connections, Duration::from_secs(5), Duration::from_secs(10)).await
}

pub async fn file_db_with(
    max_connections: u32,
    lock_timeout: Duration,
    checkout_timeout: Duration,
) -> (TempDir, Database) {
    let dir = TempDir::new().unwrap();
    let config = DbConfig::new(dir.path().join("kasir.db"))
        .max_connections(max_connections)
        .lock_timeout(lock_timeout)
        .checkout_timeout(checkout_timeout);

    let db = Database::new(config).await.unwrap();
    (dir, db)
}

pub async fn product(db: &Database, name: &str, price_cents: i64, stock: i64) -> Product {
    db.products()
        .insert(&NewProduct::new(name, price_cents, stock))
        .await
        .unwrap()
}

pub async fn stock_of(db: &Database, id: i64) -> i64 {
    db.products().get_by_id(id).await.unwrap().unwrap().stock
}
