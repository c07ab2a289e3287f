//! # Seed Data Generator
//!
//! Populates the database with products, and optionally some orders, for
//! development.
//!
//! ## Usage
//! ```bash
//! # 100 products (default), database from KASIR_DATABASE_PATH or ./kasir.db
//! cargo run -p kasir-db --bin seed
//!
//! # Custom amount, then ring up 50 random carts through checkout
//! cargo run -p kasir-db --bin seed -- --count 500 --orders 50
//!
//! # Specify database path
//! RUST_LOG=kasir_db=debug cargo run -p kasir-db --bin seed -- --db ./data/kasir.db
//! ```
//!
//! ## Generated Products
//! `{name} {size}` from the menu below, priced from a base of 2.00 to 9.99 plus
//! a size add-on, with 10 to 110 units of stock.

use std::env;
use std::time::Instant;

use kasir_core::{CartItem, CheckoutError, NewProduct};
use kasir_db::{Database, DbConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Product names grouped loosely by shelf.
const MENU: &[&str] = &[
    "Kopi Susu",
    "Kopi Hitam",
    "Teh Manis",
    "Teh Tawar",
    "Es Jeruk",
    "Air Mineral",
    "Susu Coklat",
    "Roti Tawar",
    "Roti Coklat",
    "Roti Keju",
    "Keripik Singkong",
    "Kacang Goreng",
    "Biskuit Kelapa",
    "Mie Instan",
    "Beras",
    "Gula Pasir",
    "Minyak Goreng",
    "Telur Ayam",
    "Sabun Mandi",
    "Pasta Gigi",
];

/// Size variants and their price add-on in cents.
const SIZES: &[(&str, i64)] = &[
    ("Kecil", 0),
    ("Sedang", 150),
    ("Besar", 300),
    ("Jumbo", 500),
    ("Pak", 1200),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut config = DbConfig::from_env()?;
    let mut count: usize = 100;
    let mut orders: usize = 0;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(count);
                    i += 1;
                }
            }
            "--orders" | "-o" => {
                if i + 1 < args.len() {
                    orders = args[i + 1].parse().unwrap_or(orders);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Kasir Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 100)");
                println!("  -o, --orders <N>   Random checkouts to run afterwards (default: 0)");
                println!("  -d, --db <PATH>    Database file path (default: KASIR_DATABASE_PATH or ./kasir.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(arg = other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    info!(path = %config.database_path.display(), count, orders, "Seeding database");

    let db = Database::new(config).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        warn!(existing, "Database already has products, skipping product seed");
    } else {
        seed_products(&db, count).await?;
    }

    if orders > 0 {
        seed_orders(&db, orders).await?;
    }

    db.close().await;
    Ok(())
}

async fn seed_products(db: &Database, count: usize) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let mut generated = 0;

    'outer: for (name_idx, name) in MENU.iter().enumerate() {
        for (size_idx, (size, addon)) in SIZES.iter().enumerate() {
            if generated >= count {
                break 'outer;
            }

            let product = generate_product(name, size, *addon, name_idx * SIZES.len() + size_idx);

            if let Err(e) = db.products().insert(&product).await {
                warn!(name = %product.name, error = %e, "Failed to insert product");
                continue;
            }

            generated += 1;
        }
    }

    info!(generated, elapsed_ms = start.elapsed().as_millis() as u64, "Products seeded");
    Ok(())
}

/// Runs `count` deterministic pseudo-random carts through checkout.
async fn seed_orders(db: &Database, count: usize) -> Result<(), Box<dyn std::error::Error>> {
    let ids: Vec<i64> = db.products().list().await?.iter().map(|p| p.id).collect();
    if ids.is_empty() {
        warn!("No products to sell, skipping order seed");
        return Ok(());
    }

    let service = db.checkout();
    let mut committed = 0;
    let mut short = 0;

    for n in 0..count {
        let lines = 1 + n % 4;
        let cart: Vec<CartItem> = (0..lines)
            .map(|k| {
                let id = ids[(n * 7 + k * 13) % ids.len()];
                CartItem::new(id, 1 + ((n + k) % 3) as i64)
            })
            .collect();

        match service.checkout(&cart).await {
            Ok(_) => committed += 1,
            Err(CheckoutError::InsufficientStock { .. }) => short += 1,
            Err(e) => return Err(e.into()),
        }
    }

    let report = db.reports().today().await?;
    info!(
        committed,
        insufficient_stock = short,
        revenue_cents = report.total_revenue_cents,
        best_seller = report.best_seller.as_ref().map(|b| b.name.as_str()).unwrap_or("-"),
        "Orders seeded"
    );
    Ok(())
}

/// Generates a single product with plausible price and stock.
fn generate_product(name: &str, size: &str, addon: i64, seed: usize) -> NewProduct {
    // Base price 200..=999 cents
    let base = 200 + ((seed * 37) % 800) as i64;
    let stock = 10 + (seed % 101) as i64;

    NewProduct::new(format!("{name} {size}"), base + addon, stock)
}
