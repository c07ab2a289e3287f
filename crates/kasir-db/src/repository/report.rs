//! # Report Repository
//!
//! Read-only aggregates over committed orders.
//!
//! Ranges are half-open: `start <= created_at < end`. Timestamps are stored
//! as UTC RFC 3339 text, which sorts in time order, so range filters compare
//! them directly and can use `idx_orders_created_at`.

use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use kasir_core::{BestSeller, SalesReport};

/// Repository for sales reports.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Revenue, order count and best seller for `[start, end)`.
    ///
    /// A range with no orders yields zero revenue, zero orders and no best
    /// seller. If the best-seller lookup fails, the report is still returned
    /// with `best_seller: None`.
    pub async fn sales_report(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<SalesReport> {
        if end < start {
            return Err(DbError::QueryFailed(format!(
                "report range ends ({end}) before it starts ({start})"
            )));
        }

        debug!(%start, %end, "Building sales report");

        let (total_revenue_cents, total_orders): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(total_cents), 0),
                COUNT(*)
            FROM orders
            WHERE created_at >= ?1 AND created_at < ?2
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        let best_seller = match self.best_seller(start, end).await {
            Ok(best) => best,
            Err(e) => {
                warn!(error = %e, "Best seller lookup failed, reporting none");
                None
            }
        };

        Ok(SalesReport {
            total_revenue_cents,
            total_orders,
            best_seller,
        })
    }

    /// Report for the current UTC day.
    pub async fn today(&self) -> DbResult<SalesReport> {
        let (start, end) = day_bounds(Utc::now());
        self.sales_report(start, end).await
    }

    /// Product with the most units sold in `[start, end)`.
    ///
    /// Ties go to the lowest product id. The name is the product's current
    /// name.
    pub async fn best_seller(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Option<BestSeller>> {
        let best = sqlx::query_as::<_, BestSeller>(
            r#"
            SELECT
                p.id AS product_id,
                p.name AS name,
                SUM(ol.quantity) AS quantity_sold
            FROM order_lines ol
            JOIN orders o ON o.id = ol.order_id
            JOIN products p ON p.id = ol.product_id
            WHERE o.created_at >= ?1 AND o.created_at < ?2
            GROUP BY p.id, p.name
            ORDER BY quantity_sold DESC, p.id ASC
            LIMIT 1
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_optional(&self.pool)
        .await?;

        Ok(best)
    }
}

/// Midnight-to-midnight UTC bounds of the day containing `now`.
fn day_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .unwrap_or(now);
    (start, start + Duration::days(1))
}

// =============================================================================
// Unit Tests
// =============================================================================
