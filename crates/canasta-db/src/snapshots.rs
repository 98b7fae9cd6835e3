//! Database operations for `price_snapshots`.
//!
//! Invariant: for a given (product, store) pair at most one snapshot has
//! `is_latest = true`. The rotation is a two-step unset-then-insert sequence,
//! not a transaction — a crash between the steps leaves the pair with zero
//! latest snapshots until the next ingestion, which readers tolerate.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `price_snapshots` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PriceSnapshotRow {
    pub id: i64,
    pub product_id: i64,
    pub store_id: i64,
    pub price: Decimal,
    /// Price of the previous latest snapshot, recorded only when different.
    pub previous_price: Option<Decimal>,
    pub is_available: bool,
    pub is_on_sale: bool,
    pub sale_percentage: Option<i32>,
    pub original_name: Option<String>,
    pub original_url: Option<String>,
    pub original_image_url: Option<String>,
    pub scraped_at: DateTime<Utc>,
    pub is_latest: bool,
}

/// A latest snapshot joined against the store directory; store fields are
/// `None` when the referenced store no longer exists.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SnapshotWithStore {
    pub id: i64,
    pub product_id: i64,
    pub store_id: i64,
    pub price: Decimal,
    pub is_on_sale: bool,
    pub scraped_at: DateTime<Utc>,
    pub store_name: Option<String>,
    pub store_type: Option<String>,
}

/// Fields for a snapshot about to be persisted.
#[derive(Debug, Clone)]
pub struct NewSnapshot {
    pub product_id: i64,
    pub store_id: i64,
    pub price: Decimal,
    pub is_available: bool,
    pub is_on_sale: bool,
    pub sale_percentage: i32,
    pub original_name: Option<String>,
    pub original_url: Option<String>,
    pub original_image_url: Option<String>,
}

const SNAPSHOT_COLUMNS: &str = "id, product_id, store_id, price, previous_price, is_available, \
     is_on_sale, sale_percentage, original_name, original_url, original_image_url, \
     scraped_at, is_latest";

/// Returns the current latest snapshot for a (product, store) pair, if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn latest_snapshot_for_pair(
    pool: &PgPool,
    product_id: i64,
    store_id: i64,
) -> Result<Option<PriceSnapshotRow>, DbError> {
    let row = sqlx::query_as::<_, PriceSnapshotRow>(&format!(
        "SELECT {SNAPSHOT_COLUMNS} FROM price_snapshots \
         WHERE product_id = $1 AND store_id = $2 AND is_latest \
         ORDER BY scraped_at DESC, id DESC \
         LIMIT 1"
    ))
    .bind(product_id)
    .bind(store_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Persists a new latest snapshot for a (product, store) pair.
///
/// Sequence: read the outgoing latest (to derive `previous_price`), mark it
/// no-longer-latest, then insert the new row as latest. The two writes are
/// intentionally separate statements; see the module docs for the failure
/// mode this trades for.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails.
pub async fn rotate_latest_snapshot(
    pool: &PgPool,
    new: &NewSnapshot,
) -> Result<PriceSnapshotRow, DbError> {
    let outgoing = latest_snapshot_for_pair(pool, new.product_id, new.store_id).await?;
    let previous_price = outgoing
        .as_ref()
        .map(|s| s.price)
        .filter(|&p| p != new.price);

    sqlx::query(
        "UPDATE price_snapshots SET is_latest = FALSE \
         WHERE product_id = $1 AND store_id = $2 AND is_latest",
    )
    .bind(new.product_id)
    .bind(new.store_id)
    .execute(pool)
    .await?;

    let row = sqlx::query_as::<_, PriceSnapshotRow>(&format!(
        "INSERT INTO price_snapshots \
             (product_id, store_id, price, previous_price, is_available, is_on_sale, \
              sale_percentage, original_name, original_url, original_image_url, \
              scraped_at, is_latest) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW(), TRUE) \
         RETURNING {SNAPSHOT_COLUMNS}"
    ))
    .bind(new.product_id)
    .bind(new.store_id)
    .bind(new.price)
    .bind(previous_price)
    .bind(new.is_available)
    .bind(new.is_on_sale)
    .bind(new.sale_percentage)
    .bind(&new.original_name)
    .bind(&new.original_url)
    .bind(&new.original_image_url)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns every currently-latest snapshot for a product, joined against the
/// store directory (left join — missing stores surface as `None` fields).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn latest_snapshots_for_product(
    pool: &PgPool,
    product_id: i64,
) -> Result<Vec<SnapshotWithStore>, DbError> {
    let rows = sqlx::query_as::<_, SnapshotWithStore>(
        "SELECT ps.id, ps.product_id, ps.store_id, ps.price, ps.is_on_sale, ps.scraped_at, \
                s.name AS store_name, s.store_type AS store_type \
         FROM price_snapshots ps \
         LEFT JOIN stores s ON s.id = ps.store_id \
         WHERE ps.product_id = $1 AND ps.is_latest \
         ORDER BY ps.scraped_at DESC, ps.id DESC",
    )
    .bind(product_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Deletes snapshots older than `days` days. Returns the number removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn purge_snapshots_older_than(pool: &PgPool, days: i32) -> Result<u64, DbError> {
    let result = sqlx::query(
        "DELETE FROM price_snapshots \
         WHERE scraped_at < NOW() - make_interval(days => $1)",
    )
    .bind(days)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
