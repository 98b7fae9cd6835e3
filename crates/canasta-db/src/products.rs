//! Database operations for the `products` catalog.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    /// External barcode (EAN) or platform catalog id; the cross-source key.
    pub barcode: String,
    pub name: String,
    pub brand: Option<String>,
    /// Lowercase [`canasta_core::ProductCategory`] string; `NULL` until the
    /// classifier assigns one.
    pub category: Option<String>,
    pub unit: String,
    pub unit_size: Option<Decimal>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub is_basket: bool,
    pub average_price: Option<Decimal>,
    /// Monotonic floor: only ever lowered once set.
    pub lowest_price_ever: Option<Decimal>,
    pub total_price_reports: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Seed fields for a product created on first sighting from any source.
#[derive(Debug, Clone)]
pub struct ProductSeed {
    pub name: String,
    pub brand: Option<String>,
    pub image_url: Option<String>,
}

const PRODUCT_COLUMNS: &str = "id, barcode, name, brand, category, unit, unit_size, image_url, \
     is_active, is_basket, average_price, lowest_price_ever, total_price_reports, \
     created_at, updated_at";

/// Resolves a product by barcode, creating it if absent (atomic upsert).
///
/// On conflict the existing row keeps its name but absent `brand`/`image_url`
/// are filled in from the seed, so two chains racing on the same barcode
/// produce exactly one row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn find_or_create_by_barcode(
    pool: &PgPool,
    barcode: &str,
    seed: &ProductSeed,
) -> Result<ProductRow, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "INSERT INTO products (barcode, name, brand, image_url) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (barcode) DO UPDATE SET \
             brand      = COALESCE(products.brand, EXCLUDED.brand), \
             image_url  = COALESCE(products.image_url, EXCLUDED.image_url), \
             updated_at = NOW() \
         RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(barcode)
    .bind(&seed.name)
    .bind(&seed.brand)
    .bind(&seed.image_url)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Fetches a product by internal id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_product_by_id(pool: &PgPool, id: i64) -> Result<Option<ProductRow>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Assigns a category only when the product has none yet.
///
/// Returns `true` if the row was updated.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn set_category_if_unset(
    pool: &PgPool,
    product_id: i64,
    category: &str,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "UPDATE products SET category = $2, updated_at = NOW() \
         WHERE id = $1 AND category IS NULL",
    )
    .bind(product_id)
    .bind(category)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Recomputes the product's rolling price stats from all currently-latest
/// snapshots across stores and bumps the report counter.
///
/// `average_price` is the mean of latest prices; `lowest_price_ever` is
/// `LEAST(existing, minimum latest)` so it only ever decreases. Called once
/// per persisted snapshot.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn refresh_price_stats(pool: &PgPool, product_id: i64) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE products p SET \
             average_price       = s.avg_price, \
             lowest_price_ever   = LEAST(COALESCE(p.lowest_price_ever, s.min_price), s.min_price), \
             total_price_reports = p.total_price_reports + 1, \
             updated_at          = NOW() \
         FROM ( \
             SELECT AVG(price) AS avg_price, MIN(price) AS min_price \
             FROM price_snapshots \
             WHERE product_id = $1 AND is_latest \
         ) s \
         WHERE p.id = $1 AND s.min_price IS NOT NULL",
    )
    .bind(product_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Returns all active basket products (the high-frequency scrape subset).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_basket_products(pool: &PgPool) -> Result<Vec<ProductRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products \
         WHERE is_basket AND is_active \
         ORDER BY category NULLS LAST, name"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
