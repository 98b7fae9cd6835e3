//! Database operations for the `stores` directory.
//!
//! Physical stores are managed elsewhere (suggestions, verification, geo
//! queries); this module covers what ingestion and the read side need — id
//! lookup and the per-chain online storefront that scraped prices attach to.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `stores` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoreRow {
    pub id: i64,
    pub name: String,
    pub store_type: String,
    pub chain: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub district: Option<String>,
    pub is_active: bool,
    pub is_online: bool,
    pub last_scraped_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const STORE_COLUMNS: &str = "id, name, store_type, chain, latitude, longitude, address, district, \
     is_active, is_online, last_scraped_at, created_at, updated_at";

/// Fetches a store by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_store_by_id(pool: &PgPool, id: i64) -> Result<Option<StoreRow>, DbError> {
    let row = sqlx::query_as::<_, StoreRow>(&format!(
        "SELECT {STORE_COLUMNS} FROM stores WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns the online storefront for a chain, if one exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_online_store_for_chain(
    pool: &PgPool,
    chain: &str,
) -> Result<Option<StoreRow>, DbError> {
    let row = sqlx::query_as::<_, StoreRow>(&format!(
        "SELECT {STORE_COLUMNS} FROM stores WHERE chain = $1 AND is_online LIMIT 1"
    ))
    .bind(chain)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns the online storefront for a chain, creating it on first use.
///
/// Upserts against the partial unique index on `(chain) WHERE is_online`, so
/// concurrent ingestion runs converge on one row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn ensure_online_store_for_chain(
    pool: &PgPool,
    chain: &str,
    label: &str,
) -> Result<StoreRow, DbError> {
    let row = sqlx::query_as::<_, StoreRow>(&format!(
        "INSERT INTO stores (name, store_type, chain, is_online) \
         VALUES ($1, 'online', $2, TRUE) \
         ON CONFLICT (chain) WHERE is_online DO UPDATE SET \
             name       = EXCLUDED.name, \
             updated_at = NOW() \
         RETURNING {STORE_COLUMNS}"
    ))
    .bind(label)
    .bind(chain)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Stamps `last_scraped_at = NOW()` on a store.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn touch_last_scraped(pool: &PgPool, store_id: i64) -> Result<(), DbError> {
    sqlx::query("UPDATE stores SET last_scraped_at = NOW(), updated_at = NOW() WHERE id = $1")
        .bind(store_id)
        .execute(pool)
        .await?;

    Ok(())
}
