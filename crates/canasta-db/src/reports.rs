//! Database operations for crowdsourced `price_reports`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `price_reports` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReportRow {
    pub id: i64,
    pub product_id: i64,
    pub store_id: i64,
    pub price: Decimal,
    /// Authenticated reporter identity; `None` for anonymous submissions.
    pub reporter_id: Option<String>,
    pub anonymous_session: Option<String>,
    /// `pending | verified | flagged | rejected | expired`.
    pub status: String,
    pub report_latitude: f64,
    pub report_longitude: f64,
    pub distance_from_store_m: i32,
    pub is_on_sale: bool,
    pub notes: Option<String>,
    pub confirmations: i32,
    pub disputes: i32,
    /// Distinct confirmer identities; `confirmations` always equals its
    /// cardinality.
    pub confirmed_by: Vec<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// An active report joined against the store directory; store fields are
/// `None` when the referenced store no longer exists.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReportWithStore {
    pub id: i64,
    pub product_id: i64,
    pub store_id: i64,
    pub price: Decimal,
    pub is_on_sale: bool,
    pub confirmations: i32,
    pub disputes: i32,
    pub created_at: DateTime<Utc>,
    pub store_name: Option<String>,
    pub store_type: Option<String>,
}

/// Fields for a report about to be inserted. `status` and
/// `distance_from_store_m` are computed by the lifecycle layer before the
/// insert.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub product_id: i64,
    pub store_id: i64,
    pub price: Decimal,
    pub reporter_id: Option<String>,
    pub anonymous_session: Option<String>,
    pub status: String,
    pub report_latitude: f64,
    pub report_longitude: f64,
    pub distance_from_store_m: i32,
    pub is_on_sale: bool,
    pub notes: Option<String>,
}

const REPORT_COLUMNS: &str = "id, product_id, store_id, price, reporter_id, anonymous_session, \
     status, report_latitude, report_longitude, distance_from_store_m, is_on_sale, notes, \
     confirmations, disputes, confirmed_by, expires_at, created_at";

/// Inserts a new report with a 30-day expiry horizon.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_report(pool: &PgPool, new: &NewReport) -> Result<ReportRow, DbError> {
    let row = sqlx::query_as::<_, ReportRow>(&format!(
        "INSERT INTO price_reports \
             (product_id, store_id, price, reporter_id, anonymous_session, status, \
              report_latitude, report_longitude, distance_from_store_m, is_on_sale, notes, \
              expires_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW() + INTERVAL '30 days') \
         RETURNING {REPORT_COLUMNS}"
    ))
    .bind(new.product_id)
    .bind(new.store_id)
    .bind(new.price)
    .bind(&new.reporter_id)
    .bind(&new.anonymous_session)
    .bind(&new.status)
    .bind(new.report_latitude)
    .bind(new.report_longitude)
    .bind(new.distance_from_store_m)
    .bind(new.is_on_sale)
    .bind(&new.notes)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns recent active (`pending`/`verified`, unexpired) reports for a
/// product, newest first, joined against the store directory.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn active_reports_for_product(
    pool: &PgPool,
    product_id: i64,
    limit: i64,
) -> Result<Vec<ReportWithStore>, DbError> {
    let rows = sqlx::query_as::<_, ReportWithStore>(
        "SELECT pr.id, pr.product_id, pr.store_id, pr.price, pr.is_on_sale, \
                pr.confirmations, pr.disputes, pr.created_at, \
                s.name AS store_name, s.store_type AS store_type \
         FROM price_reports pr \
         LEFT JOIN stores s ON s.id = pr.store_id \
         WHERE pr.product_id = $1 \
           AND pr.status IN ('pending', 'verified') \
           AND pr.expires_at > NOW() \
         ORDER BY pr.created_at DESC, pr.id DESC \
         LIMIT $2",
    )
    .bind(product_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Records a confirmation with set semantics: a confirmer already present in
/// `confirmed_by` changes nothing. A `pending` report reaching two distinct
/// confirmers transitions to `verified` (one-way).
///
/// Returns the report row after the call, or `None` if no such report exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a statement fails.
pub async fn confirm_report(
    pool: &PgPool,
    report_id: i64,
    confirmer: &str,
) -> Result<Option<ReportRow>, DbError> {
    let updated = sqlx::query_as::<_, ReportRow>(&format!(
        "UPDATE price_reports SET \
             confirmed_by  = array_append(confirmed_by, $2), \
             confirmations = cardinality(confirmed_by) + 1, \
             status = CASE \
                 WHEN status = 'pending' AND cardinality(confirmed_by) + 1 >= 2 \
                 THEN 'verified' ELSE status \
             END \
         WHERE id = $1 AND NOT ($2 = ANY(confirmed_by)) \
         RETURNING {REPORT_COLUMNS}"
    ))
    .bind(report_id)
    .bind(confirmer)
    .fetch_optional(pool)
    .await?;

    if let Some(row) = updated {
        return Ok(Some(row));
    }

    // Repeat confirmer or unknown id: report the current state, if any.
    let row = sqlx::query_as::<_, ReportRow>(&format!(
        "SELECT {REPORT_COLUMNS} FROM price_reports WHERE id = $1"
    ))
    .bind(report_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Increments the dispute counter. Returns the updated row, or `None` if no
/// such report exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn dispute_report(pool: &PgPool, report_id: i64) -> Result<Option<ReportRow>, DbError> {
    let row = sqlx::query_as::<_, ReportRow>(&format!(
        "UPDATE price_reports SET disputes = disputes + 1 \
         WHERE id = $1 \
         RETURNING {REPORT_COLUMNS}"
    ))
    .bind(report_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Flips reports past their expiry horizon to `expired`. Rows are kept for
/// history; only the status changes. Returns the number updated.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn expire_stale_reports(pool: &PgPool) -> Result<u64, DbError> {
    let result = sqlx::query(
        "UPDATE price_reports SET status = 'expired' \
         WHERE expires_at <= NOW() \
           AND status IN ('pending', 'verified', 'flagged')",
    )
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
