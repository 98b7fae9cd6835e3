//! Crowdsourced report lifecycle: submission with distance flagging,
//! idempotent confirmation with auto-verification, and disputes.

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;

use canasta_core::haversine_distance_m;
use canasta_db::{NewReport, ReportRow};

use crate::PricesError;

/// Reports submitted farther than this from the claimed store are flagged.
const FLAG_DISTANCE_M: f64 = 500.0;

/// A price report as submitted by a user.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitReport {
    pub product_id: i64,
    pub store_id: i64,
    pub price: Decimal,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub reporter_id: Option<String>,
    #[serde(default)]
    pub anonymous_session: Option<String>,
    #[serde(default)]
    pub is_on_sale: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Initial status for a report submitted `distance_m` meters from the
/// claimed store's registered location.
#[must_use]
pub fn initial_status(distance_m: f64) -> &'static str {
    if distance_m > FLAG_DISTANCE_M {
        "flagged"
    } else {
        "pending"
    }
}

/// Stores a new report.
///
/// The great-circle distance between the submission location and the store's
/// registered coordinates decides the initial status; a store without
/// registered coordinates cannot be distance-checked and the report enters
/// as `pending`.
///
/// # Errors
///
/// - [`PricesError::InvalidPrice`] for a non-positive price.
/// - [`PricesError::ProductNotFound`] / [`PricesError::StoreNotFound`] for
///   broken references.
/// - [`PricesError::Db`] if persistence fails.
pub async fn submit(pool: &PgPool, request: SubmitReport) -> Result<ReportRow, PricesError> {
    if request.price <= Decimal::ZERO {
        return Err(PricesError::InvalidPrice);
    }

    canasta_db::find_product_by_id(pool, request.product_id)
        .await?
        .ok_or(PricesError::ProductNotFound(request.product_id))?;

    let store = canasta_db::find_store_by_id(pool, request.store_id)
        .await?
        .ok_or(PricesError::StoreNotFound(request.store_id))?;

    let distance_m = match (store.latitude, store.longitude) {
        (Some(lat), Some(lon)) => {
            haversine_distance_m(request.latitude, request.longitude, lat, lon)
        }
        _ => 0.0,
    };

    let status = initial_status(distance_m);

    #[allow(clippy::cast_possible_truncation)]
    let distance_rounded = distance_m.round() as i32;

    let row = canasta_db::insert_report(
        pool,
        &NewReport {
            product_id: request.product_id,
            store_id: request.store_id,
            price: request.price.round_dp(2),
            reporter_id: request.reporter_id,
            anonymous_session: request.anonymous_session,
            status: status.to_owned(),
            report_latitude: request.latitude,
            report_longitude: request.longitude,
            distance_from_store_m: distance_rounded,
            is_on_sale: request.is_on_sale,
            notes: request.notes,
        },
    )
    .await?;

    tracing::info!(
        report_id = row.id,
        product_id = row.product_id,
        store_id = row.store_id,
        status = %row.status,
        distance_m = row.distance_from_store_m,
        "price report submitted"
    );

    Ok(row)
}

/// Records a confirmation; repeated confirmations from the same identity
/// count once. Two distinct confirmers auto-verify a pending report.
///
/// # Errors
///
/// Returns [`PricesError::ReportNotFound`] for an unknown id or
/// [`PricesError::Db`] if the update fails.
pub async fn confirm(
    pool: &PgPool,
    report_id: i64,
    confirmer: &str,
) -> Result<ReportRow, PricesError> {
    let row = canasta_db::confirm_report(pool, report_id, confirmer)
        .await?
        .ok_or(PricesError::ReportNotFound(report_id))?;

    Ok(row)
}

/// Records a dispute. Disputes lower merge confidence but never revert a
/// verified report.
///
/// # Errors
///
/// Returns [`PricesError::ReportNotFound`] for an unknown id or
/// [`PricesError::Db`] if the update fails.
pub async fn dispute(pool: &PgPool, report_id: i64) -> Result<ReportRow, PricesError> {
    let row = canasta_db::dispute_report(pool, report_id)
        .await?
        .ok_or(PricesError::ReportNotFound(report_id))?;

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flagging_threshold_is_strictly_over_500_meters() {
        assert_eq!(initial_status(501.0), "flagged");
        assert_eq!(initial_status(499.0), "pending");
        assert_eq!(initial_status(500.0), "pending", "exactly at the limit passes");
        assert_eq!(initial_status(0.0), "pending");
    }

    #[test]
    fn haversine_feeds_the_threshold_as_expected() {
        // ~0.0045° latitude ≈ 500 m: nudge each side of the threshold.
        let store = (-12.0464, -77.0428);
        let just_inside = haversine_distance_m(-12.0508, -77.0428, store.0, store.1);
        let far_away = haversine_distance_m(-12.0600, -77.0428, store.0, store.1);

        assert_eq!(initial_status(just_inside), "pending", "{just_inside} m");
        assert_eq!(initial_status(far_away), "flagged", "{far_away} m");
    }
}
