use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use canasta_db::ReportRow;
use canasta_prices::SubmitReport;

use crate::middleware::RequestId;

use super::{map_prices_error, ApiError, ApiResponse, AppState, ResponseMeta};

/// Wire shape of a stored report; confirmer identities stay server-side.
#[derive(Debug, Serialize)]
pub(super) struct ReportView {
    id: i64,
    product_id: i64,
    store_id: i64,
    price: Decimal,
    status: String,
    distance_from_store_m: i32,
    is_on_sale: bool,
    confirmations: i32,
    disputes: i32,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl From<ReportRow> for ReportView {
    fn from(row: ReportRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            store_id: row.store_id,
            price: row.price,
            status: row.status,
            distance_from_store_m: row.distance_from_store_m,
            is_on_sale: row.is_on_sale,
            confirmations: row.confirmations,
            disputes: row.disputes,
            expires_at: row.expires_at,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ConfirmBody {
    confirmer: String,
}

/// `POST /api/v1/reports` — submit a crowdsourced price report.
pub(super) async fn submit_report(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<SubmitReport>,
) -> Result<(StatusCode, Json<ApiResponse<ReportView>>), ApiError> {
    let row = canasta_prices::submit(&state.pool, request)
        .await
        .map_err(|e| map_prices_error(req_id.0.clone(), &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: row.into(),
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// `POST /api/v1/reports/{report_id}/confirm` — idempotent per confirmer.
pub(super) async fn confirm_report(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(report_id): Path<i64>,
    Json(body): Json<ConfirmBody>,
) -> Result<Json<ApiResponse<ReportView>>, ApiError> {
    let row = canasta_prices::confirm(&state.pool, report_id, &body.confirmer)
        .await
        .map_err(|e| map_prices_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: row.into(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// `POST /api/v1/reports/{report_id}/dispute`.
pub(super) async fn dispute_report(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(report_id): Path<i64>,
) -> Result<Json<ApiResponse<ReportView>>, ApiError> {
    let row = canasta_prices::dispute(&state.pool, report_id)
        .await
        .map_err(|e| map_prices_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: row.into(),
        meta: ResponseMeta::new(req_id.0),
    }))
}
