use axum::{extract::State, Extension, Json};
use serde::Deserialize;

use canasta_prices::{ListItem, StoreTotal};

use crate::middleware::RequestId;

use super::{map_prices_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct StoreTotalsRequest {
    items: Vec<ListItem>,
}

/// `POST /api/v1/store-totals` — cheapest achievable subtotal per store for
/// a shopping list, ascending by total. Stores covering nothing are omitted.
pub(super) async fn compute(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<StoreTotalsRequest>,
) -> Result<Json<ApiResponse<Vec<StoreTotal>>>, ApiError> {
    let totals = canasta_prices::store_totals(&state.pool, &request.items)
        .await
        .map_err(|e| map_prices_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: totals,
        meta: ResponseMeta::new(req_id.0),
    }))
}
