use axum::{
    extract::{Path, State},
    Extension, Json,
};

use canasta_prices::MergedPriceEntry;

use crate::middleware::RequestId;

use super::{map_prices_error, ApiError, ApiResponse, AppState, ResponseMeta};

/// `GET /api/v1/products/{product_id}/prices` — the merged, price-sorted
/// list from both sources. A product nobody has priced yet returns an empty
/// list, not an error.
pub(super) async fn product_prices(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(product_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<MergedPriceEntry>>>, ApiError> {
    let entries = canasta_prices::prices_for_product(&state.pool, product_id)
        .await
        .map_err(|e| map_prices_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: entries,
        meta: ResponseMeta::new(req_id.0),
    }))
}
