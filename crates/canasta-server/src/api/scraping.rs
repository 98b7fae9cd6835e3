use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;

use canasta_ingest::RunOutcome;

use crate::middleware::RequestId;

use super::{map_ingest_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct TriggerAck {
    message: &'static str,
}

#[derive(Debug, Serialize)]
pub(super) struct ChainRunResult {
    chain: String,
    offers_persisted: i32,
}

/// `POST /api/v1/scraping/run` — fire-and-forget full-catalog run.
///
/// The run is spawned in the background and the request returns immediately;
/// an overlapping trigger is absorbed by the orchestrator's in-progress
/// guard, so the caller always gets an acknowledgment.
pub(super) async fn run_full(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> (StatusCode, Json<ApiResponse<TriggerAck>>) {
    let ingestor = Arc::clone(&state.ingestor);
    tokio::spawn(async move {
        match ingestor.run_full_scrape("api").await {
            Ok(RunOutcome::Completed { offers_persisted }) => {
                tracing::info!(offers_persisted, "api-triggered full scrape finished");
            }
            Ok(RunOutcome::AlreadyRunning) => {}
            Err(e) => tracing::error!(error = %e, "api-triggered full scrape failed"),
        }
    });

    (
        StatusCode::ACCEPTED,
        Json(ApiResponse {
            data: TriggerAck {
                message: "full scrape started in background",
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    )
}

/// `POST /api/v1/scraping/run/{chain}` — synchronous single-chain run;
/// responds with the number of offers persisted.
pub(super) async fn run_chain(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(chain): Path<String>,
) -> Result<Json<ApiResponse<ChainRunResult>>, ApiError> {
    let outcome = state
        .ingestor
        .run_chain_scrape(&chain, "api")
        .await
        .map_err(|e| map_ingest_error(req_id.0.clone(), &e))?;

    match outcome {
        RunOutcome::Completed { offers_persisted } => Ok(Json(ApiResponse {
            data: ChainRunResult {
                chain,
                offers_persisted,
            },
            meta: ResponseMeta::new(req_id.0),
        })),
        RunOutcome::AlreadyRunning => Err(ApiError::new(
            req_id.0,
            "conflict",
            "a scrape run is already in progress",
        )),
    }
}
