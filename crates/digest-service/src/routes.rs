//! HTTP surface: one health probe and the two tool endpoints.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::info;

use digest_assembler::assemble;
use digest_ingest::IngestReport;
use digest_types::DigestResult;

use crate::{
    api::{EmbedAndUpsertRequest, HealthResponse, SearchSimilarRequest},
    error::ApiError,
    state::AppState,
};

/// Build the full router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tools/embed_and_upsert", post(embed_and_upsert))
        .route("/tools/search_similar", post(search_similar))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

async fn embed_and_upsert(
    State(state): State<AppState>,
    Json(payload): Json<EmbedAndUpsertRequest>,
) -> Result<Json<IngestReport>, ApiError> {
    payload.validate().map_err(ApiError::validation)?;
    info!(
        workspace_id = %payload.workspace_id,
        messages = payload.messages.len(),
        "embed_and_upsert"
    );
    let report = state
        .pipeline
        .embed_and_upsert(payload.messages, &payload.workspace_id)
        .await?;
    Ok(Json(report))
}

async fn search_similar(
    State(state): State<AppState>,
    Json(payload): Json<SearchSimilarRequest>,
) -> Result<Json<DigestResult>, ApiError> {
    payload.validate().map_err(ApiError::validation)?;
    info!(user_id = %payload.user_id, "search_similar");
    let items = state
        .engine
        .search_similar(&payload.user_id, payload.timeframe, payload.knobs.as_ref())
        .await?;
    // Resolve again for assembly so the grouping quota matches what the
    // engine just ranked under, including any one-call knobs.
    let params = match payload.knobs.as_ref() {
        Some(knobs) => state
            .tuning
            .resolve_with_knobs(&payload.user_id, knobs)
            .map_err(ApiError::validation)?,
        None => state.tuning.resolve(&payload.user_id),
    };
    let digest = assemble(&payload.user_id, payload.timeframe, items, &params);
    Ok(Json(digest))
}
