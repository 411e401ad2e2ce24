//! `GET /decisions[?limit=N]`: the audit trail, newest first.
//!
//! `limit` defaults to the configured history limit.

use axum::{
  Json,
  extract::{Query, State},
};
use dedupe_core::{
  decision::{HistoryEntry, HistorySummary},
  store::ReviewStore,
};
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
  pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
  pub summary: HistorySummary,
  pub entries: Vec<HistoryEntry>,
}

pub async fn history<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, ApiError>
where
  S: ReviewStore,
{
  let limit = params.limit.unwrap_or(state.settings.history_limit);
  let entries = state
    .store
    .decision_history(limit)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(HistoryResponse { summary: HistorySummary::of(&entries), entries }))
}
