//! `GET /consultants`: agents derived from the audit trail.

use axum::{Json, extract::State};
use dedupe_core::{metrics::Consultant, store::ReviewStore};

use crate::{ApiState, error::ApiError};

pub async fn list<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Consultant>>, ApiError>
where
  S: ReviewStore,
{
  let consultants = state
    .store
    .consultants()
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(consultants))
}
