//! `GET /customers/{id}`: a single customer record, 404 if not found.

use axum::{
  Json,
  extract::{Path, State},
};
use dedupe_core::{Error as Domain, customer::Customer, store::ReviewStore};

use crate::{ApiState, error::ApiError};

pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Customer>, ApiError>
where
  S: ReviewStore,
{
  let customer = state
    .store
    .get_customer(&id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| Domain::CustomerNotFound(id.to_owned()))?;
  Ok(Json(customer))
}
