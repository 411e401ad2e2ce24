//! `GET /health`: store connectivity.
//!
//! 200 `{"status":"ok"}` when the store answers, 503 otherwise.

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use dedupe_core::store::ReviewStore;
use serde_json::json;

use crate::ApiState;

pub async fn handler<S>(State(state): State<ApiState<S>>) -> Response
where
  S: ReviewStore,
{
  match state.store.ping().await {
    Ok(()) => Json(json!({ "status": "ok" })).into_response(),
    Err(e) => {
      tracing::error!(error = %e, "store health check failed");
      (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "status": "unavailable", "error": e.to_string() })),
      )
        .into_response()
    }
  }
}
