//! API error type and [`axum::response::IntoResponse`] implementation.

use std::error::Error as StdError;

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn StdError + Send + Sync>),
}

impl ApiError {
  /// Classify a store error by the domain error in its source chain.
  pub fn from_store<E>(err: E) -> Self
  where
    E: StdError + Send + Sync + 'static,
  {
    match dedupe_core::Error::find_in(&err) {
      Some(domain) => Self::classify(domain),
      None => {
        tracing::error!(error = %err, "store query failed");
        Self::Store(Box::new(err))
      }
    }
  }

  fn classify(e: &dedupe_core::Error) -> Self {
    use dedupe_core::Error as Domain;

    match e {
      Domain::CandidateNotFound(_) | Domain::CustomerNotFound(_) => Self::NotFound(e.to_string()),
      Domain::AlreadyDecided { .. } => Self::Conflict(e.to_string()),
      Domain::MissingAgentName | Domain::UnknownValue { .. } => Self::BadRequest(e.to_string()),
    }
  }
}

impl From<dedupe_core::Error> for ApiError {
  fn from(e: dedupe_core::Error) -> Self { Self::classify(&e) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
