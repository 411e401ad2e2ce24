//! JSON REST API for the duplicate review workbench.
//!
//! Exposes an axum [`Router`] backed by any [`dedupe_core::store::ReviewStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", dedupe_api::api_router(store.clone(), ApiSettings::default()))
//! ```

pub mod candidates;
pub mod consultants;
pub mod customers;
pub mod decisions;
pub mod error;
pub mod health;
pub mod metrics;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use dedupe_core::{
  decision::RedecisionPolicy,
  metrics::{Region, default_regions},
  store::ReviewStore,
};

pub use error::ApiError;

/// Deployment knobs the API honours.
#[derive(Debug, Clone)]
pub struct ApiSettings {
  pub redecision_policy: RedecisionPolicy,
  /// Default `limit` for `GET /decisions`.
  pub history_limit:     usize,
  pub regions:           Vec<Region>,
}

impl Default for ApiSettings {
  fn default() -> Self {
    Self {
      redecision_policy: RedecisionPolicy::default(),
      history_limit:     100,
      regions:           default_regions(),
    }
  }
}

/// Shared state of every API handler.
pub struct ApiState<S> {
  pub store:    Arc<S>,
  pub settings: Arc<ApiSettings>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), settings: Arc::clone(&self.settings) }
  }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, settings: ApiSettings) -> Router<()>
where
  S: ReviewStore + 'static,
{
  let state = ApiState { store, settings: Arc::new(settings) };

  Router::new()
    // Metrics
    .route("/metrics", get(metrics::summary::<S>))
    .route("/metrics/activity", get(metrics::activity::<S>))
    .route("/metrics/countries", get(metrics::countries::<S>))
    // Candidates
    .route("/candidates", get(candidates::list::<S>))
    .route("/candidates/pending", get(candidates::pending::<S>))
    .route("/candidates/{id}", get(candidates::get_one::<S>))
    .route("/candidates/{id}/compare", get(candidates::compare::<S>))
    .route("/candidates/{id}/decision", post(candidates::decide::<S>))
    // Customers
    .route("/customers/{id}", get(customers::get_one::<S>))
    // Audit trail
    .route("/decisions", get(decisions::history::<S>))
    .route("/consultants", get(consultants::list::<S>))
    .route("/health", get(health::handler::<S>))
    .with_state(state)
}

#[cfg(test)]
mod tests;
