//! Browser front end for the duplicate review workbench.
//!
//! Serves server-rendered HTML pages driven by a per-browser
//! [`SessionState`](dedupe_core::view::SessionState), nests the JSON API
//! under `/api`, and optionally guards everything with HTTP Basic auth.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod pages;
pub mod session;

pub use error::Error;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
  Router, middleware,
  routing::{get, post},
};
use dedupe_api::ApiSettings;
use dedupe_core::{
  decision::RedecisionPolicy,
  metrics::{Region, default_regions},
  store::ReviewStore,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::AuthConfig;
use session::SessionRegistry;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `DEDUPE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                  String,
  pub port:                  u16,
  pub store_path:            PathBuf,
  /// Agent name for new sessions when auth is off.
  pub default_agent_name:    String,
  pub history_limit:         usize,
  /// Recent decisions shown on the dashboard.
  pub recent_activity_limit: usize,
  pub redecision_policy:     RedecisionPolicy,
  pub regions:               Vec<Region>,
  /// Sessions unused for this long are dropped.
  pub session_idle_minutes:  u64,
  pub max_sessions:          usize,
  pub auth_username:         Option<String>,
  pub auth_password_hash:    Option<String>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                  "127.0.0.1".to_string(),
      port:                  8080,
      store_path:            PathBuf::from("~/.local/share/dedupe/review.db"),
      default_agent_name:    "Demo Agent".to_string(),
      history_limit:         100,
      recent_activity_limit: 5,
      redecision_policy:     RedecisionPolicy::default(),
      regions:               default_regions(),
      session_idle_minutes:  120,
      max_sessions:          10_000,
      auth_username:         None,
      auth_password_hash:    None,
    }
  }
}

impl ServerConfig {
  /// Basic-auth credentials, when both halves are configured.
  pub fn auth_config(&self) -> Option<AuthConfig> {
    match (&self.auth_username, &self.auth_password_hash) {
      (Some(username), Some(password_hash)) => Some(AuthConfig {
        username:      username.clone(),
        password_hash: password_hash.clone(),
      }),
      _ => None,
    }
  }

  pub fn session_registry(&self) -> SessionRegistry {
    SessionRegistry::new(
      Duration::from_secs(self.session_idle_minutes.saturating_mul(60)),
      self.max_sessions,
    )
  }

  pub fn api_settings(&self) -> ApiSettings {
    ApiSettings {
      redecision_policy: self.redecision_policy,
      history_limit:     self.history_limit,
      regions:           self.regions.clone(),
    }
  }
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:    Arc<S>,
  pub config:   Arc<ServerConfig>,
  pub auth:     Option<Arc<AuthConfig>>,
  pub sessions: Arc<SessionRegistry>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      config:   Arc::clone(&self.config),
      auth:     self.auth.clone(),
      sessions: Arc::clone(&self.sessions),
    }
  }
}

impl<S> AppState<S> {
  pub fn new(store: Arc<S>, config: ServerConfig) -> Self {
    Self {
      store,
      auth: config.auth_config().map(Arc::new),
      sessions: Arc::new(config.session_registry()),
      config: Arc::new(config),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full application router: pages, stylesheet, and `/api`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ReviewStore + 'static,
{
  let api = dedupe_api::api_router(Arc::clone(&state.store), state.config.api_settings());

  Router::new()
    .route("/", get(handlers::page::handler::<S>))
    .route("/action", post(handlers::action::handler::<S>))
    .route("/decision", post(handlers::decision::handler::<S>))
    .route("/static/app.css", get(pages::stylesheet))
    .with_state(state.clone())
    .nest("/api", api)
    .layer(middleware::from_fn_with_state(state, auth::require_auth::<S>))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests;
