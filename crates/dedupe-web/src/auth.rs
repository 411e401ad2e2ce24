//! Optional HTTP Basic auth: a middleware guarding every route and an
//! extractor for the authenticated username.

use std::convert::Infallible;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::{FromRequestParts, Request, State},
  http::{HeaderMap, request::Parts},
  middleware::Next,
  response::{IntoResponse, Response},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use dedupe_core::store::ReviewStore;

use crate::{AppState, error::Error};

/// Credentials accepted as valid for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// The username that passed [`require_auth`], stored as a request extension.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

/// Verify credentials directly from headers and return the username.
pub fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<String, Error> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| Error::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(Error::Unauthorized)?;

  if username != config.username {
    return Err(Error::Unauthorized);
  }

  let parsed_hash = PasswordHash::new(&config.password_hash)
    .map_err(|_| Error::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| Error::Unauthorized)?;

  Ok(username.to_owned())
}

/// Reject unauthenticated requests when credentials are configured; pass
/// everything through otherwise.
pub async fn require_auth<S>(
  State(state): State<AppState<S>>,
  mut req: Request,
  next: Next,
) -> Response
where
  S: ReviewStore + 'static,
{
  let Some(auth) = state.auth.as_deref() else {
    return next.run(req).await;
  };
  match verify_auth(req.headers(), auth) {
    Ok(username) => {
      req.extensions_mut().insert(AuthUser(username));
      next.run(req).await
    }
    Err(e) => {
      tracing::warn!(uri = %req.uri(), "rejected unauthenticated request");
      e.into_response()
    }
  }
}

/// The authenticated username, if auth is enabled.
pub struct MaybeUser(pub Option<String>);

impl<S> FromRequestParts<S> for MaybeUser
where
  S: Send + Sync,
{
  type Rejection = Infallible;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    Ok(MaybeUser(parts.extensions.get::<AuthUser>().map(|u| u.0.clone())))
  }
}
