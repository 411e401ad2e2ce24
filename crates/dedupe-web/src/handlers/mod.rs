//! Page and form handlers.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/` | Renders the session's current view; filters in the query string |
//! | `POST` | `/action` | Navigation form; redirects back to `/` |
//! | `POST` | `/decision` | Decision form; redirects back to `/` |

pub mod action;
pub mod decision;
pub mod page;

use axum::{
  http::{HeaderMap, header},
  response::{IntoResponse, Redirect, Response},
};
use uuid::Uuid;

use crate::{
  AppState,
  session::{self, SessionGuard},
};

/// Check out the caller's session, or start one named after the
/// authenticated user (or the configured default agent). The session stays
/// locked until the returned guard is dropped.
pub(crate) async fn open_session<S>(
  state: &AppState<S>,
  headers: &HeaderMap,
  user: Option<&str>,
) -> (SessionGuard, bool) {
  let agent = user.unwrap_or(&state.config.default_agent_name);
  state
    .sessions
    .checkout(session::session_id(headers), agent)
    .await
}

/// Attach the session cookie when the session was just created.
pub(crate) fn finish(session_id: Uuid, created: bool, response: impl IntoResponse) -> Response {
  let mut response = response.into_response();
  if created {
    response
      .headers_mut()
      .insert(header::SET_COOKIE, session::cookie(session_id));
  }
  response
}

/// Post/redirect/get: every form lands back on the page.
pub(crate) fn back_to_page() -> Redirect { Redirect::to("/") }
