//! Per-browser session registry keyed by the `dedupe_session` cookie.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex, MutexGuard},
  time::{Duration, Instant},
};

use axum::http::{HeaderMap, HeaderValue, header};
use dedupe_core::view::SessionState;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "dedupe_session";

/// A checked-out session. Other requests for the same session wait until
/// this guard is dropped.
pub type SessionGuard = OwnedMutexGuard<SessionState>;

struct Entry {
  state:     Arc<AsyncMutex<SessionState>>,
  last_seen: Instant,
}

/// In-memory session store.
///
/// A request holds its session's lock from checkout until the response is
/// built, so requests from one browser apply their transitions one at a time.
/// Sessions idle for longer than `idle_timeout` are dropped, and the least
/// recently seen ones go first once `max_sessions` is reached.
pub struct SessionRegistry {
  sessions:     Mutex<HashMap<Uuid, Entry>>,
  idle_timeout: Duration,
  max_sessions: usize,
}

impl Default for SessionRegistry {
  fn default() -> Self { Self::new(Duration::from_secs(2 * 60 * 60), 10_000) }
}

impl SessionRegistry {
  pub fn new(idle_timeout: Duration, max_sessions: usize) -> Self {
    Self {
      sessions: Mutex::new(HashMap::new()),
      idle_timeout,
      max_sessions: max_sessions.max(1),
    }
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Entry>> {
    // Entries are replaced whole, so a poisoned map is still consistent.
    self.sessions.lock().unwrap_or_else(|e| e.into_inner())
  }

  /// Lock the session for `id`, or start a fresh one when the id is absent,
  /// unknown or expired. The flag is true when a new session was created.
  pub async fn checkout(&self, id: Option<Uuid>, agent_name: &str) -> (SessionGuard, bool) {
    let (state, created) = self.entry_at(id, agent_name, Instant::now());
    (state.lock_owned().await, created)
  }

  fn entry_at(
    &self,
    id: Option<Uuid>,
    agent_name: &str,
    now: Instant,
  ) -> (Arc<AsyncMutex<SessionState>>, bool) {
    let mut sessions = self.lock();
    let idle_timeout = self.idle_timeout;
    sessions.retain(|_, e| now.saturating_duration_since(e.last_seen) < idle_timeout);

    if let Some(entry) = id.and_then(|id| sessions.get_mut(&id)) {
      entry.last_seen = now;
      return (Arc::clone(&entry.state), false);
    }

    while sessions.len() >= self.max_sessions {
      let Some(oldest) = sessions
        .iter()
        .min_by_key(|(_, e)| e.last_seen)
        .map(|(id, _)| *id)
      else {
        break;
      };
      sessions.remove(&oldest);
      tracing::debug!(session_id = %oldest, "evicted least recently seen session");
    }

    let state = SessionState::new(agent_name);
    let session_id = state.session_id;
    let state = Arc::new(AsyncMutex::new(state));
    sessions.insert(session_id, Entry { state: Arc::clone(&state), last_seen: now });
    tracing::debug!(%session_id, "new session");
    (state, true)
  }

  pub fn len(&self) -> usize { self.lock().len() }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Session id from the `Cookie` header, if present and well-formed.
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
    .find_map(|value| Uuid::parse_str(value.trim()).ok())
}

/// `Set-Cookie` value for a session.
pub fn cookie(id: Uuid) -> HeaderValue {
  let value = format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax");
  HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static(""))
}
