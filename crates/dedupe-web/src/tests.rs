//! End-to-end tests of the page router against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use base64::Engine as _;
use chrono::{TimeZone, Utc};
use dedupe_core::{
  candidate::{CandidateStatus, DuplicateCandidate, Priority},
  customer::Customer,
  decision::{Decision, NewDecision, RedecisionPolicy},
  store::ReviewStore,
};
use dedupe_store_sqlite::SqliteStore;
use tower::ServiceExt as _;

use crate::{AppState, ServerConfig, router};

async fn make_store() -> Arc<SqliteStore> {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let person = |id: &str, first: &str, country: &str| Customer {
    first_name: Some(first.into()),
    last_name: Some("Tui".into()),
    country: Some(country.into()),
    ..Customer::new(id)
  };
  store
    .load_customers(vec![
      person("A1", "Mere", "Fiji"),
      person("A2", "Mere", "Fiji"),
      person("B1", "Sione", "Tonga"),
      person("B2", "Sione", "Tonga"),
    ])
    .await
    .unwrap();
  let candidate = |id: &str, a: &str, b: &str, score: f64, priority| DuplicateCandidate {
    candidate_id: id.into(),
    customer_id_1: a.into(),
    customer_id_2: b.into(),
    match_score: score,
    match_reason: Some("Name match".into()),
    priority,
    status: CandidateStatus::Pending,
    assigned_to: None,
    created_date: Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
  };
  store
    .load_candidates(vec![
      candidate("C1", "A1", "A2", 92.0, Priority::High),
      candidate("C2", "B1", "B2", 75.0, Priority::Medium),
    ])
    .await
    .unwrap();
  Arc::new(store)
}

/// A browser: one cookie jar against one router.
struct Browser {
  app:    Router,
  cookie: Option<String>,
  auth:   Option<String>,
}

impl Browser {
  fn new(store: Arc<SqliteStore>, config: ServerConfig) -> Self {
    Self { app: router(AppState::new(store, config)), cookie: None, auth: None }
  }

  async fn send(&mut self, req: axum::http::request::Builder, body: Body) -> (StatusCode, String) {
    let mut req = req;
    if let Some(cookie) = &self.cookie {
      req = req.header(header::COOKIE, cookie);
    }
    if let Some(auth) = &self.auth {
      req = req.header(header::AUTHORIZATION, auth);
    }
    let res = self.app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    if let Some(set) = res.headers().get(header::SET_COOKIE) {
      let pair = set.to_str().unwrap().split(';').next().unwrap();
      self.cookie = Some(pair.to_owned());
    }
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
  }

  async fn get(&mut self, uri: &str) -> (StatusCode, String) {
    self.send(Request::builder().uri(uri), Body::empty()).await
  }

  async fn post(&mut self, uri: &str, form: &str) -> StatusCode {
    let req = Request::builder()
      .method("POST")
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    self.send(req, Body::from(form.to_owned())).await.0
  }
}

// ─── Sessions & navigation ───────────────────────────────────────────────────

#[tokio::test]
async fn first_visit_starts_session_on_dashboard() {
  let mut b = Browser::new(make_store().await, ServerConfig::default());
  let (status, html) = b.get("/").await;
  assert_eq!(status, StatusCode::OK);
  assert!(b.cookie.as_deref().unwrap().starts_with("dedupe_session="));
  assert!(html.contains("<h2>Dashboard</h2>"));
  assert!(html.contains("Demo Agent"));
  assert!(html.contains("Pending by region"));
}

#[tokio::test]
async fn forms_redirect_back_to_page() {
  let mut b = Browser::new(make_store().await, ServerConfig::default());
  b.get("/").await;
  let status = b.post("/action", "action=navigate&view=history").await;
  assert_eq!(status, StatusCode::SEE_OTHER);
  let (_, html) = b.get("/").await;
  assert!(html.contains("<h2>Decision History</h2>"));
}

#[tokio::test]
async fn unknown_action_and_view_are_rejected() {
  let mut b = Browser::new(make_store().await, ServerConfig::default());
  assert_eq!(b.post("/action", "action=explode").await, StatusCode::BAD_REQUEST);
  assert_eq!(b.post("/action", "action=navigate&view=nowhere").await, StatusCode::BAD_REQUEST);
  assert_eq!(b.post("/action", "action=open").await, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sessions_do_not_share_state() {
  let store = make_store().await;
  let mut a = Browser::new(Arc::clone(&store), ServerConfig::default());
  a.get("/").await;
  a.post("/action", "action=navigate&view=admin").await;

  // A second cookie jar against the same router.
  let mut b = Browser { app: a.app.clone(), cookie: None, auth: None };
  let (_, html) = b.get("/").await;
  assert!(html.contains("<h2>Dashboard</h2>"));
  let (_, html) = a.get("/").await;
  assert!(html.contains("<h2>User Admin</h2>"));
}

#[tokio::test]
async fn cookieless_visits_do_not_grow_the_registry() {
  let state = AppState::new(make_store().await, ServerConfig { max_sessions: 10, ..Default::default() });
  let sessions = Arc::clone(&state.sessions);
  let app = router(state);

  for _ in 0..50 {
    let mut b = Browser { app: app.clone(), cookie: None, auth: None };
    let (status, _) = b.get("/").await;
    assert_eq!(status, StatusCode::OK);
  }
  assert_eq!(sessions.len(), 10);
}

#[tokio::test]
async fn work_queue_filters_by_priority() {
  let mut b = Browser::new(make_store().await, ServerConfig::default());
  b.get("/").await;
  b.post("/action", "action=navigate&view=work_queue").await;
  let (_, html) = b.get("/?priority=MEDIUM").await;
  assert!(html.contains("1 pending"));
  assert!(html.contains(r#"value="C2""#));
  assert!(!html.contains(r#"value="C1""#));

  // Unparseable filters fall back to "any".
  let (_, html) = b.get("/?priority=urgent&sort=sideways").await;
  assert!(html.contains("2 pending"));
}

// ─── Review ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn review_picks_highest_score_first() {
  let mut b = Browser::new(make_store().await, ServerConfig::default());
  b.post("/action", "action=navigate&view=review").await;
  let (_, html) = b.get("/").await;
  assert!(html.contains("<h2>Review Records</h2>"));
  assert!(html.contains("<strong>C1</strong>"));
  assert!(html.contains("1 more pending"));
}

#[tokio::test]
async fn decision_is_recorded_and_next_candidate_follows() {
  let store = make_store().await;
  let mut b = Browser::new(Arc::clone(&store), ServerConfig::default());
  b.post("/action", "action=open&candidate_id=C1").await;

  let status = b
    .post(
      "/decision",
      "candidate_id=C1&decision=MATCHED&decision_reason=Same+person+-+confirmed+match&notes=",
    )
    .await;
  assert_eq!(status, StatusCode::SEE_OTHER);

  let (_, html) = b.get("/").await;
  assert!(html.contains("Decision recorded: MATCHED"));
  assert!(html.contains("<strong>C2</strong>"));

  let c1 = store.get_candidate("C1").await.unwrap().unwrap();
  assert_eq!(c1.status, CandidateStatus::Matched);
  assert_eq!(c1.assigned_to.as_deref(), Some("Demo Agent"));

  let history = store.decision_history(10).await.unwrap();
  assert_eq!(history.len(), 1);
  assert_eq!(history[0].decision_reason.as_deref(), Some("Same person - confirmed match"));
}

#[tokio::test]
async fn custom_reason_and_agent_name_are_used() {
  let store = make_store().await;
  let mut b = Browser::new(Arc::clone(&store), ServerConfig::default());
  b.post("/action", "action=set_agent&agent_name=O%27Brien").await;
  b.post("/action", "action=open&candidate_id=C2").await;
  b.post(
    "/decision",
    "candidate_id=C2&decision=NOT_MATCHED&decision_reason=&custom_reason=twins&notes=checked+ID",
  )
  .await;

  let history = store.decision_history(10).await.unwrap();
  assert_eq!(history[0].agent_name, "O'Brien");
  assert_eq!(history[0].decision, Decision::NotMatched);
  assert_eq!(history[0].decision_reason.as_deref(), Some("twins"));
  assert_eq!(history[0].notes.as_deref(), Some("checked ID"));
}

#[tokio::test]
async fn bad_decision_value_is_rejected() {
  let mut b = Browser::new(make_store().await, ServerConfig::default());
  let status = b.post("/decision", "candidate_id=C1&decision=MAYBE").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn vanished_candidate_falls_back_with_warning() {
  let mut b = Browser::new(make_store().await, ServerConfig::default());
  b.post("/action", "action=navigate&view=review_matches").await;
  b.post("/action", "action=open&candidate_id=C404").await;
  let (status, html) = b.get("/").await;
  assert_eq!(status, StatusCode::OK);
  assert!(html.contains("notice-warning"));
  assert!(html.contains("Candidate not found"));
  assert!(html.contains("<h2>Review Matches</h2>"));
}

#[tokio::test]
async fn missing_customer_falls_back_with_warning() {
  let store = make_store().await;
  store
    .load_candidates(vec![DuplicateCandidate {
      candidate_id:  "C9".into(),
      customer_id_1: "A1".into(),
      customer_id_2: "Z9".into(),
      match_score:   80.0,
      match_reason:  None,
      priority:      Priority::Low,
      status:        CandidateStatus::Pending,
      assigned_to:   None,
      created_date:  Utc::now(),
    }])
    .await
    .unwrap();
  let mut b = Browser::new(store, ServerConfig::default());
  b.post("/action", "action=open&candidate_id=C9").await;
  let (_, html) = b.get("/").await;
  assert!(html.contains("Candidate not found"));
  assert!(html.contains("<h2>Work Queue</h2>"));
}

#[tokio::test]
async fn decision_for_vanished_candidate_warns() {
  let mut b = Browser::new(make_store().await, ServerConfig::default());
  b.post("/decision", "candidate_id=C404&decision=MATCHED").await;
  let (_, html) = b.get("/").await;
  assert!(html.contains("Candidate not found"));
}

#[tokio::test]
async fn skipping_everything_ends_caught_up() {
  let mut b = Browser::new(make_store().await, ServerConfig::default());
  b.post("/action", "action=navigate&view=review").await;
  let (_, html) = b.get("/").await;
  assert!(html.contains("<strong>C1</strong>"));
  b.post("/action", "action=skip").await;

  let (_, html) = b.get("/").await;
  assert!(html.contains("<strong>C2</strong>"));
  b.post("/action", "action=skip").await;

  let (_, html) = b.get("/").await;
  assert!(html.contains("All caught up!"));
  assert!(html.contains("2 skipped this session."));
}

#[tokio::test]
async fn start_high_priority_without_candidates_informs() {
  let store = make_store().await;
  store
    .record_decision(NewDecision::new("C1", "Mele", Decision::Matched), RedecisionPolicy::Overwrite)
    .await
    .unwrap();
  let mut b = Browser::new(store, ServerConfig::default());
  b.post("/action", "action=start_high_priority").await;
  let (_, html) = b.get("/").await;
  assert!(html.contains("No high priority items pending"));
  assert!(html.contains("<h2>Dashboard</h2>"));
}

#[tokio::test]
async fn overwrite_is_flagged_to_the_agent() {
  let store = make_store().await;
  store
    .record_decision(NewDecision::new("C1", "Mele", Decision::NotMatched), RedecisionPolicy::Overwrite)
    .await
    .unwrap();
  let mut b = Browser::new(Arc::clone(&store), ServerConfig::default());
  b.post("/action", "action=open&candidate_id=C1").await;
  let (_, html) = b.get("/").await;
  assert!(html.contains("Already decided"));

  b.post("/decision", "candidate_id=C1&decision=MATCHED").await;
  let (_, html) = b.get("/").await;
  assert!(html.contains("notice-warning"));
  assert!(html.contains("by Mele"));
  assert_eq!(store.decision_history(10).await.unwrap().len(), 2);
}

#[tokio::test]
async fn reject_policy_keeps_candidate_selected() {
  let store = make_store().await;
  store
    .record_decision(NewDecision::new("C1", "Mele", Decision::Matched), RedecisionPolicy::Overwrite)
    .await
    .unwrap();
  let config = ServerConfig { redecision_policy: RedecisionPolicy::Reject, ..ServerConfig::default() };
  let mut b = Browser::new(Arc::clone(&store), config);
  b.post("/action", "action=open&candidate_id=C1").await;
  b.post("/decision", "candidate_id=C1&decision=NOT_MATCHED").await;

  let (_, html) = b.get("/").await;
  assert!(html.contains("already MATCHED"));
  assert!(html.contains("<strong>C1</strong>"));
  assert_eq!(store.decision_history(10).await.unwrap().len(), 1);
}

// ─── Auth, API, static ───────────────────────────────────────────────────────

fn auth_config() -> ServerConfig {
  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use rand_core::OsRng;
  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::default()
    .hash_password(b"secret", &salt)
    .unwrap()
    .to_string();
  ServerConfig {
    auth_username: Some("mele".into()),
    auth_password_hash: Some(hash),
    ..ServerConfig::default()
  }
}

#[tokio::test]
async fn auth_guards_pages_and_api() {
  let mut b = Browser::new(make_store().await, auth_config());
  assert_eq!(b.get("/").await.0, StatusCode::UNAUTHORIZED);
  assert_eq!(b.get("/api/health").await.0, StatusCode::UNAUTHORIZED);

  let token = base64::engine::general_purpose::STANDARD.encode("mele:wrong");
  b.auth = Some(format!("Basic {token}"));
  assert_eq!(b.get("/").await.0, StatusCode::UNAUTHORIZED);

  let token = base64::engine::general_purpose::STANDARD.encode("mele:secret");
  b.auth = Some(format!("Basic {token}"));
  let (status, html) = b.get("/").await;
  assert_eq!(status, StatusCode::OK);
  assert!(html.contains(r#"name="agent_name" value="mele""#));
}

#[tokio::test]
async fn api_is_nested() {
  let mut b = Browser::new(make_store().await, ServerConfig::default());
  let (status, body) = b.get("/api/health").await;
  assert_eq!(status, StatusCode::OK);
  assert!(body.contains("ok"));

  let (status, body) = b.get("/api/candidates/pending").await;
  assert_eq!(status, StatusCode::OK);
  assert!(body.contains("C1"));
}

#[tokio::test]
async fn stylesheet_is_served_as_css() {
  let app = router(AppState::new(make_store().await, ServerConfig::default()));
  let res = app
    .oneshot(Request::builder().uri("/static/app.css").body(Body::empty()).unwrap())
    .await
    .unwrap();
  assert_eq!(res.status(), StatusCode::OK);
  let ct = res.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap();
  assert!(ct.starts_with("text/css"));
}
