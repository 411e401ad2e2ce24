//! Router tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use chrono::{TimeZone, Utc};
use dedupe_core::{
  candidate::{CandidateStatus, DuplicateCandidate, Priority},
  customer::Customer,
  decision::RedecisionPolicy,
};
use dedupe_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{ApiSettings, api_router};

async fn make_store() -> Arc<SqliteStore> {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let person = |id: &str, first: &str, email: &str| Customer {
    first_name: Some(first.into()),
    last_name: Some("Tui".into()),
    email: Some(email.into()),
    country: Some("Fiji".into()),
    ..Customer::new(id)
  };
  store
    .load_customers(vec![
      person("A1", "Mere", "mere@example.com"),
      person("A2", "Mere", "MERE@example.com"),
      person("B1", "Sione", "sione@example.com"),
    ])
    .await
    .unwrap();
  let candidate = |id: &str, a: &str, b: &str, score: f64, priority| DuplicateCandidate {
    candidate_id: id.into(),
    customer_id_1: a.into(),
    customer_id_2: b.into(),
    match_score: score,
    match_reason: None,
    priority,
    status: CandidateStatus::Pending,
    assigned_to: None,
    created_date: Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
  };
  store
    .load_candidates(vec![
      candidate("C1", "A1", "A2", 92.0, Priority::High),
      candidate("C2", "A1", "B1", 55.0, Priority::Low),
      // Second customer was never loaded.
      candidate("C3", "B1", "Z9", 71.0, Priority::Medium),
    ])
    .await
    .unwrap();
  Arc::new(store)
}

async fn call(
  store: Arc<SqliteStore>,
  settings: ApiSettings,
  method: &str,
  uri: &str,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  let resp = api_router(store, settings)
    .oneshot(builder.body(body).unwrap())
    .await
    .unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
  (status, value)
}

async fn get(store: Arc<SqliteStore>, uri: &str) -> (StatusCode, Value) {
  call(store, ApiSettings::default(), "GET", uri, None).await
}

// ─── Metrics ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn metrics_report_status_counts() {
  let (status, body) = get(make_store().await, "/metrics").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["total"], 3);
  assert_eq!(body["pending"], 3);
  assert_eq!(body["high_priority_pending"], 1);
  assert_eq!(body["completion_pct"], 0.0);
}

#[tokio::test]
async fn countries_fold_onto_regions() {
  let (status, body) = get(make_store().await, "/metrics/countries").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["countries"][0]["country"], "Fiji");
  assert_eq!(body["countries"][0]["count"], 3);
  let fiji = body["regions"]
    .as_array()
    .unwrap()
    .iter()
    .find(|r| r["code"] == "FJ")
    .unwrap();
  assert_eq!(fiji["count"], 3);
}

#[tokio::test]
async fn activity_accepts_a_reference_date() {
  let (status, body) = get(make_store().await, "/metrics/activity?date=2024-05-16").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["periods"]["week_start"], "2024-05-13");
  assert_eq!(body["today"]["completed"], 0);
}

// ─── Candidates ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn pending_filters_by_priority_case_insensitively() {
  let (status, body) = get(make_store().await, "/candidates/pending?priority=high").await;
  assert_eq!(status, StatusCode::OK);
  let rows = body.as_array().unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0]["candidate_id"], "C1");
  assert_eq!(rows[0]["name_1"], "Mere Tui");
}

#[tokio::test]
async fn pending_rejects_unknown_priority_and_sort() {
  let store = make_store().await;
  let (status, _) = get(store.clone(), "/candidates/pending?priority=urgent").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  let (status, _) = get(store, "/candidates/pending?sort=sideways").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_query_values_mean_any() {
  let (status, body) =
    get(make_store().await, "/candidates?priority=&cluster_id=&customer=&sort=").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn compare_returns_field_diff() {
  let (status, body) = get(make_store().await, "/candidates/C1/compare").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["score_tier"], "high");
  assert_eq!(body["compared"], 16);

  let fields = body["fields"].as_array().unwrap();
  let email = fields.iter().find(|f| f["field"] == "EMAIL").unwrap();
  assert_eq!(email["comparison"], "match");
  let id = fields.iter().find(|f| f["field"] == "CUSTOMER_ID").unwrap();
  assert_eq!(id["comparison"], "difference");
}

#[tokio::test]
async fn unknown_candidate_and_missing_customer_are_404() {
  let store = make_store().await;
  let (status, body) = get(store.clone(), "/candidates/nope").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].as_str().unwrap().contains("nope"));

  let (status, body) = get(store.clone(), "/candidates/C3/compare").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].as_str().unwrap().contains("Z9"));

  let (status, _) = get(store, "/customers/Z9").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ─── Decisions ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn decision_is_recorded_and_listed() {
  let store = make_store().await;
  let (status, body) = call(
    store.clone(),
    ApiSettings::default(),
    "POST",
    "/candidates/C1/decision",
    Some(json!({
      "agent_name": "Mele",
      "decision": "MATCHED",
      "decision_reason": "Same person - confirmed match",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["previous_status"], "PENDING");
  assert_eq!(body["decision"]["candidate_id"], "C1");

  let (_, history) = get(store.clone(), "/decisions?limit=5").await;
  assert_eq!(history["summary"]["matched"], 1);
  assert_eq!(history["entries"][0]["agent_name"], "Mele");

  let (_, people) = get(store.clone(), "/consultants").await;
  assert_eq!(people[0]["name"], "Mele");
  assert_eq!(people[0]["decisions"], 1);

  let (_, metrics) = get(store, "/metrics").await;
  assert_eq!(metrics["pending"], 2);
  assert_eq!(metrics["matched"], 1);
}

#[tokio::test]
async fn decision_errors_map_to_status_codes() {
  let store = make_store().await;
  let body = |agent: &str| json!({ "agent_name": agent, "decision": "NOT_MATCHED" });

  let (status, _) = call(
    store.clone(),
    ApiSettings::default(),
    "POST",
    "/candidates/C2/decision",
    Some(body(" ")),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = call(
    store.clone(),
    ApiSettings::default(),
    "POST",
    "/candidates/gone/decision",
    Some(body("Mele")),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let strict = || ApiSettings {
    redecision_policy: RedecisionPolicy::Reject,
    ..ApiSettings::default()
  };
  let (status, _) =
    call(store.clone(), strict(), "POST", "/candidates/C2/decision", Some(body("Mele"))).await;
  assert_eq!(status, StatusCode::CREATED);
  let (status, _) =
    call(store, strict(), "POST", "/candidates/C2/decision", Some(body("Tavita"))).await;
  assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn health_reports_ok() {
  let (status, body) = get(make_store().await, "/health").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "ok");
}
