//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use dedupe_core::{
  candidate::{
    CandidateFilter, CandidateStatus, DuplicateCandidate, PendingSort, Priority,
  },
  customer::Customer,
  decision::{Decision, NewDecision, RedecisionPolicy},
  metrics::ReportingPeriods,
  store::ReviewStore,
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn customer(id: &str, first: &str, last: &str, country: Option<&str>) -> Customer {
  Customer {
    first_name: Some(first.into()),
    last_name: Some(last.into()),
    country: country.map(Into::into),
    ..Customer::new(id)
  }
}

fn candidate(id: &str, a: &str, b: &str, score: f64, priority: Priority) -> DuplicateCandidate {
  DuplicateCandidate {
    candidate_id:  id.into(),
    customer_id_1: a.into(),
    customer_id_2: b.into(),
    match_score:   score,
    match_reason:  Some("Name + DOB".into()),
    priority,
    status:        CandidateStatus::Pending,
    assigned_to:   None,
    created_date:  Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
  }
}

/// Three candidates over five customers in two countries.
async fn seeded() -> SqliteStore {
  let s = store().await;
  s.load_customers(vec![
    Customer {
      email: Some("mere@example.com".into()),
      date_of_birth: NaiveDate::from_ymd_opt(1990, 3, 4),
      account_balance: Some(12.5),
      ..customer("A1", "Mere", "Tui", Some("Fiji"))
    },
    Customer {
      email: Some(" MERE@example.com ".into()),
      date_of_birth: NaiveDate::from_ymd_opt(1990, 3, 4),
      ..customer("A2", "Mere", "Tui", Some("Fiji"))
    },
    customer("B1", "Sione", "Vea", Some("Tonga")),
    customer("B2", "Sione", "Vea", Some("Tonga")),
    customer("D1", "Ana", "Lee", None),
  ])
  .await
  .unwrap();

  let mut c3 = candidate("C3", "D1", "A2", 60.0, Priority::Low);
  c3.created_date = Utc.with_ymd_and_hms(2024, 5, 3, 8, 0, 0).unwrap();
  s.load_candidates(vec![
    candidate("C1", "A1", "A2", 92.0, Priority::High),
    candidate("C2", "B1", "B2", 75.0, Priority::Medium),
    c3,
  ])
  .await
  .unwrap();
  s
}

// ─── Customers & candidates ──────────────────────────────────────────────────

#[tokio::test]
async fn get_customer_round_trips_all_columns() {
  let s = seeded().await;
  let c = s.get_customer("A1").await.unwrap().unwrap();
  assert_eq!(c.first_name.as_deref(), Some("Mere"));
  assert_eq!(c.date_of_birth, NaiveDate::from_ymd_opt(1990, 3, 4));
  assert_eq!(c.account_balance, Some(12.5));
  assert_eq!(c.phone, None);
}

#[tokio::test]
async fn get_missing_rows_returns_none() {
  let s = seeded().await;
  assert!(s.get_customer("nope").await.unwrap().is_none());
  assert!(s.get_candidate("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn get_candidate_decodes_enums() {
  let s = seeded().await;
  let c = s.get_candidate("C2").await.unwrap().unwrap();
  assert_eq!(c.priority, Priority::Medium);
  assert_eq!(c.status, CandidateStatus::Pending);
  assert_eq!(c.match_score, 75.0);
}

#[tokio::test]
async fn pending_sorted_by_score_then_filtered() {
  let s = seeded().await;
  let all = s
    .pending_candidates(&CandidateFilter::default(), PendingSort::MatchScore)
    .await
    .unwrap();
  let ids: Vec<_> = all.iter().map(|c| c.candidate_id.as_str()).collect();
  assert_eq!(ids, ["C1", "C2", "C3"]);
  assert_eq!(all[0].name_1, "Mere Tui");
  assert_eq!(all[0].country, "Fiji");
  assert_eq!(all[2].country, "Unknown");

  let newest = s
    .pending_candidates(&CandidateFilter::default(), PendingSort::CreatedDate)
    .await
    .unwrap();
  assert_eq!(newest[0].candidate_id, "C3");

  let high = s
    .pending_candidates(&CandidateFilter::with_priority(Priority::High), PendingSort::MatchScore)
    .await
    .unwrap();
  assert_eq!(high.len(), 1);
  assert_eq!(high[0].candidate_id, "C1");
}

#[tokio::test]
async fn text_filters_match_substrings_and_country() {
  let s = seeded().await;

  let by_customer = CandidateFilter { customer: Some("A2".into()), ..Default::default() };
  let rows = s.all_candidates(&by_customer).await.unwrap();
  assert_eq!(rows.len(), 2);

  let by_country = CandidateFilter { country: Some("tonga".into()), ..Default::default() };
  let rows = s.all_candidates(&by_country).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].candidate_id, "C2");

  // Blank text is "any".
  let blank = CandidateFilter { cluster_id: Some("  ".into()), ..Default::default() };
  assert_eq!(s.all_candidates(&blank).await.unwrap().len(), 3);

  // Bound, not interpolated.
  let hostile = CandidateFilter { cluster_id: Some("' OR 1=1 --".into()), ..Default::default() };
  assert!(s.all_candidates(&hostile).await.unwrap().is_empty());
}

// ─── Decisions ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn recording_a_match_updates_status_and_metrics() {
  let s = seeded().await;
  let before = s.dashboard_metrics().await.unwrap();
  assert_eq!(before.pending, 3);
  assert_eq!(before.high_priority_pending, 1);

  let mut input = NewDecision::new("C1", "Mele", Decision::Matched);
  input.decision_reason = Some("Same person - confirmed match".into());
  let receipt = s
    .record_decision(input, RedecisionPolicy::Overwrite)
    .await
    .unwrap();
  assert_eq!(receipt.previous_status, CandidateStatus::Pending);
  assert!(!receipt.overwrote());

  let c = s.get_candidate("C1").await.unwrap().unwrap();
  assert_eq!(c.status, CandidateStatus::Matched);
  assert_eq!(c.assigned_to.as_deref(), Some("Mele"));

  let history = s.decision_history(10).await.unwrap();
  assert_eq!(history.len(), 1);
  assert_eq!(history[0].candidate_id, "C1");
  assert_eq!(history[0].decision, Decision::Matched);
  assert_eq!(history[0].decision_id, receipt.decision.decision_id);
  assert_eq!(
    history[0].decision_reason.as_deref(),
    Some("Same person - confirmed match")
  );

  let after = s.dashboard_metrics().await.unwrap();
  assert_eq!(after.pending, before.pending - 1);
  assert_eq!(after.matched, before.matched + 1);
  assert_eq!(after.high_priority_pending, 0);
  assert_eq!(after.total, 3);
}

#[tokio::test]
async fn free_text_with_quotes_is_stored_verbatim() {
  let s = seeded().await;
  let mut input = NewDecision::new("C2", "O'Brien", Decision::NotMatched);
  input.notes = Some("it's a \"different\" person; DROP TABLE x".into());
  s.record_decision(input, RedecisionPolicy::Overwrite).await.unwrap();

  let h = s.decision_history(1).await.unwrap();
  assert_eq!(h[0].agent_name, "O'Brien");
  assert_eq!(h[0].notes.as_deref(), Some("it's a \"different\" person; DROP TABLE x"));
}

#[tokio::test]
async fn deciding_missing_candidate_writes_nothing() {
  let s = seeded().await;
  let err = s
    .record_decision(NewDecision::new("gone", "Mele", Decision::Matched), RedecisionPolicy::Overwrite)
    .await
    .unwrap_err();
  assert!(matches!(
    err.as_core(),
    Some(dedupe_core::Error::CandidateNotFound(id)) if id == "gone"
  ));
  assert!(s.decision_history(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn blank_agent_name_is_rejected() {
  let s = seeded().await;
  let err = s
    .record_decision(NewDecision::new("C1", "   ", Decision::Matched), RedecisionPolicy::Overwrite)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(dedupe_core::Error::MissingAgentName)));
  assert_eq!(s.dashboard_metrics().await.unwrap().pending, 3);
}

#[tokio::test]
async fn overwrite_policy_audits_both_decisions() {
  let s = seeded().await;
  s.record_decision(NewDecision::new("C1", "Mele", Decision::Matched), RedecisionPolicy::Overwrite)
    .await
    .unwrap();
  let second = s
    .record_decision(NewDecision::new("C1", "Tavita", Decision::NotMatched), RedecisionPolicy::Overwrite)
    .await
    .unwrap();
  assert!(second.overwrote());
  assert_eq!(second.previous_status, CandidateStatus::Matched);
  assert_eq!(second.previous_agent.as_deref(), Some("Mele"));

  let c = s.get_candidate("C1").await.unwrap().unwrap();
  assert_eq!(c.status, CandidateStatus::NotMatched);
  assert_eq!(c.assigned_to.as_deref(), Some("Tavita"));

  let history = s.decision_history(10).await.unwrap();
  assert_eq!(history.len(), 2);
  assert_eq!(history[0].agent_name, "Tavita");
}

#[tokio::test]
async fn reject_policy_refuses_second_decision() {
  let s = seeded().await;
  s.record_decision(NewDecision::new("C1", "Mele", Decision::Matched), RedecisionPolicy::Reject)
    .await
    .unwrap();
  let err = s
    .record_decision(NewDecision::new("C1", "Tavita", Decision::NotMatched), RedecisionPolicy::Reject)
    .await
    .unwrap_err();
  assert!(matches!(
    err.as_core(),
    Some(dedupe_core::Error::AlreadyDecided { status: CandidateStatus::Matched, .. })
  ));

  let c = s.get_candidate("C1").await.unwrap().unwrap();
  assert_eq!(c.assigned_to.as_deref(), Some("Mele"));
  assert_eq!(s.decision_history(10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn history_respects_limit_newest_first() {
  let s = seeded().await;
  for id in ["C1", "C2", "C3"] {
    s.record_decision(NewDecision::new(id, "Mele", Decision::NotMatched), RedecisionPolicy::Overwrite)
      .await
      .unwrap();
  }
  let h = s.decision_history(2).await.unwrap();
  let ids: Vec<_> = h.iter().map(|e| e.candidate_id.as_str()).collect();
  assert_eq!(ids, ["C3", "C2"]);
}

// ─── Aggregates ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_store_has_no_average() {
  let s = store().await;
  let m = s.dashboard_metrics().await.unwrap();
  assert_eq!(m.total, 0);
  assert_eq!(m.avg_match_score, None);
  s.ping().await.unwrap();
}

#[tokio::test]
async fn average_score_over_all_candidates() {
  let s = seeded().await;
  let m = s.dashboard_metrics().await.unwrap();
  let avg = m.avg_match_score.unwrap();
  assert!((avg - (92.0 + 75.0 + 60.0) / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn activity_buckets_by_day_week_and_month() {
  let s = seeded().await;
  s.record_decision(NewDecision::new("C1", "Mele", Decision::Matched), RedecisionPolicy::Overwrite)
    .await
    .unwrap();
  s.record_decision(NewDecision::new("C2", "Mele", Decision::NotMatched), RedecisionPolicy::Overwrite)
    .await
    .unwrap();

  let today = Utc::now().date_naive();
  let m = s.activity_metrics(ReportingPeriods::for_date(today)).await.unwrap();
  assert_eq!(m.today.completed, 2);
  assert_eq!(m.today.matched, 1);
  assert_eq!(m.today.not_matched, 1);
  assert_eq!(m.week_to_date.completed, 2);
  assert_eq!(m.month_to_date.completed, 2);

  // A reference date in the past sees today's work in every period start
  // but not in its own "today".
  let earlier = ReportingPeriods::for_date(today - Duration::days(40));
  let m = s.activity_metrics(earlier).await.unwrap();
  assert_eq!(m.today.completed, 0);
  assert_eq!(m.month_to_date.completed, 2);
}

#[tokio::test]
async fn country_breakdown_counts_pending_only() {
  let s = seeded().await;
  let counts = s.country_breakdown().await.unwrap();
  assert_eq!(counts.len(), 3);
  assert!(counts.iter().all(|c| c.count == 1));

  s.record_decision(NewDecision::new("C2", "Mele", Decision::Matched), RedecisionPolicy::Overwrite)
    .await
    .unwrap();
  let counts = s.country_breakdown().await.unwrap();
  let names: Vec<_> = counts.iter().map(|c| c.country.as_str()).collect();
  assert_eq!(names, ["Fiji", "Unknown"]);
}

#[tokio::test]
async fn consultants_ordered_by_last_activity() {
  let s = seeded().await;
  assert!(s.consultants().await.unwrap().is_empty());

  s.record_decision(NewDecision::new("C1", "Mele", Decision::Matched), RedecisionPolicy::Overwrite)
    .await
    .unwrap();
  s.record_decision(NewDecision::new("C2", "Mele", Decision::Matched), RedecisionPolicy::Overwrite)
    .await
    .unwrap();
  s.record_decision(NewDecision::new("C3", "Tavita", Decision::NotMatched), RedecisionPolicy::Overwrite)
    .await
    .unwrap();

  let people = s.consultants().await.unwrap();
  assert_eq!(people.len(), 2);
  assert_eq!(people[0].name, "Tavita");
  assert_eq!(people[0].decisions, 1);
  assert_eq!(people[1].name, "Mele");
  assert_eq!(people[1].decisions, 2);
}
