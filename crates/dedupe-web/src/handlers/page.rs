//! `GET /`: render whatever view the session is on.
//!
//! Dashboard dates and the greeting both follow UTC, the clock decision
//! timestamps are stored in.

use axum::{
  extract::{Query, State},
  http::HeaderMap,
  response::{Html, Response},
};
use chrono::{DateTime, Timelike as _, Utc};
use dedupe_core::{
  candidate::{CandidateFilter, PendingSort, Priority},
  customer::Customer,
  diff::diff_customers,
  metrics::{ReportingPeriods, greeting, region_board},
  store::ReviewStore,
  view::{Action, SessionState, View, transition},
};
use serde::Deserialize;

use crate::{
  AppState,
  auth::MaybeUser,
  handlers::{finish, open_session},
  pages::{self, Chrome},
};

/// List filters carried in the query string. Blank or unparseable values
/// mean "any".
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
  pub priority:   Option<String>,
  pub cluster_id: Option<String>,
  pub customer:   Option<String>,
  pub country:    Option<String>,
  pub consultant: Option<String>,
  pub sort:       Option<String>,
  /// Admin name search.
  pub q:          Option<String>,
}

impl PageParams {
  fn priority(&self) -> Option<Priority> {
    self.priority.as_deref().and_then(|p| Priority::parse(p).ok())
  }

  fn sort(&self) -> PendingSort {
    self
      .sort
      .as_deref()
      .and_then(|s| s.trim().parse().ok())
      .unwrap_or_default()
  }

  fn filter(&self) -> CandidateFilter {
    CandidateFilter {
      priority:   None,
      cluster_id: self.cluster_id.clone(),
      customer:   self.customer.clone(),
      country:    self.country.clone(),
      consultant: self.consultant.clone(),
    }
    .normalized()
  }
}

pub async fn handler<S>(
  State(state): State<AppState<S>>,
  MaybeUser(user): MaybeUser,
  headers: HeaderMap,
  Query(params): Query<PageParams>,
) -> Response
where
  S: ReviewStore + 'static,
{
  let (mut guard, created) = open_session(&state, &headers, user.as_deref()).await;
  let mut session = (*guard).clone();

  let mut review = None;
  if session.view == View::Review {
    let (next, body) = review_body(&state, session).await;
    session = next;
    review = body;
  }

  let body = match (session.view, review) {
    (View::Review, Some(body)) => body,
    (view, _) => list_body(&state, view, &params, &session).await,
  };

  let notice = session.take_notice();
  let html = pages::layout(
    &Chrome {
      agent_name: &session.agent_name,
      view:       session.view,
      notice:     notice.as_ref(),
    },
    &body,
  );
  let session_id = session.session_id;
  *guard = session;
  finish(session_id, created, Html(html))
}

// ─── Review ──────────────────────────────────────────────────────────────────

/// Resolve the review screen. Returns `None` for the body when the session
/// fell back to a list view.
async fn review_body<S>(state: &AppState<S>, mut session: SessionState) -> (SessionState, Option<String>)
where
  S: ReviewStore,
{
  let pending = match state
    .store
    .pending_candidates(&CandidateFilter::default(), PendingSort::MatchScore)
    .await
  {
    Ok(rows) => rows,
    Err(e) => {
      tracing::error!(error = %e, "failed to load pending candidates");
      let message = format!("Error loading candidates: {e}");
      return (transition(session, Action::Failed(message)), None);
    }
  };

  if session.selected_candidate.is_none() {
    let next = pending
      .iter()
      .find(|c| !session.skipped.contains(&c.candidate_id))
      .map(|c| c.candidate_id.clone());
    match next {
      Some(id) => session = transition(session, Action::Open(id)),
      None => {
        let body = pages::review::caught_up(session.skipped.len());
        return (session, Some(body));
      }
    }
  }
  let Some(id) = session.selected_candidate.clone() else {
    return (session, None);
  };

  let remaining = pending
    .iter()
    .filter(|c| c.candidate_id != id && !session.skipped.contains(&c.candidate_id))
    .count();

  let candidate = match state.store.get_candidate(&id).await {
    Ok(Some(c)) => c,
    Ok(None) => {
      tracing::warn!(candidate_id = %id, "selected candidate not found");
      return (transition(session, Action::SelectionMissing), None);
    }
    Err(e) => {
      tracing::error!(error = %e, candidate_id = %id, "failed to load candidate");
      let message = format!("Error loading candidate: {e}");
      return (transition(session, Action::Failed(message)), None);
    }
  };

  let left = match load_customer(state, &candidate.customer_id_1).await {
    Ok(c) => c,
    Err(action) => return (transition(session, action), None),
  };
  let right = match load_customer(state, &candidate.customer_id_2).await {
    Ok(c) => c,
    Err(action) => return (transition(session, action), None),
  };

  let diffs = diff_customers(&left, &right);
  let body = pages::review::render(&pages::review::Review {
    candidate: &candidate,
    left:      &left,
    right:     &right,
    diffs:     &diffs,
    remaining,
  });
  (session, Some(body))
}

/// A customer of the selected candidate, or the fallback action when it
/// cannot be shown.
async fn load_customer<S>(state: &AppState<S>, customer_id: &str) -> Result<Customer, Action>
where
  S: ReviewStore,
{
  match state.store.get_customer(customer_id).await {
    Ok(Some(c)) => Ok(c),
    Ok(None) => {
      tracing::warn!(%customer_id, "customer record not found");
      Err(Action::SelectionMissing)
    }
    Err(e) => {
      tracing::error!(error = %e, %customer_id, "failed to load customer");
      Err(Action::Failed(format!("Error loading customer: {e}")))
    }
  }
}

// ─── Lists ───────────────────────────────────────────────────────────────────

async fn list_body<S>(
  state: &AppState<S>,
  view: View,
  params: &PageParams,
  session: &SessionState,
) -> String
where
  S: ReviewStore,
{
  let result = match view {
    View::Dashboard => dashboard(state, &session.agent_name).await,
    View::WorkQueue => {
      let filter = CandidateFilter { priority: params.priority(), ..Default::default() };
      let sort = params.sort();
      state
        .store
        .pending_candidates(&filter, sort)
        .await
        .map(|rows| pages::queue::work_queue(&rows, filter.priority, sort))
    }
    View::ReviewMatches => {
      let filter = params.filter();
      let sort = params.sort();
      state
        .store
        .pending_candidates(&filter, sort)
        .await
        .map(|rows| pages::queue::review_matches(&rows, &filter, sort))
    }
    View::ReviewClusters => {
      let filter = params.filter();
      state
        .store
        .all_candidates(&filter)
        .await
        .map(|rows| pages::clusters::render(&rows, &filter))
    }
    View::History => state
      .store
      .decision_history(state.config.history_limit)
      .await
      .map(|entries| pages::history::render(&entries)),
    View::Admin => state
      .store
      .consultants()
      .await
      .map(|people| pages::admin::render(&people, params.q.as_deref())),
    // Only reached when the review screen could not resolve.
    View::Review => Ok(String::new()),
  };

  result.unwrap_or_else(|e| {
    tracing::error!(error = %e, view = %view, "failed to render view");
    pages::error_banner(&format!("Error loading data: {e}"))
  })
}

async fn dashboard<S>(state: &AppState<S>, agent_name: &str) -> Result<String, S::Error>
where
  S: ReviewStore,
{
  let metrics = state.store.dashboard_metrics().await?;
  let (greeting, periods) = dashboard_clock(Utc::now());
  let activity = state.store.activity_metrics(periods).await?;
  let countries = state.store.country_breakdown().await?;
  let recent = state
    .store
    .decision_history(state.config.recent_activity_limit)
    .await?;
  let board = region_board(&state.config.regions, &countries);

  Ok(pages::dashboard::render(&pages::dashboard::Dashboard {
    greeting,
    agent_name,
    metrics: &metrics,
    activity: &activity,
    board: &board,
    recent: &recent,
  }))
}

/// Greeting and reporting periods for one instant, both read in UTC.
fn dashboard_clock(now: DateTime<Utc>) -> (&'static str, ReportingPeriods) {
  (greeting(now.hour()), ReportingPeriods::for_date(now.date_naive()))
}
