//! `POST /decision`: the review screen's decision form.

use axum::{
  Form,
  extract::State,
  http::HeaderMap,
  response::Response,
};
use dedupe_core::{
  decision::{Decision, NewDecision},
  store::ReviewStore,
  view::{Action, Notice, NoticeLevel, transition},
};
use serde::Deserialize;

use crate::{
  AppState, Error,
  auth::MaybeUser,
  handlers::{back_to_page, finish, open_session},
};

#[derive(Debug, Deserialize)]
pub struct DecisionForm {
  pub candidate_id:    String,
  pub decision:        String,
  #[serde(default)]
  pub decision_reason: Option<String>,
  /// Free-text reason; replaces the preset one when filled in.
  #[serde(default)]
  pub custom_reason:   Option<String>,
  #[serde(default)]
  pub notes:           Option<String>,
}

impl DecisionForm {
  fn reason(&self) -> Option<String> {
    self
      .custom_reason
      .as_deref()
      .map(str::trim)
      .filter(|r| !r.is_empty())
      .map(str::to_owned)
      .or_else(|| self.decision_reason.clone())
  }
}

pub async fn handler<S>(
  State(state): State<AppState<S>>,
  MaybeUser(user): MaybeUser,
  headers: HeaderMap,
  Form(form): Form<DecisionForm>,
) -> Result<Response, Error>
where
  S: ReviewStore + 'static,
{
  let decision = Decision::parse(&form.decision).map_err(|e| Error::BadRequest(e.to_string()))?;
  let (mut guard, created) = open_session(&state, &headers, user.as_deref()).await;
  let session = (*guard).clone();
  let session_id = session.session_id;

  let input = NewDecision {
    candidate_id:    form.candidate_id.trim().to_owned(),
    agent_name:      session.agent_name.clone(),
    decision,
    decision_reason: form.reason(),
    notes:           form.notes,
    session_id:      Some(session_id),
  };
  let candidate_id = input.candidate_id.clone();

  let session = match state
    .store
    .record_decision(input, state.config.redecision_policy)
    .await
  {
    Ok(receipt) => {
      tracing::info!(
        %candidate_id,
        agent = %receipt.decision.agent_name,
        decision = %decision,
        "decision recorded"
      );
      let mut next = transition(session, Action::Recorded(decision));
      if receipt.overwrote() {
        let by = receipt.previous_agent.as_deref().unwrap_or("another agent");
        next.notice = Some(Notice::new(
          NoticeLevel::Warning,
          format!(
            "Decision recorded: {decision}. This replaced an earlier {} decision by {by}.",
            receipt.previous_status
          ),
        ));
      }
      next
    }
    Err(e) => {
      use dedupe_core::Error as Domain;
      let action = match Domain::find_in(&e) {
        Some(Domain::CandidateNotFound(_)) => Action::SelectionMissing,
        Some(refused)
          if matches!(refused, Domain::AlreadyDecided { .. } | Domain::MissingAgentName) =>
        {
          Action::Refused(refused.to_string())
        }
        _ => {
          tracing::error!(error = %e, %candidate_id, "failed to record decision");
          Action::Failed(format!("Error saving decision: {e}"))
        }
      };
      transition(session, action)
    }
  };

  *guard = session;
  Ok(finish(session_id, created, back_to_page()))
}
