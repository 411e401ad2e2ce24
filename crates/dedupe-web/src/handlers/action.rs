//! `POST /action`: navigation buttons.

use axum::{
  Form,
  extract::State,
  http::HeaderMap,
  response::Response,
};
use dedupe_core::{
  candidate::{CandidateFilter, PendingSort, Priority},
  store::ReviewStore,
  view::{Action, SessionState, View, transition},
};
use serde::Deserialize;

use crate::{
  AppState, Error,
  auth::MaybeUser,
  handlers::{back_to_page, finish, open_session},
};

#[derive(Debug, Deserialize)]
pub struct ActionForm {
  pub action:       String,
  pub view:         Option<String>,
  pub candidate_id: Option<String>,
  pub agent_name:   Option<String>,
}

pub async fn handler<S>(
  State(state): State<AppState<S>>,
  MaybeUser(user): MaybeUser,
  headers: HeaderMap,
  Form(form): Form<ActionForm>,
) -> Result<Response, Error>
where
  S: ReviewStore + 'static,
{
  let (mut guard, created) = open_session(&state, &headers, user.as_deref()).await;
  let action = resolve(&state, &guard, form).await?;
  let session_id = guard.session_id;
  tracing::debug!(%session_id, ?action, "session action");
  *guard = transition((*guard).clone(), action);
  Ok(finish(session_id, created, back_to_page()))
}

/// Turn the submitted form into a session action.
async fn resolve<S>(state: &AppState<S>, session: &SessionState, form: ActionForm) -> Result<Action, Error>
where
  S: ReviewStore,
{
  let action = match form.action.as_str() {
    "navigate" => {
      let name = form.view.unwrap_or_default();
      let view = name
        .parse::<View>()
        .map_err(|_| Error::BadRequest(format!("unknown view: {name}")))?;
      Action::Navigate(view)
    }
    "open" => {
      let id = form
        .candidate_id
        .map(|id| id.trim().to_owned())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::BadRequest("candidate_id is required".to_owned()))?;
      Action::Open(id)
    }
    "start_high_priority" => {
      let filter = CandidateFilter::with_priority(Priority::High);
      match state.store.pending_candidates(&filter, PendingSort::MatchScore).await {
        Ok(rows) => Action::StartHighPriority(
          rows
            .into_iter()
            .map(|c| c.candidate_id)
            .find(|id| !session.skipped.contains(id)),
        ),
        Err(e) => {
          tracing::error!(error = %e, "failed to load high priority candidates");
          Action::Failed(format!("Error loading candidates: {e}"))
        }
      }
    }
    "skip" => Action::Skip,
    "back" => Action::Back,
    "set_agent" => Action::SetAgentName(form.agent_name.unwrap_or_default()),
    other => return Err(Error::BadRequest(format!("unknown action: {other}"))),
  };
  Ok(action)
}
