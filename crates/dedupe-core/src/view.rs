//! Per-session view routing.
//!
//! Each browser session owns one [`SessionState`]. Agent actions are applied
//! with [`transition`], a pure function; nothing here touches the store.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::decision::Decision;

// ─── View ────────────────────────────────────────────────────────────────────

/// The screen a session is looking at.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
  Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum View {
  #[default]
  Dashboard,
  /// Pending candidates with a priority filter.
  WorkQueue,
  /// Side-by-side comparison of the selected candidate.
  #[strum(to_string = "review", serialize = "compare")]
  Review,
  History,
  /// Every candidate, decided or not, with text filters.
  ReviewClusters,
  /// Pending candidates with text filters.
  ReviewMatches,
  Admin,
}

impl View {
  pub fn title(self) -> &'static str {
    match self {
      Self::Dashboard => "Dashboard",
      Self::WorkQueue => "Work Queue",
      Self::Review => "Review Records",
      Self::History => "Decision History",
      Self::ReviewClusters => "Review Clusters",
      Self::ReviewMatches => "Review Matches",
      Self::Admin => "User Admin",
    }
  }

  /// Views a candidate can be opened from.
  pub fn is_list(self) -> bool {
    matches!(self, Self::WorkQueue | Self::ReviewClusters | Self::ReviewMatches)
  }
}

// ─── Notices ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NoticeLevel {
  Info,
  Success,
  Warning,
  Error,
}

/// A one-shot banner shown on the next render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
  pub level:   NoticeLevel,
  pub message: String,
}

impl Notice {
  pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
    Self { level, message: message.into() }
  }
}

// ─── Session state ───────────────────────────────────────────────────────────

/// Everything one browser session remembers between requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
  pub session_id:         Uuid,
  pub agent_name:         String,
  pub view:               View,
  /// The candidate under review, if any.
  pub selected_candidate: Option<String>,
  /// Where `Back` and not-found fallbacks go from the review screen.
  pub return_to:          View,
  /// Candidates skipped this session; auto-pick passes over them.
  pub skipped:            Vec<String>,
  pub notice:             Option<Notice>,
}

impl SessionState {
  pub fn new(agent_name: impl Into<String>) -> Self {
    Self {
      session_id:         Uuid::new_v4(),
      agent_name:         agent_name.into(),
      view:               View::Dashboard,
      selected_candidate: None,
      return_to:          View::WorkQueue,
      skipped:            Vec::new(),
      notice:             None,
    }
  }

  /// Remove and return the pending notice.
  pub fn take_notice(&mut self) -> Option<Notice> { self.notice.take() }
}

// ─── Actions ─────────────────────────────────────────────────────────────────

/// An explicit agent action. There are no timed or automatic transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
  Navigate(View),
  /// Open a candidate for review from the current view.
  Open(String),
  /// Open the first high-priority pending candidate, if there is one.
  StartHighPriority(Option<String>),
  /// A decision was stored for the selected candidate.
  Recorded(Decision),
  /// Put the selected candidate aside for this session.
  Skip,
  Back,
  /// The selected candidate no longer exists.
  SelectionMissing,
  /// A query failed while rendering the review screen.
  Failed(String),
  /// The store refused the decision; the selection stays for another try.
  Refused(String),
  SetAgentName(String),
}

/// Apply `action` to `state` and return the next state.
pub fn transition(mut state: SessionState, action: Action) -> SessionState {
  match action {
    Action::Navigate(view) => {
      if view != View::Review {
        state.selected_candidate = None;
      }
      if view.is_list() {
        state.return_to = view;
      }
      state.view = view;
    }
    Action::Open(candidate_id) => {
      if state.view.is_list() {
        state.return_to = state.view;
      }
      state.skipped.retain(|id| *id != candidate_id);
      state.selected_candidate = Some(candidate_id);
      state.view = View::Review;
    }
    Action::StartHighPriority(Some(candidate_id)) => {
      state.selected_candidate = Some(candidate_id);
      state.view = View::Review;
    }
    Action::StartHighPriority(None) => {
      state.notice = Some(Notice::new(
        NoticeLevel::Info,
        "No high priority items pending",
      ));
    }
    Action::Recorded(decision) => {
      let message = match decision {
        Decision::Matched => "Decision recorded: MATCHED",
        Decision::NotMatched => "Decision recorded: NOT MATCHED",
      };
      state.selected_candidate = None;
      state.notice = Some(Notice::new(NoticeLevel::Success, message));
    }
    Action::Skip => {
      if let Some(id) = state.selected_candidate.take()
        && !state.skipped.contains(&id)
      {
        state.skipped.push(id);
      }
    }
    Action::Back => {
      state.selected_candidate = None;
      state.view = state.return_to;
    }
    Action::SelectionMissing => {
      state.selected_candidate = None;
      state.view = state.return_to;
      state.notice = Some(Notice::new(
        NoticeLevel::Warning,
        "Candidate not found. Please select from the work queue.",
      ));
    }
    Action::Failed(message) => {
      state.selected_candidate = None;
      state.view = state.return_to;
      state.notice = Some(Notice::new(NoticeLevel::Error, message));
    }
    Action::Refused(message) => {
      state.notice = Some(Notice::new(NoticeLevel::Warning, message));
    }
    Action::SetAgentName(name) => {
      let name = name.trim();
      if !name.is_empty() {
        state.agent_name = name.to_owned();
      }
    }
  }
  state
}
