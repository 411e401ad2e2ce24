//! Agent decisions: the append-only audit trail.
//!
//! A decision row is never updated or deleted. Recording one also moves the
//! referenced candidate out of `PENDING`; both writes form one unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{
  Error, Result,
  candidate::{CandidateStatus, Priority},
};

// ─── Verdict ─────────────────────────────────────────────────────────────────

/// An agent's verdict on a candidate.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display,
  EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Decision {
  Matched,
  NotMatched,
}

impl Decision {
  /// The candidate status this decision moves to.
  pub fn status(self) -> CandidateStatus {
    match self {
      Self::Matched => CandidateStatus::Matched,
      Self::NotMatched => CandidateStatus::NotMatched,
    }
  }

  /// Parse the value stored in the `DECISION` column.
  pub fn parse(s: &str) -> Result<Self> {
    s.trim().parse().map_err(|_| Error::unknown("decision", s))
  }
}

/// Preset reasons offered on the decision form. Free text is also accepted.
pub const DECISION_REASONS: &[&str] = &[
  "Same person - confirmed match",
  "Different people - name coincidence",
  "Different people - family members",
  "Insufficient information to decide",
  "Data quality issue - needs investigation",
  "Other (specify in notes)",
];

// ─── Policy ──────────────────────────────────────────────────────────────────

/// What to do when a decision arrives for a candidate that is no longer
/// pending (two agents reviewing the same pair).
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
  EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RedecisionPolicy {
  /// Record the decision and overwrite the status; last write wins.
  #[default]
  Overwrite,
  /// Refuse the decision and write nothing.
  Reject,
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// One row of `AGENT_DECISIONS`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDecision {
  pub decision_id:        Uuid,
  pub candidate_id:       String,
  pub agent_name:         String,
  pub decision:           Decision,
  pub decision_reason:    Option<String>,
  pub notes:              Option<String>,
  pub session_id:         Option<Uuid>,
  /// Store-assigned; never changes after creation.
  pub decision_timestamp: DateTime<Utc>,
}

/// Input to [`crate::store::ReviewStore::record_decision`].
/// The identifier and timestamp are always assigned by the store.
#[derive(Debug, Clone)]
pub struct NewDecision {
  pub candidate_id:    String,
  pub agent_name:      String,
  pub decision:        Decision,
  pub decision_reason: Option<String>,
  pub notes:           Option<String>,
  pub session_id:      Option<Uuid>,
}

impl NewDecision {
  /// Convenience constructor with all optional fields unset.
  pub fn new(
    candidate_id: impl Into<String>,
    agent_name: impl Into<String>,
    decision: Decision,
  ) -> Self {
    Self {
      candidate_id: candidate_id.into(),
      agent_name: agent_name.into(),
      decision,
      decision_reason: None,
      notes: None,
      session_id: None,
    }
  }

  /// Presence check: the agent name is required, blank reason and notes are
  /// stored as null. Text is otherwise kept as entered.
  pub fn validated(self) -> Result<Self> {
    let agent_name = self.agent_name.trim().to_owned();
    if agent_name.is_empty() {
      return Err(Error::MissingAgentName);
    }
    let blank_to_none = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    Ok(Self {
      agent_name,
      decision_reason: blank_to_none(self.decision_reason),
      notes: blank_to_none(self.notes),
      ..self
    })
  }
}

/// What the store reports back after recording a decision.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionReceipt {
  pub decision:        AgentDecision,
  /// The candidate's status just before this decision was applied.
  pub previous_status: CandidateStatus,
  /// The agent previously assigned, if the candidate was already decided.
  pub previous_agent:  Option<String>,
}

impl DecisionReceipt {
  /// True when this decision replaced an earlier one.
  pub fn overwrote(&self) -> bool { !self.previous_status.is_pending() }
}

/// A decision joined with the candidate it refers to, for the history view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
  pub decision_id:        Uuid,
  pub decision_timestamp: DateTime<Utc>,
  pub agent_name:         String,
  pub decision:           Decision,
  pub decision_reason:    Option<String>,
  pub notes:              Option<String>,
  pub candidate_id:       String,
  pub customer_id_1:      String,
  pub customer_id_2:      String,
  pub match_score:        f64,
  pub priority:           Priority,
}

/// Outcome counts over a list of history entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HistorySummary {
  pub matched:     u64,
  pub not_matched: u64,
  pub total:       u64,
}

impl HistorySummary {
  pub fn of(entries: &[HistoryEntry]) -> Self {
    entries.iter().fold(Self::default(), |mut acc, e| {
      match e.decision {
        Decision::Matched => acc.matched += 1,
        Decision::NotMatched => acc.not_matched += 1,
      }
      acc.total += 1;
      acc
    })
  }
}
