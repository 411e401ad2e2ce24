//! Duplicate candidates: proposed pairs of customer records.
//!
//! Candidates are produced by an upstream matching process. This application
//! only reads them and, once per decision, moves their status away from
//! `PENDING`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{Error, Result};

// ─── Status ──────────────────────────────────────────────────────────────────

/// Review status of a candidate. `PENDING` is the only non-terminal state.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
  Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum CandidateStatus {
  #[default]
  Pending,
  Matched,
  NotMatched,
}

impl CandidateStatus {
  pub fn is_pending(self) -> bool { matches!(self, Self::Pending) }

  /// Parse the value stored in the `STATUS` column.
  pub fn parse(s: &str) -> Result<Self> {
    s.trim().parse().map_err(|_| Error::unknown("status", s))
  }
}

// ─── Priority ────────────────────────────────────────────────────────────────

/// Upstream-assigned triage bucket.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
  EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Priority {
  High,
  Medium,
  Low,
}

impl Priority {
  pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

  /// Parse the value stored in the `PRIORITY` column.
  pub fn parse(s: &str) -> Result<Self> {
    s.trim().parse().map_err(|_| Error::unknown("priority", s))
  }
}

// ─── Score tier ──────────────────────────────────────────────────────────────

/// Display banding of `MATCH_SCORE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScoreTier {
  /// 85 and above.
  High,
  /// 70 up to (but excluding) 85.
  Medium,
  /// Below 70.
  Low,
}

impl ScoreTier {
  pub const HIGH_THRESHOLD: f64 = 85.0;
  pub const MEDIUM_THRESHOLD: f64 = 70.0;

  pub fn from_score(score: f64) -> Self {
    if score >= Self::HIGH_THRESHOLD {
      Self::High
    } else if score >= Self::MEDIUM_THRESHOLD {
      Self::Medium
    } else {
      Self::Low
    }
  }
}

// ─── Candidate ───────────────────────────────────────────────────────────────

/// One row of `DUPLICATE_CANDIDATES`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateCandidate {
  pub candidate_id:  String,
  pub customer_id_1: String,
  pub customer_id_2: String,
  /// Similarity percentage in `0..=100`, computed upstream.
  pub match_score:   f64,
  pub match_reason:  Option<String>,
  pub priority:      Priority,
  #[serde(default)]
  pub status:        CandidateStatus,
  /// The agent who decided this candidate; `None` while pending.
  #[serde(default)]
  pub assigned_to:   Option<String>,
  pub created_date:  DateTime<Utc>,
}

impl DuplicateCandidate {
  pub fn score_tier(&self) -> ScoreTier { ScoreTier::from_score(self.match_score) }
}

/// A candidate joined with the names and country of its two customers, as
/// shown in the work queue and cluster lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSummary {
  pub candidate_id:  String,
  pub customer_id_1: String,
  pub customer_id_2: String,
  pub name_1:        String,
  pub name_2:        String,
  /// Country of the first customer, `"Unknown"` when absent.
  pub country:       String,
  pub match_score:   f64,
  pub match_reason:  Option<String>,
  pub priority:      Priority,
  pub status:        CandidateStatus,
  pub assigned_to:   Option<String>,
  pub created_date:  DateTime<Utc>,
}

impl CandidateSummary {
  pub fn score_tier(&self) -> ScoreTier { ScoreTier::from_score(self.match_score) }

  /// Decided as the same person.
  pub fn is_confirmed(&self) -> bool { self.status == CandidateStatus::Matched }

  /// Any decision has been recorded.
  pub fn is_reviewed(&self) -> bool { !self.status.is_pending() }
}

// ─── Queries ─────────────────────────────────────────────────────────────────

/// Ordering applied to the pending queue.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
  EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PendingSort {
  /// Highest score first, oldest first among equal scores.
  #[default]
  MatchScore,
  /// Newest candidates first.
  CreatedDate,
}

/// Filters shared by the pending queue and the cluster browser. Every field
/// is optional; text fields match as substrings, `country` matches exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFilter {
  pub priority:   Option<Priority>,
  /// Substring of `CANDIDATE_ID`.
  pub cluster_id: Option<String>,
  /// Substring of either customer id.
  pub customer:   Option<String>,
  /// Exact `COUNTRY` of the first customer.
  pub country:    Option<String>,
  /// Substring of `ASSIGNED_TO`.
  pub consultant: Option<String>,
}

impl CandidateFilter {
  pub fn with_priority(priority: Priority) -> Self {
    Self { priority: Some(priority), ..Self::default() }
  }

  /// Drop blank text filters so that an empty form field means "any".
  pub fn normalized(self) -> Self {
    fn clean(v: Option<String>) -> Option<String> {
      v.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
    }
    Self {
      priority:   self.priority,
      cluster_id: clean(self.cluster_id),
      customer:   clean(self.customer),
      country:    clean(self.country),
      consultant: clean(self.consultant),
    }
  }

  pub fn is_empty(&self) -> bool { *self == Self::default() }
}
