//! Error types for `dedupe-core`.

use thiserror::Error;

use crate::candidate::CandidateStatus;

#[derive(Debug, Error)]
pub enum Error {
  #[error("candidate not found: {0}")]
  CandidateNotFound(String),

  #[error("customer not found: {0}")]
  CustomerNotFound(String),

  #[error("candidate {id} is already {status}")]
  AlreadyDecided { id: String, status: CandidateStatus },

  #[error("agent name must not be empty")]
  MissingAgentName,

  #[error("unknown {kind} value: {value:?}")]
  UnknownValue { kind: &'static str, value: String },
}

impl Error {
  /// The first domain error in `err`'s source chain, `err` included.
  ///
  /// Storage backends wrap domain errors in their own error types; callers
  /// holding only `&dyn Error` use this to recover the domain condition.
  pub fn find_in<'a>(err: &'a (dyn std::error::Error + 'static)) -> Option<&'a Error> {
    std::iter::successors(Some(err), |e| e.source()).find_map(|e| e.downcast_ref::<Error>())
  }

  pub(crate) fn unknown(kind: &'static str, value: impl Into<String>) -> Self {
    Self::UnknownValue { kind, value: value.into() }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
