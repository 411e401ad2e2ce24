//! The `ReviewStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `dedupe-store-sqlite`).
//! Higher layers (`dedupe-api`, `dedupe-web`) depend on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use crate::{
  candidate::{CandidateFilter, CandidateSummary, DuplicateCandidate, PendingSort},
  customer::Customer,
  decision::{DecisionReceipt, HistoryEntry, NewDecision, RedecisionPolicy},
  metrics::{ActivityMetrics, Consultant, CountryCount, DashboardMetrics, ReportingPeriods},
};

/// Abstraction over the review data store.
///
/// Customers and candidates are read-only except for the single status
/// transition performed by [`ReviewStore::record_decision`]. Decisions are
/// append-only.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ReviewStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Cheap round trip used to report connection status.
  fn ping(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Metrics ───────────────────────────────────────────────────────────

  /// Candidate counts by status and the average match score.
  fn dashboard_metrics(
    &self,
  ) -> impl Future<Output = Result<DashboardMetrics, Self::Error>> + Send + '_;

  /// Decision counts for today, week-to-date and month-to-date.
  fn activity_metrics(
    &self,
    periods: ReportingPeriods,
  ) -> impl Future<Output = Result<ActivityMetrics, Self::Error>> + Send + '_;

  /// Pending candidates grouped by the first customer's country, largest
  /// group first.
  fn country_breakdown(
    &self,
  ) -> impl Future<Output = Result<Vec<CountryCount>, Self::Error>> + Send + '_;

  // ── Candidates ────────────────────────────────────────────────────────

  /// Pending candidates matching `filter`, in `sort` order.
  fn pending_candidates<'a>(
    &'a self,
    filter: &'a CandidateFilter,
    sort: PendingSort,
  ) -> impl Future<Output = Result<Vec<CandidateSummary>, Self::Error>> + Send + 'a;

  /// Candidates in any status matching `filter`, newest first.
  fn all_candidates<'a>(
    &'a self,
    filter: &'a CandidateFilter,
  ) -> impl Future<Output = Result<Vec<CandidateSummary>, Self::Error>> + Send + 'a;

  /// Retrieve a candidate by id. Returns `None` if not found.
  fn get_candidate<'a>(
    &'a self,
    candidate_id: &'a str,
  ) -> impl Future<Output = Result<Option<DuplicateCandidate>, Self::Error>> + Send + 'a;

  /// Retrieve a customer by id. Returns `None` if not found.
  fn get_customer<'a>(
    &'a self,
    customer_id: &'a str,
  ) -> impl Future<Output = Result<Option<Customer>, Self::Error>> + Send + 'a;

  // ── Decisions ─────────────────────────────────────────────────────────

  /// Append a decision and move the candidate to the decided status, as one
  /// atomic unit. The identifier and timestamp are set by the store.
  ///
  /// Returns an error if the candidate does not exist, or if it is no longer
  /// pending and `policy` is [`RedecisionPolicy::Reject`].
  fn record_decision(
    &self,
    input: NewDecision,
    policy: RedecisionPolicy,
  ) -> impl Future<Output = Result<DecisionReceipt, Self::Error>> + Send + '_;

  /// Most recent decisions first, joined with their candidates.
  fn decision_history(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<HistoryEntry>, Self::Error>> + Send + '_;

  /// Agents who have recorded at least one decision, most recently active
  /// first.
  fn consultants(
    &self,
  ) -> impl Future<Output = Result<Vec<Consultant>, Self::Error>> + Send + '_;
}
