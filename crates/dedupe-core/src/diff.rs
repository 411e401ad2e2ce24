//! Field-level comparison of two customer records for side-by-side review.
//!
//! The comparison is a plain normalised string equality per field. It does
//! not score or weight anything; `MATCH_SCORE` comes from upstream.

use serde::Serialize;
use strum::{AsRefStr, EnumIter, IntoEnumIterator};

use crate::customer::Customer;

// ─── Fields ──────────────────────────────────────────────────────────────────

/// The customer attributes shown on the comparison cards, in display order.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, AsRefStr, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CompareField {
  CustomerId,
  FirstName,
  LastName,
  Email,
  Phone,
  DateOfBirth,
  #[strum(serialize = "ADDRESS_LINE1")]
  AddressLine1,
  #[strum(serialize = "ADDRESS_LINE2")]
  AddressLine2,
  City,
  PostalCode,
  AccountStatus,
  AccountType,
  SourceSystem,
  CreatedDate,
  TotalTransactions,
  AccountBalance,
}

impl CompareField {
  /// All comparable fields in display order.
  pub fn ordered() -> impl Iterator<Item = Self> { Self::iter() }

  /// Human-readable label for the comparison card.
  pub fn label(self) -> &'static str {
    match self {
      Self::CustomerId => "Customer ID",
      Self::FirstName => "First Name",
      Self::LastName => "Last Name",
      Self::Email => "Email",
      Self::Phone => "Phone",
      Self::DateOfBirth => "Date of Birth",
      Self::AddressLine1 => "Address Line 1",
      Self::AddressLine2 => "Address Line 2",
      Self::City => "City",
      Self::PostalCode => "Postal Code",
      Self::AccountStatus => "Account Status",
      Self::AccountType => "Account Type",
      Self::SourceSystem => "Source System",
      Self::CreatedDate => "Created Date",
      Self::TotalTransactions => "Total Transactions",
      Self::AccountBalance => "Account Balance",
    }
  }
}

// ─── Comparison ──────────────────────────────────────────────────────────────

/// Whether a field pair should be highlighted as agreeing or disagreeing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FieldComparison {
  Match,
  Difference,
}

impl FieldComparison {
  pub fn is_match(self) -> bool { matches!(self, Self::Match) }
}

/// One row of the comparison. `left` and `right` hold display text; the
/// verdict is taken on the full-precision values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDiff {
  pub field:      CompareField,
  pub label:      &'static str,
  pub left:       Option<String>,
  pub right:      Option<String>,
  pub comparison: FieldComparison,
}

fn normalise(value: Option<&str>) -> Option<String> {
  value
    .map(|v| v.trim().to_lowercase())
    .filter(|v| !v.is_empty())
}

/// Compare two display values: trimmed, case-insensitive equality. Missing
/// and blank values are equal to each other and differ from anything else.
pub fn compare_values(left: Option<&str>, right: Option<&str>) -> FieldComparison {
  if normalise(left) == normalise(right) {
    FieldComparison::Match
  } else {
    FieldComparison::Difference
  }
}

/// Compare every [`CompareField`] of two customers, in display order.
pub fn diff_customers(left: &Customer, right: &Customer) -> Vec<FieldDiff> {
  CompareField::ordered()
    .map(|field| {
      let comparison = compare_values(
        left.field_value(field).as_deref(),
        right.field_value(field).as_deref(),
      );
      FieldDiff {
        field,
        label: field.label(),
        left: left.field_text(field),
        right: right.field_text(field),
        comparison,
      }
    })
    .collect()
}

/// Number of fields that agree, out of the total compared.
pub fn agreement(diffs: &[FieldDiff]) -> (usize, usize) {
  let matches = diffs.iter().filter(|d| d.comparison.is_match()).count();
  (matches, diffs.len())
}
