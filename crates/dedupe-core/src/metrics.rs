//! Dashboard aggregates. Computed fresh by the store on every request.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ─── Candidate counts ────────────────────────────────────────────────────────

/// Counts over `DUPLICATE_CANDIDATES` by status, plus the average score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
  pub total:                 u64,
  pub pending:               u64,
  pub matched:               u64,
  pub not_matched:           u64,
  /// `PRIORITY = 'HIGH'` and `STATUS = 'PENDING'`.
  pub high_priority_pending: u64,
  /// `None` when there are no candidates at all.
  pub avg_match_score:       Option<f64>,
}

impl DashboardMetrics {
  /// Share of candidates that have been decided, in percent.
  pub fn completion_pct(&self) -> f64 {
    if self.total == 0 {
      0.0
    } else {
      (self.matched + self.not_matched) as f64 * 100.0 / self.total as f64
    }
  }
}

// ─── Decision activity ───────────────────────────────────────────────────────

/// Decision counts within one reporting period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityBucket {
  pub completed:   u64,
  pub matched:     u64,
  pub not_matched: u64,
}

/// `AGENT_DECISIONS` bucketed by calendar period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityMetrics {
  pub today:         ActivityBucket,
  pub week_to_date:  ActivityBucket,
  pub month_to_date: ActivityBucket,
}

/// The first day of each reporting period, relative to a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingPeriods {
  pub today:       NaiveDate,
  /// Monday of the reference date's week.
  pub week_start:  NaiveDate,
  pub month_start: NaiveDate,
}

impl ReportingPeriods {
  pub fn for_date(today: NaiveDate) -> Self {
    let offset = u64::from(today.weekday().num_days_from_monday());
    let week_start = today.checked_sub_days(Days::new(offset)).unwrap_or(today);
    let month_start = today.with_day(1).unwrap_or(today);
    Self { today, week_start, month_start }
  }

  pub fn now() -> Self { Self::for_date(Utc::now().date_naive()) }
}

// ─── Regions ─────────────────────────────────────────────────────────────────

/// Pending candidates for one `COUNTRY` value of the first customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryCount {
  /// `"Unknown"` when the customer has no country.
  pub country: String,
  pub count:   u64,
}

/// A region tile shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
  pub code: String,
  pub name: String,
}

impl Region {
  pub fn new(code: &str, name: &str) -> Self {
    Self { code: code.to_owned(), name: name.to_owned() }
  }

  /// Whether a stored `COUNTRY` value belongs to this region. Stored values
  /// may hold either the code or the full name.
  pub fn covers(&self, country: &str) -> bool {
    let country = country.trim();
    country.eq_ignore_ascii_case(&self.code)
      || country.eq_ignore_ascii_case(&self.name)
  }
}

/// The Pacific Islands region list.
pub fn default_regions() -> Vec<Region> {
  vec![
    Region::new("FJ", "Fiji"),
    Region::new("NZ", "New Zealand"),
    Region::new("AS", "American Samoa"),
    Region::new("CK", "Cook Islands"),
    Region::new("SB", "Solomon Islands"),
    Region::new("TO", "Tonga"),
    Region::new("VU", "Vanuatu"),
    Region::new("WS", "Western Samoa"),
    Region::new("Unknown", "Multiple/No Country Code"),
  ]
}

/// Fold a country breakdown onto a region list. Every region appears, in
/// list order, with zero when nothing matched.
pub fn region_board(regions: &[Region], counts: &[CountryCount]) -> Vec<(Region, u64)> {
  regions
    .iter()
    .map(|region| {
      let total = counts
        .iter()
        .filter(|c| region.covers(&c.country))
        .map(|c| c.count)
        .sum();
      (region.clone(), total)
    })
    .collect()
}

// ─── Consultants ─────────────────────────────────────────────────────────────

/// An agent derived from `AGENT_DECISIONS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consultant {
  pub name:        String,
  pub last_active: DateTime<Utc>,
  pub decisions:   u64,
}

/// Time-of-day greeting shown on the dashboard.
pub fn greeting(hour: u32) -> &'static str {
  match hour {
    0..=11 => "Bula! Good Morning",
    12..=16 => "Bula! Good Afternoon",
    _ => "Bula! Good Evening",
  }
}
