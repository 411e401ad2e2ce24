//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings (microsecond
//! precision, `Z` suffix) so that string order is time order and the first
//! ten characters are the calendar date. Dates of birth are `YYYY-MM-DD`.
//! Enumerations are stored as their upper-case warehouse names.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use dedupe_core::{
  candidate::{CandidateStatus, CandidateSummary, DuplicateCandidate, Priority},
  customer::Customer,
  decision::{Decision, HistoryEntry},
  metrics::Consultant,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Dates ───────────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Customers ───────────────────────────────────────────────────────────────

/// Column list shared by every `CUSTOMERS` read, in [`RawCustomer`] order.
pub const CUSTOMER_COLUMNS: &str = "CUSTOMER_ID, FIRST_NAME, LAST_NAME, EMAIL, \
  PHONE, DATE_OF_BIRTH, ADDRESS_LINE1, ADDRESS_LINE2, CITY, POSTAL_CODE, \
  COUNTRY, ACCOUNT_STATUS, ACCOUNT_TYPE, SOURCE_SYSTEM, CREATED_DATE, \
  TOTAL_TRANSACTIONS, ACCOUNT_BALANCE";

/// Raw values read directly from a `CUSTOMERS` row.
pub struct RawCustomer {
  pub customer_id:        String,
  pub first_name:         Option<String>,
  pub last_name:          Option<String>,
  pub email:              Option<String>,
  pub phone:              Option<String>,
  pub date_of_birth:      Option<String>,
  pub address_line1:      Option<String>,
  pub address_line2:      Option<String>,
  pub city:               Option<String>,
  pub postal_code:        Option<String>,
  pub country:            Option<String>,
  pub account_status:     Option<String>,
  pub account_type:       Option<String>,
  pub source_system:      Option<String>,
  pub created_date:       Option<String>,
  pub total_transactions: Option<i64>,
  pub account_balance:    Option<f64>,
}

impl RawCustomer {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      customer_id:        row.get(0)?,
      first_name:         row.get(1)?,
      last_name:          row.get(2)?,
      email:              row.get(3)?,
      phone:              row.get(4)?,
      date_of_birth:      row.get(5)?,
      address_line1:      row.get(6)?,
      address_line2:      row.get(7)?,
      city:               row.get(8)?,
      postal_code:        row.get(9)?,
      country:            row.get(10)?,
      account_status:     row.get(11)?,
      account_type:       row.get(12)?,
      source_system:      row.get(13)?,
      created_date:       row.get(14)?,
      total_transactions: row.get(15)?,
      account_balance:    row.get(16)?,
    })
  }

  pub fn into_customer(self) -> Result<Customer> {
    Ok(Customer {
      customer_id:        self.customer_id,
      first_name:         self.first_name,
      last_name:          self.last_name,
      email:              self.email,
      phone:              self.phone,
      date_of_birth:      self.date_of_birth.as_deref().map(decode_date).transpose()?,
      address_line1:      self.address_line1,
      address_line2:      self.address_line2,
      city:               self.city,
      postal_code:        self.postal_code,
      country:            self.country,
      account_status:     self.account_status,
      account_type:       self.account_type,
      source_system:      self.source_system,
      created_date:       self.created_date.as_deref().map(decode_dt).transpose()?,
      total_transactions: self.total_transactions,
      account_balance:    self.account_balance,
    })
  }
}

// ─── Candidates ──────────────────────────────────────────────────────────────

pub const CANDIDATE_COLUMNS: &str = "CANDIDATE_ID, CUSTOMER_ID_1, CUSTOMER_ID_2, \
  MATCH_SCORE, MATCH_REASON, PRIORITY, STATUS, ASSIGNED_TO, CREATED_DATE";

/// Raw values read directly from a `DUPLICATE_CANDIDATES` row.
pub struct RawCandidate {
  pub candidate_id:  String,
  pub customer_id_1: String,
  pub customer_id_2: String,
  pub match_score:   f64,
  pub match_reason:  Option<String>,
  pub priority:      String,
  pub status:        String,
  pub assigned_to:   Option<String>,
  pub created_date:  String,
}

impl RawCandidate {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      candidate_id:  row.get(0)?,
      customer_id_1: row.get(1)?,
      customer_id_2: row.get(2)?,
      match_score:   row.get(3)?,
      match_reason:  row.get(4)?,
      priority:      row.get(5)?,
      status:        row.get(6)?,
      assigned_to:   row.get(7)?,
      created_date:  row.get(8)?,
    })
  }

  pub fn into_candidate(self) -> Result<DuplicateCandidate> {
    Ok(DuplicateCandidate {
      candidate_id:  self.candidate_id,
      customer_id_1: self.customer_id_1,
      customer_id_2: self.customer_id_2,
      match_score:   self.match_score,
      match_reason:  self.match_reason,
      priority:      Priority::parse(&self.priority)?,
      status:        CandidateStatus::parse(&self.status)?,
      assigned_to:   self.assigned_to,
      created_date:  decode_dt(&self.created_date)?,
    })
  }
}

/// A candidate row joined with both customers' names and the first
/// customer's country.
pub struct RawSummary {
  pub candidate: RawCandidate,
  pub name_1:    String,
  pub name_2:    String,
  pub country:   String,
}

impl RawSummary {
  /// Expects [`CANDIDATE_COLUMNS`] followed by `name_1, name_2, country`.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      candidate: RawCandidate::from_row(row)?,
      name_1:    row.get(9)?,
      name_2:    row.get(10)?,
      country:   row.get(11)?,
    })
  }

  pub fn into_summary(self) -> Result<CandidateSummary> {
    let c = self.candidate.into_candidate()?;
    Ok(CandidateSummary {
      candidate_id:  c.candidate_id,
      customer_id_1: c.customer_id_1,
      customer_id_2: c.customer_id_2,
      name_1:        self.name_1,
      name_2:        self.name_2,
      country:       self.country,
      match_score:   c.match_score,
      match_reason:  c.match_reason,
      priority:      c.priority,
      status:        c.status,
      assigned_to:   c.assigned_to,
      created_date:  c.created_date,
    })
  }
}

// ─── History ─────────────────────────────────────────────────────────────────

/// Raw values from an `AGENT_DECISIONS` row joined with its candidate.
pub struct RawHistory {
  pub decision_id:        String,
  pub decision_timestamp: String,
  pub agent_name:         String,
  pub decision:           String,
  pub decision_reason:    Option<String>,
  pub notes:              Option<String>,
  pub candidate_id:       String,
  pub customer_id_1:      String,
  pub customer_id_2:      String,
  pub match_score:        f64,
  pub priority:           String,
}

impl RawHistory {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      decision_id:        row.get(0)?,
      decision_timestamp: row.get(1)?,
      agent_name:         row.get(2)?,
      decision:           row.get(3)?,
      decision_reason:    row.get(4)?,
      notes:              row.get(5)?,
      candidate_id:       row.get(6)?,
      customer_id_1:      row.get(7)?,
      customer_id_2:      row.get(8)?,
      match_score:        row.get(9)?,
      priority:           row.get(10)?,
    })
  }

  pub fn into_entry(self) -> Result<HistoryEntry> {
    Ok(HistoryEntry {
      decision_id:        decode_uuid(&self.decision_id)?,
      decision_timestamp: decode_dt(&self.decision_timestamp)?,
      agent_name:         self.agent_name,
      decision:           Decision::parse(&self.decision)?,
      decision_reason:    self.decision_reason,
      notes:              self.notes,
      candidate_id:       self.candidate_id,
      customer_id_1:      self.customer_id_1,
      customer_id_2:      self.customer_id_2,
      match_score:        self.match_score,
      priority:           Priority::parse(&self.priority)?,
    })
  }
}

// ─── Consultants ─────────────────────────────────────────────────────────────

pub struct RawConsultant {
  pub name:        String,
  pub last_active: String,
  pub decisions:   i64,
}

impl RawConsultant {
  pub fn into_consultant(self) -> Result<Consultant> {
    Ok(Consultant {
      name:        self.name,
      last_active: decode_dt(&self.last_active)?,
      decisions:   self.decisions.max(0) as u64,
    })
  }
}
