//! [`SqliteStore`], the SQLite implementation of [`ReviewStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use dedupe_core::{
  candidate::{
    CandidateFilter, CandidateStatus, CandidateSummary, DuplicateCandidate, PendingSort,
  },
  customer::Customer,
  decision::{
    AgentDecision, DecisionReceipt, HistoryEntry, NewDecision, RedecisionPolicy,
  },
  metrics::{
    ActivityBucket, ActivityMetrics, Consultant, CountryCount, DashboardMetrics,
    ReportingPeriods,
  },
  store::ReviewStore,
};

use crate::{
  Error, Result,
  encode::{
    CANDIDATE_COLUMNS, CUSTOMER_COLUMNS, RawCandidate, RawConsultant, RawCustomer,
    RawHistory, RawSummary, encode_date, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

/// Candidate rows joined with both customers. The filter parameters are
/// always bound; a `NULL` parameter disables its condition.
///
/// `?1` pending only (0/1), `?2` priority, `?3` candidate id substring,
/// `?4` customer id substring, `?5` country, `?6` assigned agent substring.
const SUMMARY_QUERY: &str = "
SELECT dc.CANDIDATE_ID, dc.CUSTOMER_ID_1, dc.CUSTOMER_ID_2, dc.MATCH_SCORE,
       dc.MATCH_REASON, dc.PRIORITY, dc.STATUS, dc.ASSIGNED_TO, dc.CREATED_DATE,
       TRIM(COALESCE(c1.FIRST_NAME, '') || ' ' || COALESCE(c1.LAST_NAME, '')),
       TRIM(COALESCE(c2.FIRST_NAME, '') || ' ' || COALESCE(c2.LAST_NAME, '')),
       COALESCE(NULLIF(TRIM(c1.COUNTRY), ''), 'Unknown')
  FROM DUPLICATE_CANDIDATES dc
  LEFT JOIN CUSTOMERS c1 ON dc.CUSTOMER_ID_1 = c1.CUSTOMER_ID
  LEFT JOIN CUSTOMERS c2 ON dc.CUSTOMER_ID_2 = c2.CUSTOMER_ID
 WHERE (?1 = 0 OR dc.STATUS = 'PENDING')
   AND (?2 IS NULL OR dc.PRIORITY = ?2)
   AND (?3 IS NULL OR dc.CANDIDATE_ID LIKE '%' || ?3 || '%')
   AND (?4 IS NULL OR dc.CUSTOMER_ID_1 LIKE '%' || ?4 || '%'
                   OR dc.CUSTOMER_ID_2 LIKE '%' || ?4 || '%')
   AND (?5 IS NULL OR COALESCE(NULLIF(TRIM(c1.COUNTRY), ''), 'Unknown') = ?5 COLLATE NOCASE)
   AND (?6 IS NULL OR dc.ASSIGNED_TO LIKE '%' || ?6 || '%')";

/// How a decision write ended inside the transaction.
enum RecordOutcome {
  Missing,
  Refused { status: String },
  Applied { status: String, assigned: Option<String> },
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A review store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Upstream loading ──────────────────────────────────────────────────────

  /// Insert or replace customer rows in one transaction.
  ///
  /// Stands in for the upstream system that owns `CUSTOMERS`.
  pub async fn load_customers(&self, customers: Vec<Customer>) -> Result<usize> {
    let count = customers.len();
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(&format!(
            "INSERT OR REPLACE INTO CUSTOMERS ({CUSTOMER_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                     ?15, ?16, ?17)"
          ))?;
          for c in customers {
            stmt.execute(rusqlite::params![
              c.customer_id,
              c.first_name,
              c.last_name,
              c.email,
              c.phone,
              c.date_of_birth.map(encode_date),
              c.address_line1,
              c.address_line2,
              c.city,
              c.postal_code,
              c.country,
              c.account_status,
              c.account_type,
              c.source_system,
              c.created_date.map(encode_dt),
              c.total_transactions,
              c.account_balance,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    tracing::debug!(count, "loaded customers");
    Ok(count)
  }

  /// Insert or replace candidate rows in one transaction.
  ///
  /// Stands in for the upstream matching process.
  pub async fn load_candidates(&self, candidates: Vec<DuplicateCandidate>) -> Result<usize> {
    let count = candidates.len();
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(&format!(
            "INSERT OR REPLACE INTO DUPLICATE_CANDIDATES ({CANDIDATE_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
          ))?;
          for c in candidates {
            stmt.execute(rusqlite::params![
              c.candidate_id,
              c.customer_id_1,
              c.customer_id_2,
              c.match_score,
              c.match_reason,
              c.priority.as_ref(),
              c.status.as_ref(),
              c.assigned_to,
              encode_dt(c.created_date),
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    tracing::debug!(count, "loaded candidates");
    Ok(count)
  }

  /// Run [`SUMMARY_QUERY`] with the given filter and ordering.
  async fn summaries(
    &self,
    filter: &CandidateFilter,
    pending_only: bool,
    order_by: &'static str,
  ) -> Result<Vec<CandidateSummary>> {
    let filter = filter.clone().normalized();
    let priority = filter.priority.map(|p| p.as_ref().to_owned());

    let raws: Vec<RawSummary> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!("{SUMMARY_QUERY}\n ORDER BY {order_by}"))?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              pending_only,
              priority,
              filter.cluster_id,
              filter.customer,
              filter.country,
              filter.consultant,
            ],
            RawSummary::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSummary::into_summary).collect()
  }
}

// ─── ReviewStore impl ────────────────────────────────────────────────────────

impl ReviewStore for SqliteStore {
  type Error = Error;

  async fn ping(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Metrics ───────────────────────────────────────────────────────────────

  async fn dashboard_metrics(&self) -> Result<DashboardMetrics> {
    let metrics = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*),
                  COALESCE(SUM(STATUS = 'PENDING'), 0),
                  COALESCE(SUM(STATUS = 'MATCHED'), 0),
                  COALESCE(SUM(STATUS = 'NOT_MATCHED'), 0),
                  COALESCE(SUM(PRIORITY = 'HIGH' AND STATUS = 'PENDING'), 0),
                  AVG(MATCH_SCORE)
             FROM DUPLICATE_CANDIDATES",
          [],
          |row| {
            Ok(DashboardMetrics {
              total:                 row.get::<_, i64>(0)? as u64,
              pending:               row.get::<_, i64>(1)? as u64,
              matched:               row.get::<_, i64>(2)? as u64,
              not_matched:           row.get::<_, i64>(3)? as u64,
              high_priority_pending: row.get::<_, i64>(4)? as u64,
              avg_match_score:       row.get(5)?,
            })
          },
        )?)
      })
      .await?;
    tracing::debug!(?metrics, "dashboard metrics");
    Ok(metrics)
  }

  async fn activity_metrics(&self, periods: ReportingPeriods) -> Result<ActivityMetrics> {
    let today = encode_date(periods.today);
    let week = encode_date(periods.week_start);
    let month = encode_date(periods.month_start);

    let metrics = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COALESCE(SUM(DAY = ?1), 0),
                  COALESCE(SUM(DAY = ?1 AND DECISION = 'MATCHED'), 0),
                  COALESCE(SUM(DAY = ?1 AND DECISION = 'NOT_MATCHED'), 0),
                  COALESCE(SUM(DAY >= ?2), 0),
                  COALESCE(SUM(DAY >= ?2 AND DECISION = 'MATCHED'), 0),
                  COALESCE(SUM(DAY >= ?2 AND DECISION = 'NOT_MATCHED'), 0),
                  COALESCE(SUM(DAY >= ?3), 0),
                  COALESCE(SUM(DAY >= ?3 AND DECISION = 'MATCHED'), 0),
                  COALESCE(SUM(DAY >= ?3 AND DECISION = 'NOT_MATCHED'), 0)
             FROM (SELECT substr(DECISION_TIMESTAMP, 1, 10) AS DAY, DECISION
                     FROM AGENT_DECISIONS)",
          rusqlite::params![today, week, month],
          |row| {
            let bucket = |at: usize| -> rusqlite::Result<ActivityBucket> {
              Ok(ActivityBucket {
                completed:   row.get::<_, i64>(at)? as u64,
                matched:     row.get::<_, i64>(at + 1)? as u64,
                not_matched: row.get::<_, i64>(at + 2)? as u64,
              })
            };
            Ok(ActivityMetrics {
              today:         bucket(0)?,
              week_to_date:  bucket(3)?,
              month_to_date: bucket(6)?,
            })
          },
        )?)
      })
      .await?;
    Ok(metrics)
  }

  async fn country_breakdown(&self) -> Result<Vec<CountryCount>> {
    let counts = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT COALESCE(NULLIF(TRIM(c1.COUNTRY), ''), 'Unknown') AS COUNTRY_NAME,
                  COUNT(*) AS N
             FROM DUPLICATE_CANDIDATES dc
             LEFT JOIN CUSTOMERS c1 ON dc.CUSTOMER_ID_1 = c1.CUSTOMER_ID
            WHERE dc.STATUS = 'PENDING'
            GROUP BY COUNTRY_NAME
            ORDER BY N DESC, COUNTRY_NAME",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(CountryCount {
              country: row.get(0)?,
              count:   row.get::<_, i64>(1)? as u64,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(counts)
  }

  // ── Candidates ────────────────────────────────────────────────────────────

  async fn pending_candidates(
    &self,
    filter: &CandidateFilter,
    sort: PendingSort,
  ) -> Result<Vec<CandidateSummary>> {
    let order_by = match sort {
      PendingSort::MatchScore => "dc.MATCH_SCORE DESC, dc.CREATED_DATE ASC, dc.CANDIDATE_ID",
      PendingSort::CreatedDate => "dc.CREATED_DATE DESC, dc.CANDIDATE_ID",
    };
    self.summaries(filter, true, order_by).await
  }

  async fn all_candidates(&self, filter: &CandidateFilter) -> Result<Vec<CandidateSummary>> {
    self
      .summaries(filter, false, "dc.CREATED_DATE DESC, dc.CANDIDATE_ID")
      .await
  }

  async fn get_candidate(&self, candidate_id: &str) -> Result<Option<DuplicateCandidate>> {
    let id = candidate_id.to_owned();

    let raw: Option<RawCandidate> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {CANDIDATE_COLUMNS} FROM DUPLICATE_CANDIDATES WHERE CANDIDATE_ID = ?1"
            ),
            rusqlite::params![id],
            RawCandidate::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawCandidate::into_candidate).transpose()
  }

  async fn get_customer(&self, customer_id: &str) -> Result<Option<Customer>> {
    let id = customer_id.to_owned();

    let raw: Option<RawCustomer> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {CUSTOMER_COLUMNS} FROM CUSTOMERS WHERE CUSTOMER_ID = ?1"),
            rusqlite::params![id],
            RawCustomer::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawCustomer::into_customer).transpose()
  }

  // ── Decisions ─────────────────────────────────────────────────────────────

  async fn record_decision(
    &self,
    input: NewDecision,
    policy: RedecisionPolicy,
  ) -> Result<DecisionReceipt> {
    let input = input.validated()?;
    let decision = AgentDecision {
      decision_id:        Uuid::new_v4(),
      candidate_id:       input.candidate_id,
      agent_name:         input.agent_name,
      decision:           input.decision,
      decision_reason:    input.decision_reason,
      notes:              input.notes,
      session_id:         input.session_id,
      decision_timestamp: Utc::now(),
    };

    let reject = policy == RedecisionPolicy::Reject;
    let id_str = encode_uuid(decision.decision_id);
    let candidate_id = decision.candidate_id.clone();
    let agent_name = decision.agent_name.clone();
    let verdict = decision.decision.as_ref().to_owned();
    let reason = decision.decision_reason.clone();
    let notes = decision.notes.clone();
    let session_str = decision.session_id.map(encode_uuid);
    let at_str = encode_dt(decision.decision_timestamp);

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let current: Option<(String, Option<String>)> = tx
          .query_row(
            "SELECT STATUS, ASSIGNED_TO FROM DUPLICATE_CANDIDATES WHERE CANDIDATE_ID = ?1",
            rusqlite::params![candidate_id],
            |r| Ok((r.get(0)?, r.get(1)?)),
          )
          .optional()?;

        let Some((status, assigned)) = current else {
          return Ok(RecordOutcome::Missing);
        };
        if reject && status != CandidateStatus::Pending.as_ref() {
          return Ok(RecordOutcome::Refused { status });
        }

        tx.execute(
          "INSERT INTO AGENT_DECISIONS (
             DECISION_ID, CANDIDATE_ID, AGENT_NAME, DECISION, DECISION_REASON,
             NOTES, SESSION_ID, DECISION_TIMESTAMP
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            candidate_id,
            agent_name,
            verdict,
            reason,
            notes,
            session_str,
            at_str,
          ],
        )?;
        tx.execute(
          "UPDATE DUPLICATE_CANDIDATES SET STATUS = ?1, ASSIGNED_TO = ?2
            WHERE CANDIDATE_ID = ?3",
          rusqlite::params![verdict, agent_name, candidate_id],
        )?;
        tx.commit()?;

        Ok(RecordOutcome::Applied { status, assigned })
      })
      .await?;

    match outcome {
      RecordOutcome::Missing => {
        Err(dedupe_core::Error::CandidateNotFound(decision.candidate_id).into())
      }
      RecordOutcome::Refused { status } => Err(
        dedupe_core::Error::AlreadyDecided {
          id:     decision.candidate_id,
          status: CandidateStatus::parse(&status)?,
        }
        .into(),
      ),
      RecordOutcome::Applied { status, assigned } => {
        let receipt = DecisionReceipt {
          previous_status: CandidateStatus::parse(&status)?,
          previous_agent: assigned,
          decision,
        };
        if receipt.overwrote() {
          tracing::warn!(
            candidate_id = %receipt.decision.candidate_id,
            previous = %receipt.previous_status,
            previous_agent = ?receipt.previous_agent,
            agent = %receipt.decision.agent_name,
            "decision overwrote an earlier decision"
          );
        }
        Ok(receipt)
      }
    }
  }

  async fn decision_history(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws: Vec<RawHistory> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT ad.DECISION_ID, ad.DECISION_TIMESTAMP, ad.AGENT_NAME, ad.DECISION,
                  ad.DECISION_REASON, ad.NOTES, dc.CANDIDATE_ID, dc.CUSTOMER_ID_1,
                  dc.CUSTOMER_ID_2, dc.MATCH_SCORE, dc.PRIORITY
             FROM AGENT_DECISIONS ad
             JOIN DUPLICATE_CANDIDATES dc ON ad.CANDIDATE_ID = dc.CANDIDATE_ID
            ORDER BY ad.DECISION_TIMESTAMP DESC, ad.rowid DESC
            LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![limit], RawHistory::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHistory::into_entry).collect()
  }

  async fn consultants(&self) -> Result<Vec<Consultant>> {
    let raws: Vec<RawConsultant> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT AGENT_NAME, MAX(DECISION_TIMESTAMP) AS LAST_ACTIVE, COUNT(*)
             FROM AGENT_DECISIONS
            GROUP BY AGENT_NAME
            ORDER BY LAST_ACTIVE DESC, AGENT_NAME",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawConsultant {
              name:        row.get(0)?,
              last_active: row.get(1)?,
              decisions:   row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawConsultant::into_consultant).collect()
  }
}
