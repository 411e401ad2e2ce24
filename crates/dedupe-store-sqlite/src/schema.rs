//! SQL schema for the review store.
//!
//! Executed once at connection startup. Table and column names follow the
//! warehouse contract exactly, upper case included.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Maintained by upstream systems; loaded, never edited here.
CREATE TABLE IF NOT EXISTS CUSTOMERS (
    CUSTOMER_ID        TEXT PRIMARY KEY,
    FIRST_NAME         TEXT,
    LAST_NAME          TEXT,
    EMAIL              TEXT,
    PHONE              TEXT,
    DATE_OF_BIRTH      TEXT,            -- YYYY-MM-DD
    ADDRESS_LINE1      TEXT,
    ADDRESS_LINE2      TEXT,
    CITY               TEXT,
    POSTAL_CODE        TEXT,
    COUNTRY            TEXT,
    ACCOUNT_STATUS     TEXT,
    ACCOUNT_TYPE       TEXT,
    SOURCE_SYSTEM      TEXT,
    CREATED_DATE       TEXT,            -- RFC 3339 UTC
    TOTAL_TRANSACTIONS INTEGER,
    ACCOUNT_BALANCE    REAL
);

-- Customer ids are not foreign keys: upstream loads the two tables
-- independently and a referenced customer may be missing.
CREATE TABLE IF NOT EXISTS DUPLICATE_CANDIDATES (
    CANDIDATE_ID  TEXT PRIMARY KEY,
    CUSTOMER_ID_1 TEXT NOT NULL,
    CUSTOMER_ID_2 TEXT NOT NULL,
    MATCH_SCORE   REAL NOT NULL CHECK (MATCH_SCORE BETWEEN 0 AND 100),
    MATCH_REASON  TEXT,
    PRIORITY      TEXT NOT NULL CHECK (PRIORITY IN ('HIGH', 'MEDIUM', 'LOW')),
    STATUS        TEXT NOT NULL DEFAULT 'PENDING'
                  CHECK (STATUS IN ('PENDING', 'MATCHED', 'NOT_MATCHED')),
    ASSIGNED_TO   TEXT,
    CREATED_DATE  TEXT NOT NULL         -- RFC 3339 UTC
);

-- Append-only audit trail.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS AGENT_DECISIONS (
    DECISION_ID        TEXT PRIMARY KEY,
    CANDIDATE_ID       TEXT NOT NULL REFERENCES DUPLICATE_CANDIDATES(CANDIDATE_ID),
    AGENT_NAME         TEXT NOT NULL,
    DECISION           TEXT NOT NULL CHECK (DECISION IN ('MATCHED', 'NOT_MATCHED')),
    DECISION_REASON    TEXT,
    NOTES              TEXT,
    SESSION_ID         TEXT,
    DECISION_TIMESTAMP TEXT NOT NULL    -- RFC 3339 UTC, fixed width
);

CREATE INDEX IF NOT EXISTS candidates_status_idx    ON DUPLICATE_CANDIDATES(STATUS);
CREATE INDEX IF NOT EXISTS decisions_candidate_idx  ON AGENT_DECISIONS(CANDIDATE_ID);
CREATE INDEX IF NOT EXISTS decisions_timestamp_idx  ON AGENT_DECISIONS(DECISION_TIMESTAMP);

PRAGMA user_version = 1;
";
