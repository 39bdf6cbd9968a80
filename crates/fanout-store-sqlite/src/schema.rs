//! SQL schema for the Fanout SQLite store.
//!
//! Executed unconditionally at connection startup; every statement is
//! idempotent, so re-running it is a no-op. The batch stamps
//! `PRAGMA user_version = 1` so a future revision can gate real
//! migrations on that number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- The contact book. `position` preserves display order (newest first);
-- phone uniqueness is the reconciler's soft invariant, so no UNIQUE
-- constraint is placed on the phone column.
CREATE TABLE IF NOT EXISTS contacts (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    phone       TEXT NOT NULL,   -- canonical form
    email       TEXT,
    opt_in_date TEXT NOT NULL,   -- ISO 8601 UTC, last-touched
    tags        TEXT NOT NULL DEFAULT '[]',
    position    INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS campaigns (
    id               TEXT PRIMARY KEY,
    name             TEXT NOT NULL,
    message_text     TEXT NOT NULL,
    category         TEXT NOT NULL,   -- 'MARKETING' | 'UTILITY' | 'AUTHENTICATION'
    status           TEXT NOT NULL,   -- CampaignStatus wire value
    sent_count       INTEGER NOT NULL DEFAULT 0,
    open_count       INTEGER NOT NULL DEFAULT 0,
    failed_count     INTEGER NOT NULL DEFAULT 0,
    total_contacts   INTEGER NOT NULL,
    created_at       TEXT NOT NULL,
    compliance_score INTEGER,
    failure_reason   TEXT,
    position         INTEGER NOT NULL
);

-- Single-row table holding the provider credentials.
CREATE TABLE IF NOT EXISTS api_config (
    id              INTEGER PRIMARY KEY CHECK (id = 1),
    access_token    TEXT NOT NULL DEFAULT '',
    phone_number_id TEXT NOT NULL DEFAULT '',
    waba_id         TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS contacts_phone_idx    ON contacts(phone);
CREATE INDEX IF NOT EXISTS campaigns_status_idx  ON campaigns(status);

PRAGMA user_version = 1;
";
