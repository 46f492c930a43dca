//! SQL schema for the portal SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS events (
    event_id          TEXT PRIMARY KEY,
    title             TEXT NOT NULL CHECK (trim(title) != ''),
    start_at          TEXT,            -- RFC 3339 UTC; NULL = not scheduled
    audience          TEXT,            -- JSON string or JSON array of tags
    short_description TEXT,
    full_description  TEXT,
    stream_url        TEXT,
    worksheet_url     TEXT,
    archive_url       TEXT,
    is_published      INTEGER NOT NULL DEFAULT 0 CHECK (is_published IN (0, 1)),
    created_at        TEXT NOT NULL,   -- server-assigned
    updated_at        TEXT NOT NULL    -- server-assigned; bumped on update
);

CREATE TABLE IF NOT EXISTS platform_admins (
    user_id    TEXT PRIMARY KEY,
    granted_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS events_published_idx ON events(is_published);
CREATE INDEX IF NOT EXISTS events_start_idx     ON events(start_at);

PRAGMA user_version = 1;
";
