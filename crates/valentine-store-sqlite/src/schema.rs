//! SQL schema for the document store.
//!
//! One table per collection. `_id` is the store-internal identifier and is
//! never part of a returned document.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Both collections are strictly append-only.
-- No UPDATE or DELETE is ever issued against these tables.
CREATE TABLE IF NOT EXISTS status_checks (
    _id       INTEGER PRIMARY KEY AUTOINCREMENT,
    document  TEXT NOT NULL   -- flat JSON object; timestamp as RFC 3339 text
);

CREATE TABLE IF NOT EXISTS activity_selections (
    _id       INTEGER PRIMARY KEY AUTOINCREMENT,
    document  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS activity_selections_timestamp_idx
    ON activity_selections(json_extract(document, '$.timestamp'));

PRAGMA user_version = 1;
";
