//! SQL schema for the roster SQLite store.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per feed notification. Re-ingesting an identifier replaces the row.
CREATE TABLE IF NOT EXISTS member_tracking (
    notification_id      INTEGER NOT NULL PRIMARY KEY,
    char_id              INTEGER NOT NULL,
    char_name            TEXT    NOT NULL,
    notification_type_id INTEGER NOT NULL CHECK (notification_type_id IN (21, 128)),
    event_date           TEXT    NOT NULL   -- 'YYYY-MM-DD HH:MM:SS', naive UTC
);

CREATE INDEX IF NOT EXISTS member_tracking_date_idx ON member_tracking(event_date);

PRAGMA user_version = 1;
";

pub const UPSERT: &str = "
INSERT OR REPLACE INTO member_tracking (
  notification_id, char_id, char_name, notification_type_id, event_date
) VALUES (?1, ?2, ?3, ?4, ?5)";
