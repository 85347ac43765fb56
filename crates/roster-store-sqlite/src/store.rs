//! [`SqliteStore`] — the SQLite implementation of [`EventStore`].

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use chrono::Datelike;
use roster_core::{
  event::{DailyKindCount, TrackedEvent},
  period::Period,
  store::{EventStore, StoreProvider},
};

use crate::{
  Error, Result,
  encode::{RawDailyCount, RawEvent, encode_dt},
  schema::{SCHEMA, UPSERT},
};

/// How long a connection waits on a lock held by another connection before
/// giving up with `SQLITE_BUSY`.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// ─── Store ───────────────────────────────────────────────────────────────────

/// An event store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. The
/// connection closes when the last clone is dropped.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) the database file at `path`.
  ///
  /// Does not touch the schema; call [`EventStore::ensure_schema`] once at
  /// startup.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path)
      .await
      .map_err(|source| Error::Open { path: path.to_path_buf(), source })?;

    conn
      .call(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(())
      })
      .await
      .map_err(|source| Error::Open { path: path.to_path_buf(), source })?;

    Ok(Self { conn })
  }

  /// Open an in-memory store with the schema in place — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.ensure_schema().await?;
    Ok(store)
  }

  #[cfg(test)]
  pub(crate) fn conn_for_tests(&self) -> &tokio_rusqlite::Connection { &self.conn }

  /// Text bounds for a month. The upper bound is `None` past year 9999,
  /// where the encoded form would no longer sort after the lower one.
  fn period_bounds(period: Period) -> (String, Option<String>) {
    let end = period.end();
    let end = (end.year() <= 9999).then(|| encode_dt(end));
    (encode_dt(period.start()), end)
  }
}

// ─── EventStore impl ─────────────────────────────────────────────────────────

impl EventStore for SqliteStore {
  type Error = Error;

  async fn ensure_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn upsert(&self, events: &[TrackedEvent]) -> Result<usize> {
    if events.is_empty() {
      return Ok(0);
    }

    let rows: Vec<RawEvent> = events.iter().map(RawEvent::from_event).collect();

    let written = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached(UPSERT)?;
        let mut written = 0usize;

        // Each row is its own autocommit statement so one bad row cannot
        // roll back the others.
        for row in &rows {
          let res = stmt.execute(rusqlite::params![
            row.notification_id,
            row.char_id,
            row.char_name,
            row.type_id,
            row.event_date,
          ]);
          match res {
            Ok(_) => written += 1,
            Err(e) => tracing::warn!(
              notification_id = row.notification_id,
              error = %e,
              "failed to store event"
            ),
          }
        }

        Ok(written)
      })
      .await?;

    Ok(written)
  }

  async fn query_by_period(&self, period: Period) -> Result<Vec<TrackedEvent>> {
    let (start, end) = Self::period_bounds(period);

    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT notification_id, char_id, char_name, notification_type_id, event_date
           FROM member_tracking
           WHERE event_date >= ?1 AND (?2 IS NULL OR event_date < ?2)
           ORDER BY event_date ASC, notification_id ASC",
        )?;

        let rows = stmt
          .query_map(rusqlite::params![start, end], RawEvent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }

  async fn query_daily_counts(&self, period: Period) -> Result<Vec<DailyKindCount>> {
    let (start, end) = Self::period_bounds(period);

    let raws: Vec<RawDailyCount> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT date(event_date) AS day, notification_type_id, COUNT(*) AS count
           FROM member_tracking
           WHERE event_date >= ?1 AND (?2 IS NULL OR event_date < ?2)
           GROUP BY day, notification_type_id
           ORDER BY day ASC",
        )?;

        let rows = stmt
          .query_map(rusqlite::params![start, end], |row| {
            Ok(RawDailyCount {
              day:     row.get(0)?,
              type_id: row.get(1)?,
              count:   row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDailyCount::into_count).collect()
  }

  async fn count(&self) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM member_tracking", [], |r| r.get(0))?)
      })
      .await?;
    Ok(u64::try_from(n).unwrap_or_default())
  }
}

// ─── Providers ───────────────────────────────────────────────────────────────

/// Opens a fresh connection to the database file for every operation.
///
/// A failure to open affects only the operation that asked for the handle;
/// the next acquisition tries again.
#[derive(Debug, Clone)]
pub struct SqliteProvider {
  path: PathBuf,
}

impl SqliteProvider {
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }
}

impl StoreProvider for SqliteProvider {
  type Store = SqliteStore;

  async fn acquire(&self) -> Result<SqliteStore> { SqliteStore::open(&self.path).await }
}

/// An already-open store hands out clones of its own connection.
impl StoreProvider for SqliteStore {
  type Store = SqliteStore;

  async fn acquire(&self) -> Result<SqliteStore> { Ok(self.clone()) }
}
