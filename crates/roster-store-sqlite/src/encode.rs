//! Encoding and decoding helpers between domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as `YYYY-MM-DD HH:MM:SS` text so that SQLite's date
//! functions work on them and lexical order matches chronological order.
//! Event kinds are stored as their feed type code.

use chrono::{NaiveDate, NaiveDateTime};
use roster_core::event::{DailyKindCount, EventKind, TrackedEvent};

use crate::{Error, Result};

pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ─── NaiveDateTime ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: NaiveDateTime) -> String { dt.format(DATETIME_FORMAT).to_string() }

pub fn decode_dt(s: &str) -> Result<NaiveDateTime> {
  NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

pub fn decode_day(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column values of one `member_tracking` row.
pub struct RawEvent {
  pub notification_id: i64,
  pub char_id:         i64,
  pub char_name:       String,
  pub type_id:         i64,
  pub event_date:      String,
}

impl RawEvent {
  pub fn from_event(ev: &TrackedEvent) -> Self {
    Self {
      notification_id: ev.notification_id,
      char_id:         ev.char_id,
      char_name:       ev.char_name.clone(),
      type_id:         ev.kind.code(),
      event_date:      encode_dt(ev.event_date),
    }
  }

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      notification_id: row.get(0)?,
      char_id:         row.get(1)?,
      char_name:       row.get(2)?,
      type_id:         row.get(3)?,
      event_date:      row.get(4)?,
    })
  }

  pub fn into_event(self) -> Result<TrackedEvent> {
    Ok(TrackedEvent {
      notification_id: self.notification_id,
      char_id:         self.char_id,
      char_name:       self.char_name,
      kind:            EventKind::try_from(self.type_id)?,
      event_date:      decode_dt(&self.event_date)?,
    })
  }
}

/// One row of the grouped daily-count query.
pub struct RawDailyCount {
  pub day:     String,
  pub type_id: i64,
  pub count:   i64,
}

impl RawDailyCount {
  pub fn into_count(self) -> Result<DailyKindCount> {
    Ok(DailyKindCount {
      day:   decode_day(&self.day)?,
      kind:  EventKind::try_from(self.type_id)?,
      count: u64::try_from(self.count).unwrap_or_default(),
    })
  }
}
