//! Tracked membership events.
//!
//! Only two notification types are ever persisted: a character joining the
//! corporation and a character leaving it. Every other type code is dropped
//! during ingestion, so [`EventKind`] has no catch-all variant.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Kind ────────────────────────────────────────────────────────────────────

/// The membership change a notification describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
  Join,
  Leave,
}

impl EventKind {
  /// Feed type code for "character joined corporation".
  pub const JOIN_CODE: i64 = 128;
  /// Feed type code for "character left corporation".
  pub const LEAVE_CODE: i64 = 21;

  pub fn code(self) -> i64 {
    match self {
      EventKind::Join => Self::JOIN_CODE,
      EventKind::Leave => Self::LEAVE_CODE,
    }
  }

  /// Map a feed type code to a kind. Returns `None` for untracked types.
  pub fn from_code(code: i64) -> Option<Self> {
    match code {
      Self::JOIN_CODE => Some(EventKind::Join),
      Self::LEAVE_CODE => Some(EventKind::Leave),
      _ => None,
    }
  }
}

impl TryFrom<i64> for EventKind {
  type Error = Error;

  fn try_from(code: i64) -> Result<Self> {
    Self::from_code(code).ok_or(Error::UnknownEventKind(code))
  }
}

// ─── Events ──────────────────────────────────────────────────────────────────

/// A persisted join or leave, keyed by the feed's notification identifier.
///
/// At most one event exists per `notification_id`; re-ingesting the same
/// identifier replaces the stored row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedEvent {
  pub notification_id: i64,
  pub char_id:         i64,
  pub char_name:       String,
  pub kind:            EventKind,
  /// Time the notification was sent, naive UTC.
  pub event_date:      NaiveDateTime,
}

/// One row of the grouped per-day query: `count` events of `kind` on `day`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyKindCount {
  pub day:   NaiveDate,
  pub kind:  EventKind,
  pub count: u64,
}
