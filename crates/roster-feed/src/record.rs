//! Records decoded from the notification feed.

use chrono::NaiveDateTime;

/// One `<row>` of the feed. Transient: mapped to a
/// [`TrackedEvent`](roster_core::event::TrackedEvent) or discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRecord {
  pub notification_id: i64,
  pub type_id:         i64,
  pub sender_id:       i64,
  pub sender_name:     String,
  /// Feed-native `YYYY-MM-DD HH:MM:SS`, parsed during ingestion.
  pub sent_date:       String,
  pub read:            bool,
}

/// A decoded feed response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedPage {
  pub records:      Vec<NotificationRecord>,
  /// When the feed's cache for this key expires; polling before then
  /// returns the same rows.
  pub cached_until: Option<NaiveDateTime>,
}
