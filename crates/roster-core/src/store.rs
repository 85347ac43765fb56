//! The `EventStore` and `StoreProvider` traits.
//!
//! Storage backends (e.g. `roster-store-sqlite`) implement both. Ingestion and
//! the stats query depend on these abstractions, never on a concrete backend.

use std::future::Future;

use crate::{
  event::{DailyKindCount, TrackedEvent},
  period::Period,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// Durable storage of [`TrackedEvent`]s keyed by notification identifier.
///
/// Individual writes are atomic at row granularity. A query running while an
/// upsert is in flight sees each row either before or after the write.
pub trait EventStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Create the event table if it does not exist. Safe to call repeatedly.
  fn ensure_schema(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Insert each event, replacing any stored row with the same identifier.
  ///
  /// Events are written independently: a failure on one is logged and the
  /// rest of the batch is still attempted. Returns the number of rows
  /// written.
  fn upsert<'a>(
    &'a self,
    events: &'a [TrackedEvent],
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;

  /// All events whose timestamp falls inside `period`, ordered by timestamp
  /// and then by identifier.
  fn query_by_period(
    &self,
    period: Period,
  ) -> impl Future<Output = Result<Vec<TrackedEvent>, Self::Error>> + Send + '_;

  /// Event counts grouped by calendar day and kind, ordered by day.
  fn query_daily_counts(
    &self,
    period: Period,
  ) -> impl Future<Output = Result<Vec<DailyKindCount>, Self::Error>> + Send + '_;

  /// Total number of stored events.
  fn count(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}

// ─── Provider ────────────────────────────────────────────────────────────────

/// Hands out a store handle per operation.
///
/// Callers acquire a handle, perform one operation and drop it. A provider
/// that fails to open its backend fails only the operation that asked.
pub trait StoreProvider: Send + Sync {
  type Store: EventStore;

  fn acquire(
    &self,
  ) -> impl Future<Output = Result<Self::Store, <Self::Store as EventStore>::Error>> + Send + '_;
}
