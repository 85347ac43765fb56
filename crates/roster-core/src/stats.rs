//! Monthly membership statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  aggregate::{ChartData, DailyAggregate, chart_series, daily_table, split_by_kind, totals},
  event::TrackedEvent,
  period::Period,
  store::{EventStore, StoreProvider},
};

pub const TITLE: &str = "Member Stats";

/// Everything the presentation layer needs for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsResult {
  pub title:       String,
  /// The month reported on, `YYYY-MM`.
  pub period:      String,
  pub joins:       Vec<TrackedEvent>,
  pub leaves:      Vec<TrackedEvent>,
  pub join_count:  usize,
  pub leave_count: usize,
  /// Sums of the daily series.
  pub totals:      DailyAggregate,
  pub chart:       ChartData,
}

/// Build the stats for `period`, or for the month containing `now` when
/// `period` is empty.
///
/// Acquires one store handle for both queries and releases it on return.
pub async fn build_stats<P>(
  provider: &P,
  period:   &str,
  now:      DateTime<Utc>,
) -> Result<StatsResult>
where
  P: StoreProvider,
{
  let period = Period::parse_or_current(period, now)?;

  let store = provider.acquire().await.map_err(Error::store)?;
  let events = store.query_by_period(period).await.map_err(Error::store)?;
  let counts = store
    .query_daily_counts(period)
    .await
    .map_err(Error::store)?;
  drop(store);

  let (joins, leaves) = split_by_kind(events);
  let table = daily_table(counts);
  let chart = chart_series(&table);

  Ok(StatsResult {
    title: TITLE.to_owned(),
    period: period.to_string(),
    join_count: joins.len(),
    leave_count: leaves.len(),
    joins,
    leaves,
    totals: totals(&table),
    chart,
  })
}

#[cfg(test)]
mod tests {
  use std::{
    convert::Infallible,
    sync::{Arc, Mutex},
  };

  use chrono::{NaiveDate, NaiveDateTime, TimeZone};

  use super::*;
  use crate::event::{DailyKindCount, EventKind};

  /// Minimal in-memory backend so the query logic can be tested without
  /// SQLite.
  #[derive(Clone, Default)]
  struct MemStore {
    rows: Arc<Mutex<Vec<TrackedEvent>>>,
  }

  impl EventStore for MemStore {
    type Error = Infallible;

    async fn ensure_schema(&self) -> Result<(), Infallible> { Ok(()) }

    async fn upsert(&self, events: &[TrackedEvent]) -> Result<usize, Infallible> {
      let mut rows = self.rows.lock().unwrap();
      for ev in events {
        rows.retain(|r| r.notification_id != ev.notification_id);
        rows.push(ev.clone());
      }
      Ok(events.len())
    }

    async fn query_by_period(&self, period: Period) -> Result<Vec<TrackedEvent>, Infallible> {
      let rows = self.rows.lock().unwrap();
      Ok(rows.iter().filter(|r| period.contains(r.event_date)).cloned().collect())
    }

    async fn query_daily_counts(
      &self,
      period: Period,
    ) -> Result<Vec<DailyKindCount>, Infallible> {
      let rows = self.rows.lock().unwrap();
      Ok(
        rows
          .iter()
          .filter(|r| period.contains(r.event_date))
          .map(|r| DailyKindCount { day: r.event_date.date(), kind: r.kind, count: 1 })
          .collect(),
      )
    }

    async fn count(&self) -> Result<u64, Infallible> {
      Ok(self.rows.lock().unwrap().len() as u64)
    }
  }

  impl StoreProvider for MemStore {
    type Store = MemStore;

    async fn acquire(&self) -> Result<MemStore, Infallible> { Ok(self.clone()) }
  }

  fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
      .unwrap()
      .and_hms_opt(h, 0, 0)
      .unwrap()
  }

  fn event(id: i64, name: &str, kind: EventKind, date: NaiveDateTime) -> TrackedEvent {
    TrackedEvent {
      notification_id: id,
      char_id:         id * 10,
      char_name:       name.into(),
      kind,
      event_date:      date,
    }
  }

  fn now() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap() }

  #[tokio::test]
  async fn builds_split_lists_and_aligned_series() {
    let store = MemStore::default();
    store
      .upsert(&[
        event(1001, "Alice", EventKind::Join, at(2024, 3, 5, 10)),
        event(1002, "Bob", EventKind::Leave, at(2024, 3, 6, 12)),
        event(1003, "Carol", EventKind::Join, at(2024, 4, 1, 0)),
      ])
      .await
      .unwrap();

    let stats = build_stats(&store, "2024-03", now()).await.unwrap();

    assert_eq!(stats.title, TITLE);
    assert_eq!(stats.period, "2024-03");
    assert_eq!(stats.join_count, 1);
    assert_eq!(stats.leave_count, 1);
    assert_eq!(stats.joins[0].char_name, "Alice");
    assert_eq!(stats.leaves[0].char_name, "Bob");
    assert_eq!(stats.chart.categories, vec!["03-05", "03-06"]);
    assert_eq!(stats.chart.join, vec![1, 0]);
    assert_eq!(stats.chart.leave, vec![0, 1]);
    assert_eq!(stats.totals, DailyAggregate { joins: 1, leaves: 1 });
  }

  #[tokio::test]
  async fn empty_period_uses_current_month() {
    let store = MemStore::default();
    store
      .upsert(&[event(1, "Dana", EventKind::Join, at(2024, 3, 1, 0))])
      .await
      .unwrap();

    let stats = build_stats(&store, "", now()).await.unwrap();
    assert_eq!(stats.period, "2024-03");
    assert_eq!(stats.join_count, 1);
  }

  #[tokio::test]
  async fn invalid_period_is_rejected_before_touching_store() {
    let store = MemStore::default();
    let err = build_stats(&store, "March", now()).await.unwrap_err();
    assert!(matches!(err, Error::InvalidPeriod(_)));
  }

  #[tokio::test]
  async fn month_without_events_is_empty_not_an_error() {
    let store = MemStore::default();
    let stats = build_stats(&store, "1999-01", now()).await.unwrap();
    assert_eq!(stats.join_count, 0);
    assert_eq!(stats.leave_count, 0);
    assert!(stats.chart.categories.is_empty());
    assert_eq!(stats.totals, DailyAggregate::default());
  }
}
