//! Pure reshaping of grouped counts into chart series.
//!
//! Storage returns `(day, kind, count)` rows. These are folded into a
//! day-keyed table where every day carries both counts, then flattened into
//! three index-aligned series ordered by date.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::event::{DailyKindCount, EventKind, TrackedEvent};

/// Join and leave counts for one calendar day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAggregate {
  pub joins:  u64,
  pub leaves: u64,
}

/// Day-keyed counts. `BTreeMap` keeps days in calendar order.
pub type DailyTable = BTreeMap<NaiveDate, DailyAggregate>;

/// Chart-ready series. `categories[i]`, `join[i]` and `leave[i]` all describe
/// the same day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartData {
  /// Day labels formatted `MM-DD`.
  pub categories: Vec<String>,
  pub join:       Vec<u64>,
  pub leave:      Vec<u64>,
}

/// Fold grouped counts into a [`DailyTable`].
///
/// A day seen for only one kind still gets an entry with zero for the other.
/// Repeated `(day, kind)` rows are summed.
pub fn daily_table<I>(counts: I) -> DailyTable
where
  I: IntoIterator<Item = DailyKindCount>,
{
  let mut table = DailyTable::new();
  for row in counts {
    let entry = table.entry(row.day).or_default();
    match row.kind {
      EventKind::Join => entry.joins += row.count,
      EventKind::Leave => entry.leaves += row.count,
    }
  }
  table
}

/// Flatten a table into aligned series.
pub fn chart_series(table: &DailyTable) -> ChartData {
  let mut chart = ChartData {
    categories: Vec::with_capacity(table.len()),
    join:       Vec::with_capacity(table.len()),
    leave:      Vec::with_capacity(table.len()),
  };
  for (day, agg) in table {
    chart.categories.push(day.format("%m-%d").to_string());
    chart.join.push(agg.joins);
    chart.leave.push(agg.leaves);
  }
  chart
}

/// Sum of every day in the table.
pub fn totals(table: &DailyTable) -> DailyAggregate {
  table.values().fold(DailyAggregate::default(), |acc, d| DailyAggregate {
    joins:  acc.joins + d.joins,
    leaves: acc.leaves + d.leaves,
  })
}

/// Split events into `(joins, leaves)`, preserving input order in each.
pub fn split_by_kind(
  events: Vec<TrackedEvent>,
) -> (Vec<TrackedEvent>, Vec<TrackedEvent>) {
  events
    .into_iter()
    .partition(|e| e.kind == EventKind::Join)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn day(m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2024, m, d).unwrap() }

  fn row(d: NaiveDate, kind: EventKind, count: u64) -> DailyKindCount {
    DailyKindCount { day: d, kind, count }
  }

  #[test]
  fn single_kind_days_are_zero_filled() {
    let table = daily_table([
      row(day(3, 5), EventKind::Join, 1),
      row(day(3, 6), EventKind::Leave, 1),
    ]);
    let chart = chart_series(&table);

    assert_eq!(chart.categories, vec!["03-05", "03-06"]);
    assert_eq!(chart.join, vec![1, 0]);
    assert_eq!(chart.leave, vec![0, 1]);
  }

  #[test]
  fn series_are_aligned_and_date_ordered() {
    // Deliberately out of order, with both kinds on one day.
    let table = daily_table([
      row(day(3, 20), EventKind::Leave, 2),
      row(day(3, 2), EventKind::Join, 4),
      row(day(3, 20), EventKind::Join, 1),
      row(day(3, 11), EventKind::Leave, 3),
    ]);
    let chart = chart_series(&table);

    assert_eq!(chart.categories.len(), chart.join.len());
    assert_eq!(chart.join.len(), chart.leave.len());
    assert_eq!(chart.categories, vec!["03-02", "03-11", "03-20"]);
    assert_eq!(chart.join, vec![4, 0, 1]);
    assert_eq!(chart.leave, vec![0, 3, 2]);
  }

  #[test]
  fn date_order_holds_across_month_boundary() {
    let table = daily_table([
      row(day(2, 1), EventKind::Join, 1),
      row(day(1, 31), EventKind::Join, 1),
    ]);
    let chart = chart_series(&table);
    assert_eq!(chart.categories, vec!["01-31", "02-01"]);
  }

  #[test]
  fn repeated_rows_are_summed() {
    let table = daily_table([
      row(day(3, 1), EventKind::Join, 2),
      row(day(3, 1), EventKind::Join, 3),
    ]);
    assert_eq!(table[&day(3, 1)], DailyAggregate { joins: 5, leaves: 0 });
    assert_eq!(totals(&table), DailyAggregate { joins: 5, leaves: 0 });
  }

  #[test]
  fn empty_input_gives_empty_series() {
    let chart = chart_series(&daily_table(Vec::<DailyKindCount>::new()));
    assert!(chart.categories.is_empty());
    assert!(chart.join.is_empty());
    assert!(chart.leave.is_empty());
  }
}
