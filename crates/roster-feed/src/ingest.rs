//! One ingestion cycle: fetch → filter → map → upsert.

use chrono::NaiveDateTime;
use roster_core::{
  event::{EventKind, TrackedEvent},
  store::{EventStore, StoreProvider},
};

use crate::{
  Error, Result,
  client::{Credentials, FeedClient},
  record::NotificationRecord,
  xml::parse_feed_time,
};

/// Outcome of a successful cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
  /// Rows returned by the feed.
  pub fetched:      usize,
  /// Join/leave rows with a usable timestamp.
  pub tracked:      usize,
  /// Join/leave rows dropped because their timestamp did not parse.
  pub skipped:      usize,
  /// Rows the store accepted.
  pub stored:       usize,
  pub cached_until: Option<NaiveDateTime>,
}

/// Map one feed row to a [`TrackedEvent`].
///
/// Returns `Ok(None)` for notification types other than join and leave, and
/// [`Error::RecordParse`] when `sentDate` is malformed.
pub fn to_tracked(record: &NotificationRecord) -> Result<Option<TrackedEvent>> {
  let Some(kind) = EventKind::from_code(record.type_id) else {
    return Ok(None);
  };

  let event_date =
    parse_feed_time(&record.sent_date).map_err(|source| Error::RecordParse {
      notification_id: record.notification_id,
      sent_date: record.sent_date.clone(),
      source,
    })?;

  Ok(Some(TrackedEvent {
    notification_id: record.notification_id,
    char_id: record.sender_id,
    char_name: record.sender_name.clone(),
    kind,
    event_date,
  }))
}

/// Drives [`FeedClient`] and writes the resulting events through a
/// [`StoreProvider`].
pub struct Pipeline<P> {
  client:   FeedClient,
  provider: P,
}

impl<P> Pipeline<P>
where
  P: StoreProvider,
{
  pub fn new(client: FeedClient, provider: P) -> Self { Self { client, provider } }

  pub fn provider(&self) -> &P { &self.provider }

  /// Run a single cycle.
  ///
  /// A fetch or decode failure aborts the cycle before storage is touched.
  /// A row with a bad timestamp is logged and dropped without affecting the
  /// rest. The store is acquired only if there is something to write.
  pub async fn run_once(&self, credentials: &Credentials) -> Result<CycleReport> {
    let page = match self.client.fetch_page(credentials).await {
      Ok(page) => page,
      Err(e) => {
        tracing::error!(error = %e, remote = e.is_remote(), "feed fetch failed; cycle aborted");
        return Err(e);
      }
    };

    let mut report = CycleReport {
      fetched: page.records.len(),
      cached_until: page.cached_until,
      ..CycleReport::default()
    };

    let mut events = Vec::new();
    for record in &page.records {
      match to_tracked(record) {
        Ok(Some(event)) => events.push(event),
        Ok(None) => {}
        Err(e) => {
          tracing::warn!(error = %e, "skipping notification");
          report.skipped += 1;
        }
      }
    }
    report.tracked = events.len();

    if events.is_empty() {
      tracing::debug!(fetched = report.fetched, "no membership events in feed");
      return Ok(report);
    }

    let store = self.provider.acquire().await.map_err(|e| {
      tracing::error!(error = %e, "could not open store; cycle aborted");
      Error::Store(Box::new(e))
    })?;

    report.stored = store.upsert(&events).await.map_err(|e| {
      tracing::error!(error = %e, "storing events failed");
      Error::Store(Box::new(e))
    })?;

    Ok(report)
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use chrono::{TimeZone, Utc};
  use httpmock::{Method::GET, MockServer};
  use roster_core::stats::build_stats;
  use roster_store_sqlite::SqliteStore;

  use super::*;

  const PATH: &str = "/Char/Notifications.xml.aspx";

  fn row(id: i64, type_id: i64, name: &str, sent: &str) -> String {
    format!(
      r#"<row notificationID="{id}" typeID="{type_id}" senderID="{}" senderName="{name}" sentDate="{sent}" read="0"/>"#,
      id + 90_000
    )
  }

  fn feed(rows: &[String]) -> String {
    format!(
      "<?xml version='1.0' encoding='UTF-8'?>\n<eveapi version=\"2\"><currentTime>2024-03-07 09:40:00</currentTime>\
       <result><rowset name=\"notifications\">{}</rowset></result>\
       <cachedUntil>2024-03-07 10:00:00</cachedUntil></eveapi>",
      rows.concat()
    )
  }

  fn scenario_feed() -> String {
    feed(&[
      row(1001, 128, "Alice", "2024-03-05 10:00:00"),
      row(1002, 21, "Bob", "2024-03-06 12:00:00"),
    ])
  }

  fn creds() -> Credentials { Credentials { key_id: 42, vcode: "secret".into() } }

  async fn serve(body: String, status: u16) -> MockServer {
    let server = MockServer::start_async().await;
    server
      .mock_async(move |when, then| {
        when.method(GET).path(PATH);
        then.status(status).body(body);
      })
      .await;
    server
  }

  async fn pipeline(server: &MockServer) -> Pipeline<SqliteStore> {
    let client = FeedClient::new(server.url(PATH), Duration::from_secs(5)).unwrap();
    let store = SqliteStore::open_in_memory().await.unwrap();
    Pipeline::new(client, store)
  }

  #[test]
  fn untracked_types_map_to_none() {
    let record = NotificationRecord {
      notification_id: 5,
      type_id:         75,
      sender_id:       1,
      sender_name:     "X".into(),
      sent_date:       "garbage".into(),
      read:            false,
    };
    assert!(to_tracked(&record).unwrap().is_none());
  }

  #[tokio::test]
  async fn join_and_leave_scenario() {
    let server = serve(scenario_feed(), 200).await;
    let p = pipeline(&server).await;

    let report = p.run_once(&creds()).await.unwrap();
    assert_eq!(report.fetched, 2);
    assert_eq!(report.stored, 2);
    assert!(report.cached_until.is_some());

    let now = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();
    let stats = build_stats(p.provider(), "2024-03", now).await.unwrap();
    assert_eq!(stats.join_count, 1);
    assert_eq!(stats.leave_count, 1);
    assert_eq!(stats.chart.categories, vec!["03-05", "03-06"]);
    assert_eq!(stats.chart.join, vec![1, 0]);
    assert_eq!(stats.chart.leave, vec![0, 1]);
  }

  #[tokio::test]
  async fn replaying_the_same_feed_is_idempotent() {
    let server = serve(scenario_feed(), 200).await;
    let p = pipeline(&server).await;
    let now = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();

    p.run_once(&creds()).await.unwrap();
    let first = build_stats(p.provider(), "2024-03", now).await.unwrap();

    p.run_once(&creds()).await.unwrap();
    let second = build_stats(p.provider(), "2024-03", now).await.unwrap();

    assert_eq!(p.provider().count().await.unwrap(), 2);
    assert_eq!(first, second);
  }

  #[tokio::test]
  async fn other_notification_types_never_reach_storage() {
    let body = feed(&[
      row(1, 128, "Alice", "2024-03-05 10:00:00"),
      row(2, 75, "Tower", "2024-03-05 11:00:00"),
      row(3, 16, "Applicant", "2024-03-05 12:00:00"),
      row(4, 21, "Bob", "2024-03-05 13:00:00"),
    ]);
    let server = serve(body, 200).await;
    let p = pipeline(&server).await;

    let report = p.run_once(&creds()).await.unwrap();
    assert_eq!(report.fetched, 4);
    assert_eq!(report.tracked, 2);
    assert_eq!(p.provider().count().await.unwrap(), 2);

    let period = "2024-03".parse().unwrap();
    let ids: Vec<i64> = p
      .provider()
      .query_by_period(period)
      .await
      .unwrap()
      .iter()
      .map(|e| e.notification_id)
      .collect();
    assert_eq!(ids, vec![1, 4]);
  }

  #[tokio::test]
  async fn bad_timestamp_drops_only_that_record() {
    let body = feed(&[
      row(1, 128, "Alice", "2024-03-05 10:00:00"),
      row(2, 128, "Broken", "05/03/2024 10:00"),
      row(3, 21, "Bob", "2024-03-06 12:00:00"),
    ]);
    let server = serve(body, 200).await;
    let p = pipeline(&server).await;

    let report = p.run_once(&creds()).await.unwrap();
    assert_eq!(report.skipped, 1);
    assert_eq!(report.stored, 2);
    assert_eq!(p.provider().count().await.unwrap(), 2);
  }

  #[tokio::test]
  async fn rows_missing_optional_attributes_do_not_sink_the_feed() {
    let body = feed(&[
      row(1, 128, "Alice", "2024-03-05 10:00:00"),
      r#"<row notificationID="2" typeID="128" senderID="5" senderName="NoDate" read="0"/>"#.into(),
      r#"<row notificationID="3" typeID="75" senderID="6" sentDate="2024-03-05 11:00:00"/>"#.into(),
    ]);
    let server = serve(body, 200).await;
    let p = pipeline(&server).await;

    let report = p.run_once(&creds()).await.unwrap();
    assert_eq!(report.fetched, 3);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.stored, 1);

    let stored = p.provider().query_by_period("2024-03".parse().unwrap()).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].notification_id, 1);
  }

  #[tokio::test]
  async fn service_unavailable_leaves_storage_untouched() {
    let server = serve("down for maintenance".into(), 503).await;
    let p = pipeline(&server).await;
    p.provider()
      .upsert(&[TrackedEvent {
        notification_id: 1,
        char_id:         2,
        char_name:       "Existing".into(),
        kind:            EventKind::Join,
        event_date:      parse_feed_time("2024-03-01 00:00:00").unwrap(),
      }])
      .await
      .unwrap();

    let err = p.run_once(&creds()).await.unwrap_err();
    assert!(matches!(err, Error::Remote(_)), "got {err:?}");
    assert_eq!(p.provider().count().await.unwrap(), 1);
  }

  #[tokio::test]
  async fn api_error_document_aborts_cycle() {
    let body = r#"<eveapi version="2"><error code="203">Authentication failure.</error></eveapi>"#;
    let server = serve(body.into(), 200).await;
    let p = pipeline(&server).await;

    let err = p.run_once(&creds()).await.unwrap_err();
    assert!(matches!(err, Error::Api { code: 203, .. }), "got {err:?}");
    assert_eq!(p.provider().count().await.unwrap(), 0);
  }
}
