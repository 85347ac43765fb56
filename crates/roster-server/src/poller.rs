//! Background ingestion loop.

use std::time::Duration;

use roster_core::store::StoreProvider;
use roster_feed::{CycleReport, Credentials, Pipeline};
use tokio::time::MissedTickBehavior;

/// Run one cycle every `period`, starting immediately.
///
/// Cycles never overlap: the next tick is awaited only after the previous
/// cycle has finished, and ticks missed meanwhile are not replayed in a
/// burst. Failures are logged and the loop carries on.
pub async fn run<P>(pipeline: Pipeline<P>, credentials: Credentials, period: Duration)
where
  P: StoreProvider,
{
  let mut ticker = tokio::time::interval(period);
  ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

  tracing::info!(period_secs = period.as_secs(), "poller started");
  loop {
    ticker.tick().await;
    run_cycle(&pipeline, &credentials).await;
  }
}

/// Run a single cycle and log its outcome. Returns `None` if it failed.
pub async fn run_cycle<P>(pipeline: &Pipeline<P>, credentials: &Credentials) -> Option<CycleReport>
where
  P: StoreProvider,
{
  // The pipeline has already logged the cause of any failure.
  let report = pipeline.run_once(credentials).await.ok()?;
  tracing::info!(
    fetched = report.fetched,
    tracked = report.tracked,
    skipped = report.skipped,
    stored = report.stored,
    cached_until = ?report.cached_until,
    "ingestion cycle complete"
  );
  Some(report)
}
