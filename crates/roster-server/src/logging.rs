//! Tracing subscriber setup.

use std::{
  fs::OpenOptions,
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// Defaults to `INFO`, overridable with `RUST_LOG`. With a `log_dir`, output
/// is appended to that month's file instead of stdout.
pub fn init(log_dir: Option<&Path>) -> anyhow::Result<()> {
  let filter = EnvFilter::builder()
    .with_default_directive(LevelFilter::INFO.into())
    .from_env_lossy();

  match log_dir {
    None => tracing_subscriber::fmt().with_env_filter(filter).init(),
    Some(dir) => {
      let path = log_file_path(dir, Utc::now());
      let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {path:?}"))?;

      tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Arc::new(file))
        .init();
    }
  }
  Ok(())
}

/// `{dir}/roster-YYYYMM.log` for the month containing `now`.
pub fn log_file_path(dir: &Path, now: DateTime<Utc>) -> PathBuf {
  dir.join(format!("roster-{}.log", now.format("%Y%m")))
}
