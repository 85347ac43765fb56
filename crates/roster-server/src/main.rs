//! roster server binary.
//!
//! Reads `roster.toml` (or the path given with `--config`), starts the
//! background feed poller and serves monthly join/leave statistics over
//! HTTP.
//!
//! # One-shot ingestion
//!
//! ```
//! cargo run -p roster-server -- --once
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use roster_core::store::{EventStore, StoreProvider};
use roster_feed::{FeedClient, Pipeline};
use roster_server::{AppState, ServerConfig, logging, poller};
use roster_store_sqlite::SqliteProvider;
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(author, version, about = "Corporation member join/leave tracker")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "roster.toml")]
  config: PathBuf,

  /// Run a single ingestion cycle and exit.
  #[arg(long)]
  once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();

  let cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load config from {:?}", cli.config))?;

  logging::init(cfg.log_dir.as_deref())?;

  let provider = SqliteProvider::new(cfg.resolved_store_path());

  // A store that cannot be prepared now is logged, not fatal: every later
  // operation acquires its own handle and reports its own failure.
  match provider.acquire().await {
    Ok(store) => {
      if let Err(e) = store.ensure_schema().await {
        tracing::error!(error = %e, "failed to create schema");
      }
    }
    Err(e) => tracing::error!(error = %e, "failed to open store"),
  }

  let client = FeedClient::new(&cfg.feed_url, cfg.request_timeout())
    .context("failed to build feed client")?;
  let pipeline = Pipeline::new(client, provider.clone());
  let credentials = cfg.credentials();

  if cli.once {
    let report = pipeline
      .run_once(&credentials)
      .await
      .context("ingestion cycle failed")?;
    println!(
      "fetched {} notifications, stored {} events ({} skipped)",
      report.fetched, report.stored, report.skipped
    );
    return Ok(());
  }

  tokio::spawn(poller::run(pipeline, credentials, cfg.poll_interval()));

  let app = roster_server::router(AppState::new(provider));

  tracing::info!("Listening on http://{}", cfg.listen);
  let listener = TcpListener::bind(&cfg.listen)
    .await
    .with_context(|| format!("failed to bind {}", cfg.listen))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
