//! Runtime configuration.
//!
//! Read from an optional TOML file, then overridden by `ROSTER_*` environment
//! variables (e.g. `ROSTER_VCODE`, `ROSTER_LISTEN`).

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use roster_feed::Credentials;
use serde::Deserialize;

pub const ENV_PREFIX: &str = "ROSTER";
pub const DEFAULT_FEED_URL: &str = "https://api.eveonline.com/Char/Notifications.xml.aspx";

/// Runtime server configuration, deserialised from `roster.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_listen")]
  pub listen:               String,
  #[serde(default = "default_store_path")]
  pub store_path:           PathBuf,
  /// Directory for monthly log files. Logs go to stdout when unset.
  #[serde(default)]
  pub log_dir:              Option<PathBuf>,
  #[serde(default = "default_feed_url")]
  pub feed_url:             String,
  pub key_id:               i64,
  pub vcode:                String,
  /// Seconds between polls. Should exceed the feed's cache window.
  #[serde(default = "default_poll_interval_secs")]
  pub poll_interval_secs:   u64,
  #[serde(default = "default_request_timeout_secs")]
  pub request_timeout_secs: u64,
}

fn default_listen() -> String { "127.0.0.1:8080".to_owned() }

fn default_store_path() -> PathBuf { PathBuf::from("roster.db") }

fn default_feed_url() -> String { DEFAULT_FEED_URL.to_owned() }

fn default_poll_interval_secs() -> u64 { 21 * 60 }

fn default_request_timeout_secs() -> u64 { 30 }

impl ServerConfig {
  /// Load from `path` (missing file is fine) layered under the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix(ENV_PREFIX))
      .build()?
      .try_deserialize()
  }

  pub fn credentials(&self) -> Credentials {
    Credentials { key_id: self.key_id, vcode: self.vcode.clone() }
  }

  /// Poll period, never shorter than one second.
  pub fn poll_interval(&self) -> Duration { Duration::from_secs(self.poll_interval_secs.max(1)) }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout_secs.max(1))
  }

  /// Store path with a leading `~/` expanded to the user's home directory.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
