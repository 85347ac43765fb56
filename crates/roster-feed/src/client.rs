//! Async HTTP client for the notification feed.

use std::{fmt, time::Duration};

use reqwest::Client;

use crate::{
  Error, Result,
  record::{FeedPage, NotificationRecord},
  xml,
};

/// API key pair identifying whose notifications are fetched.
#[derive(Clone)]
pub struct Credentials {
  pub key_id: i64,
  pub vcode:  String,
}

impl fmt::Debug for Credentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Credentials")
      .field("key_id", &self.key_id)
      .field("vcode", &"<redacted>")
      .finish()
  }
}

/// Fetches the notification feed.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based. Holds no
/// state between calls apart from its connection pool.
#[derive(Clone)]
pub struct FeedClient {
  client: Client,
  url:    String,
}

impl FeedClient {
  /// Build a client for `url`. Every request is bounded by `timeout`.
  pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self { client, url: url.into() })
  }

  /// `GET {url}?keyid=..&vcode=..` and decode the full response.
  ///
  /// No retries: a failed fetch is reported and the caller tries again on
  /// its next cycle.
  pub async fn fetch_page(&self, credentials: &Credentials) -> Result<FeedPage> {
    let resp = self
      .client
      .get(&self.url)
      .query(&[
        ("keyid", credentials.key_id.to_string()),
        ("vcode", credentials.vcode.clone()),
      ])
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      return Err(Error::Remote(status));
    }

    let body = resp.bytes().await?;
    xml::decode(&body)
  }

  /// Fetch only the notification rows.
  pub async fn fetch(&self, credentials: &Credentials) -> Result<Vec<NotificationRecord>> {
    Ok(self.fetch_page(credentials).await?.records)
  }
}
