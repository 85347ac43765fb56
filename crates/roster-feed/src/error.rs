//! Error type for `roster-feed`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The request never produced a response (connect, TLS, timeout, body read).
  #[error("feed request failed: {0}")]
  Transport(#[from] reqwest::Error),

  /// The feed answered with a non-success status.
  #[error("feed returned {0}")]
  Remote(reqwest::StatusCode),

  /// The feed answered 200 with an `<error>` document instead of a result.
  #[error("feed error {code}: {message}")]
  Api { code: i64, message: String },

  /// The response body is not a well-formed notification document.
  #[error("feed decode error: {0}")]
  Decode(String),

  /// A single notification carries a `sentDate` that does not parse.
  #[error("notification {notification_id}: bad sentDate {sent_date:?}: {source}")]
  RecordParse {
    notification_id: i64,
    sent_date:       String,
    #[source]
    source:          chrono::ParseError,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// True for failures on the remote side of the fetch.
  pub fn is_remote(&self) -> bool {
    matches!(self, Error::Transport(_) | Error::Remote(_) | Error::Api { .. })
  }
}

impl From<quick_xml::Error> for Error {
  fn from(e: quick_xml::Error) -> Self { Error::Decode(e.to_string()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
