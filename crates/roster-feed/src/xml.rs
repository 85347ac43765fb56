//! Notification feed XML decoding.
//!
//! The feed wraps its rows as
//! `<eveapi><result><rowset><row .../></rowset></result></eveapi>`, with each
//! notification's fields carried as attributes on `<row>`. A failed call
//! replaces `<result>` with `<error code="..">message</error>`.
//!
//! Uses `quick-xml`'s pull reader; any malformed input fails the whole
//! document.

use std::fmt::Display;

use chrono::NaiveDateTime;
use quick_xml::{
  Reader,
  events::{BytesStart, Event},
};

use crate::{
  Error, Result,
  record::{FeedPage, NotificationRecord},
};

/// Format of every timestamp in the feed.
pub const FEED_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a feed timestamp (`YYYY-MM-DD HH:MM:SS`, UTC).
pub fn parse_feed_time(s: &str) -> std::result::Result<NaiveDateTime, chrono::ParseError> {
  NaiveDateTime::parse_from_str(s.trim(), FEED_TIME_FORMAT)
}

/// Decode a complete feed response body.
pub fn decode(body: &[u8]) -> Result<FeedPage> {
  let mut reader = Reader::from_reader(body);
  reader.config_mut().trim_text(true);

  let mut path: Vec<Vec<u8>> = Vec::new();
  let mut page = FeedPage::default();
  let mut saw_result = false;
  let mut api_error: Option<(i64, String)> = None;
  let mut buf = Vec::new();

  loop {
    match reader.read_event_into(&mut buf)? {
      Event::Start(ref e) => {
        open_element(e, &path, &mut page, &mut saw_result, &mut api_error)?;
        path.push(e.local_name().as_ref().to_vec());
      }
      Event::Empty(ref e) => {
        open_element(e, &path, &mut page, &mut saw_result, &mut api_error)?;
      }
      Event::Text(ref t) => {
        let text = t.unescape().map_err(decode_err)?;
        match path.last().map(Vec::as_slice) {
          Some(b"cachedUntil") => {
            let at = parse_feed_time(&text)
              .map_err(|e| Error::Decode(format!("bad cachedUntil {text:?}: {e}")))?;
            page.cached_until = Some(at);
          }
          Some(b"error") => {
            if let Some((_, message)) = api_error.as_mut() {
              message.push_str(&text);
            }
          }
          _ => {}
        }
      }
      Event::End(_) => {
        path.pop();
      }
      Event::Eof => break,
      _ => {}
    }
    buf.clear();
  }

  if !path.is_empty() {
    return Err(Error::Decode("unexpected end of document".into()));
  }
  if let Some((code, message)) = api_error {
    return Err(Error::Api { code, message });
  }
  if !saw_result {
    return Err(Error::Decode("document has no <result> element".into()));
  }

  Ok(page)
}

fn open_element(
  e:          &BytesStart<'_>,
  path:       &[Vec<u8>],
  page:       &mut FeedPage,
  saw_result: &mut bool,
  api_error:  &mut Option<(i64, String)>,
) -> Result<()> {
  match e.local_name().as_ref() {
    b"result" => *saw_result = true,
    b"row" if in_rowset(path) => page.records.push(parse_row(e)?),
    b"error" => {
      let code = attr_value(e, b"code")?
        .map(|v| parse_int("code", &v))
        .transpose()?
        .unwrap_or_default();
      *api_error = Some((code, String::new()));
    }
    _ => {}
  }
  Ok(())
}

fn in_rowset(path: &[Vec<u8>]) -> bool {
  matches!(
    path,
    [.., result, rowset] if result.as_slice() == b"result" && rowset.as_slice() == b"rowset"
  )
}

/// Only `notificationID` and `typeID` are required. Other missing attributes
/// take empty defaults; an empty `sentDate` is rejected later, per record.
fn parse_row(e: &BytesStart<'_>) -> Result<NotificationRecord> {
  let mut notification_id = None;
  let mut type_id = None;
  let mut sender_id = 0;
  let mut sender_name = String::new();
  let mut sent_date = String::new();
  let mut read = false;

  for attr in e.attributes() {
    let attr = attr.map_err(decode_err)?;
    let value = attr.unescape_value().map_err(decode_err)?;
    match attr.key.local_name().as_ref() {
      b"notificationID" => notification_id = Some(parse_int("notificationID", &value)?),
      b"typeID" => type_id = Some(parse_int("typeID", &value)?),
      b"senderID" => sender_id = parse_int("senderID", &value)?,
      b"senderName" => sender_name = value.into_owned(),
      b"sentDate" => sent_date = value.into_owned(),
      b"read" => read = parse_int("read", &value)? != 0,
      _ => {}
    }
  }

  Ok(NotificationRecord {
    notification_id: notification_id.ok_or_else(|| missing("notificationID"))?,
    type_id:         type_id.ok_or_else(|| missing("typeID"))?,
    sender_id,
    sender_name,
    sent_date,
    read,
  })
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
  for attr in e.attributes() {
    let attr = attr.map_err(decode_err)?;
    if attr.key.local_name().as_ref() == key {
      return Ok(Some(attr.unescape_value().map_err(decode_err)?.into_owned()));
    }
  }
  Ok(None)
}

fn parse_int(field: &str, value: &str) -> Result<i64> {
  value
    .trim()
    .parse()
    .map_err(|_| Error::Decode(format!("{field}: not an integer: {value:?}")))
}

fn missing(field: &str) -> Error { Error::Decode(format!("row is missing {field}")) }

fn decode_err(e: impl Display) -> Error { Error::Decode(e.to_string()) }

// ─── Tests ────────────────────────────────────────────────────────────────────
