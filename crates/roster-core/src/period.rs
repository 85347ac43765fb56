//! Calendar-month periods.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime, Utc};

use crate::{Error, Result};

/// A single calendar month, written `YYYY-MM`.
///
/// Stored as the first day of the month so every constructed value is a
/// valid date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period(NaiveDate);

impl Period {
  pub fn new(year: i32, month: u32) -> Result<Self> {
    if !(0..=9999).contains(&year) {
      return Err(Error::InvalidPeriod(format!("{year}-{month:02}")));
    }
    NaiveDate::from_ymd_opt(year, month, 1)
      .map(Period)
      .ok_or_else(|| Error::InvalidPeriod(format!("{year}-{month:02}")))
  }

  /// The month containing `now`.
  pub fn current(now: DateTime<Utc>) -> Self { Self::containing(now.date_naive()) }

  /// The month containing `date`.
  pub fn containing(date: NaiveDate) -> Self {
    Period(date.with_day(1).unwrap_or(date))
  }

  /// Parse `raw`, falling back to the month containing `now` when it is
  /// empty.
  pub fn parse_or_current(raw: &str, now: DateTime<Utc>) -> Result<Self> {
    let raw = raw.trim();
    if raw.is_empty() {
      Ok(Self::current(now))
    } else {
      raw.parse()
    }
  }

  pub fn year(&self) -> i32 { self.0.year() }

  pub fn month(&self) -> u32 { self.0.month() }

  /// The following calendar month.
  pub fn next(&self) -> Self {
    Period(
      self
        .0
        .checked_add_months(Months::new(1))
        .unwrap_or(NaiveDate::MAX),
    )
  }

  /// Inclusive lower bound of the month's timestamps.
  pub fn start(&self) -> NaiveDateTime { self.0.and_time(chrono::NaiveTime::MIN) }

  /// Exclusive upper bound of the month's timestamps.
  pub fn end(&self) -> NaiveDateTime { self.next().start() }

  pub fn contains(&self, dt: NaiveDateTime) -> bool {
    dt >= self.start() && dt < self.end()
  }
}

impl fmt::Display for Period {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:04}-{:02}", self.year(), self.month())
  }
}

impl FromStr for Period {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let invalid = || Error::InvalidPeriod(s.to_owned());

    let (year, month) = s.split_once('-').ok_or_else(invalid)?;
    if year.len() != 4
      || month.len() != 2
      || !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit())
    {
      return Err(invalid());
    }

    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    Self::new(year, month).map_err(|_| invalid())
  }
}
