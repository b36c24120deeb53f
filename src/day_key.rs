//! Calendar day keys used to join energy, HDD and device-activity series
//!
//! A [`DayKey`] is the integer `year*10000 + month*100 + day` of a local
//! calendar day. Day boundaries are local midnight to local midnight in the
//! household's time zone, so a DST transition day is still one key even
//! though it lasts 23 or 25 hours.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors building a [`DayKey`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("instant {0}ms is outside the supported calendar range")]
    OutOfRange(i64),

    #[error("invalid calendar date {year:04}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },

    #[error("unparseable date: {0:?}")]
    Unparseable(String),

    #[error("year {0} does not fit a YYYYMMDD key")]
    YearOutOfRange(i32),
}

/// Years representable as a four-digit `YYYY` prefix
const KEY_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

/// Canonical local-day key, e.g. `20160301`
///
/// Ordinary integer ordering matches date ordering. Keys derived in
/// different time zones are not comparable without re-derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayKey(i32);

impl DayKey {
    /// Build from calendar fields, validating the date
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, CalendarError> {
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or(CalendarError::InvalidDate { year, month, day })?;
        Self::from_date(date)
    }

    /// Key for a calendar date; years outside 0..=9999 are rejected
    pub fn from_date(date: NaiveDate) -> Result<Self, CalendarError> {
        let year = date.year();
        if !KEY_YEARS.contains(&year) {
            return Err(CalendarError::YearOutOfRange(year));
        }
        Ok(Self(year * 10000 + date.month() as i32 * 100 + date.day() as i32))
    }

    /// Local calendar day of a UTC instant (milliseconds since the epoch) in `tz`
    ///
    /// # Example
    /// ```
    /// use etv::day_key::DayKey;
    ///
    /// // 2016-03-27T23:30:00Z is already 28th March in London (BST).
    /// let key = DayKey::from_instant(1_459_121_400_000, &chrono_tz::Europe::London).unwrap();
    /// assert_eq!(key.value(), 20160328);
    /// ```
    pub fn from_instant<Tz: TimeZone>(utc_millis: i64, tz: &Tz) -> Result<Self, CalendarError> {
        let local = tz
            .timestamp_millis_opt(utc_millis)
            .single()
            .ok_or(CalendarError::OutOfRange(utc_millis))?;
        Self::from_date(local.date_naive()).map_err(|_| CalendarError::OutOfRange(utc_millis))
    }

    /// Local calendar day of an already-resolved instant
    pub fn from_datetime<Src: TimeZone, Tz: TimeZone>(
        instant: &DateTime<Src>,
        tz: &Tz,
    ) -> Result<Self, CalendarError> {
        Self::from_date(instant.with_timezone(tz).date_naive())
    }

    /// Parse a leading `YYYY-MM-DD` or `YYYY/MM/DD` date, ignoring any
    /// trailing time element
    pub fn parse_leading_date(s: &str) -> Result<Self, CalendarError> {
        let bytes = s.as_bytes();
        let is_sep = |b: u8| b == b'-' || b == b'/';
        if bytes.len() < 10 || !is_sep(bytes[4]) || !is_sep(bytes[7]) {
            return Err(CalendarError::Unparseable(s.to_string()));
        }
        let field = |range: std::ops::Range<usize>| -> Result<u32, CalendarError> {
            s.get(range)
                .filter(|f| f.bytes().all(|b| b.is_ascii_digit()))
                .and_then(|f| f.parse().ok())
                .ok_or_else(|| CalendarError::Unparseable(s.to_string()))
        };
        let year = field(0..4)? as i32;
        let month = field(5..7)?;
        let day = field(8..10)?;
        Self::from_ymd(year, month, day)
    }

    /// Raw `YYYYMMDD` integer
    pub fn value(self) -> i32 {
        self.0
    }

    pub fn year(self) -> i32 {
        self.0 / 10000
    }

    pub fn month(self) -> u32 {
        ((self.0 / 100) % 100) as u32
    }

    pub fn day(self) -> u32 {
        (self.0 % 100) as u32
    }

    pub fn to_date(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year(), self.month(), self.day())
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i32> for DayKey {
    type Error = CalendarError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::from_ymd(value / 10000, ((value / 100) % 100) as u32, (value % 100) as u32)
    }
}
