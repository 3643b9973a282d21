//! Partial-precision FHIR date, dateTime and time values.
//!
//! FHIR allows dates to be given at reduced precision (`2024`, `2024-01`).
//! A reduced-precision value denotes the whole interval it covers, so every
//! value here can report the instant range it spans:
//!
//! - `2024` covers `[2024-01-01T00:00:00Z, 2025-01-01T00:00:00Z)`
//! - `2024-02` covers `[2024-02-01T00:00:00Z, 2024-03-01T00:00:00Z)`
//! - `2024-02-29T10:15:00Z` covers one second
//!
//! Values without a timezone offset are interpreted as UTC.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValueError};

/// Precision of a date or dateTime literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatePrecision {
    /// Year only (e.g., "2024")
    Year,
    /// Year and month (e.g., "2024-01")
    Month,
    /// Full date (e.g., "2024-01-15")
    Day,
    /// Date and time to seconds (e.g., "2024-01-15T10:30:00Z")
    Second,
    /// Date and time with fractional seconds
    Millisecond,
}

impl fmt::Display for DatePrecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatePrecision::Year => write!(f, "year"),
            DatePrecision::Month => write!(f, "month"),
            DatePrecision::Day => write!(f, "day"),
            DatePrecision::Second => write!(f, "second"),
            DatePrecision::Millisecond => write!(f, "millisecond"),
        }
    }
}

/// A half-open instant interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// First instant covered.
    pub start: DateTime<Utc>,
    /// First instant no longer covered.
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Last millisecond covered by the range.
    pub fn end_inclusive(&self) -> DateTime<Utc> {
        self.end - TimeDelta::milliseconds(1)
    }

    /// Start of the range in epoch milliseconds.
    pub fn start_millis(&self) -> i64 {
        self.start.timestamp_millis()
    }

    /// Inclusive end of the range in epoch milliseconds.
    pub fn end_inclusive_millis(&self) -> i64 {
        self.end_inclusive().timestamp_millis()
    }

    /// Length of the range.
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Orders two ranges by position: `Less` when this range ends before
    /// `other` starts, `Greater` when it starts after `other` ends, and
    /// `Equal` when they overlap.
    pub fn compare_position(&self, other: &TimeRange) -> Ordering {
        if self.end <= other.start {
            Ordering::Less
        } else if self.start >= other.end {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }

    /// Widens the range by `by` on both sides.
    pub fn widen(&self, by: TimeDelta) -> TimeRange {
        TimeRange {
            start: self
                .start
                .checked_sub_signed(by)
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            end: self
                .end
                .checked_add_signed(by)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::default()).and_utc()
}

/// A FHIR `date`: year, year-month or full date.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FhirDate {
    text: String,
    start: NaiveDate,
    precision: DatePrecision,
}

impl FhirDate {
    /// Parses `YYYY`, `YYYY-MM` or `YYYY-MM-DD`.
    pub fn parse(value: &str) -> Result<Self> {
        let text = value.trim();
        let invalid = || ValueError::InvalidTemporal {
            kind: "date",
            value: value.to_string(),
        };

        let parts: Vec<&str> = text.split('-').collect();
        let widths_ok = match parts.as_slice() {
            [y] => y.len() == 4,
            [y, m] => y.len() == 4 && m.len() == 2,
            [y, m, d] => y.len() == 4 && m.len() == 2 && d.len() == 2,
            _ => false,
        };
        if !widths_ok || !parts.iter().all(|p| p.bytes().all(|b| b.is_ascii_digit())) {
            return Err(invalid());
        }

        let year: i32 = parts[0].parse().map_err(|_| invalid())?;
        let month: u32 = match parts.get(1) {
            Some(m) => m.parse().map_err(|_| invalid())?,
            None => 1,
        };
        let day: u32 = match parts.get(2) {
            Some(d) => d.parse().map_err(|_| invalid())?,
            None => 1,
        };
        let start = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)?;

        let precision = match parts.len() {
            1 => DatePrecision::Year,
            2 => DatePrecision::Month,
            _ => DatePrecision::Day,
        };

        Ok(Self {
            text: text.to_string(),
            start,
            precision,
        })
    }

    /// Returns the precision the date was given at.
    pub fn precision(&self) -> DatePrecision {
        self.precision
    }

    /// Returns the first calendar day covered.
    pub fn first_day(&self) -> NaiveDate {
        self.start
    }

    /// Returns the literal as written.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns the interval covered by this date.
    pub fn range(&self) -> TimeRange {
        let next = match self.precision {
            DatePrecision::Year => NaiveDate::from_ymd_opt(self.start.year() + 1, 1, 1),
            DatePrecision::Month => {
                if self.start.month() >= 12 {
                    NaiveDate::from_ymd_opt(self.start.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(self.start.year(), self.start.month() + 1, 1)
                }
            }
            _ => self.start.succ_opt(),
        }
        .unwrap_or(NaiveDate::MAX);

        TimeRange {
            start: midnight_utc(self.start),
            end: midnight_utc(next),
        }
    }
}

impl fmt::Display for FhirDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for FhirDate {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A FHIR `dateTime`: a partial date or a full timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FhirDateTime {
    text: String,
    kind: DateTimeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DateTimeKind {
    Date(FhirDate),
    Instant {
        at: DateTime<Utc>,
        precision: DatePrecision,
    },
}

impl FhirDateTime {
    /// Parses a dateTime literal.
    ///
    /// Accepts every `date` form plus `YYYY-MM-DDThh:mm:ss[.fff][Z|(+|-)hh:mm]`.
    pub fn parse(value: &str) -> Result<Self> {
        let text = value.trim();
        let invalid = || ValueError::InvalidTemporal {
            kind: "dateTime",
            value: value.to_string(),
        };

        let Some((date_part, time_part)) = text.split_once('T') else {
            let date = FhirDate::parse(text).map_err(|_| invalid())?;
            return Ok(Self {
                text: text.to_string(),
                kind: DateTimeKind::Date(date),
            });
        };

        let date = FhirDate::parse(date_part).map_err(|_| invalid())?;
        if date.precision() != DatePrecision::Day {
            return Err(invalid());
        }

        let has_offset =
            time_part.ends_with('Z') || time_part.contains('+') || time_part.contains('-');
        let candidate = if has_offset {
            text.to_string()
        } else {
            format!("{}Z", text)
        };
        let at = DateTime::parse_from_rfc3339(&candidate)
            .map_err(|_| invalid())?
            .with_timezone(&Utc);

        let precision = if time_part.contains('.') {
            DatePrecision::Millisecond
        } else {
            DatePrecision::Second
        };

        Ok(Self {
            text: text.to_string(),
            kind: DateTimeKind::Instant { at, precision },
        })
    }

    /// Returns the precision the value was given at.
    pub fn precision(&self) -> DatePrecision {
        match &self.kind {
            DateTimeKind::Date(date) => date.precision(),
            DateTimeKind::Instant { precision, .. } => *precision,
        }
    }

    /// Returns the literal as written.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns the interval covered by this value.
    pub fn range(&self) -> TimeRange {
        match &self.kind {
            DateTimeKind::Date(date) => date.range(),
            DateTimeKind::Instant { at, precision } => {
                let width = match precision {
                    DatePrecision::Millisecond => TimeDelta::milliseconds(1),
                    _ => TimeDelta::seconds(1),
                };
                TimeRange {
                    start: *at,
                    end: *at + width,
                }
            }
        }
    }
}

impl From<FhirDate> for FhirDateTime {
    fn from(date: FhirDate) -> Self {
        Self {
            text: date.as_str().to_string(),
            kind: DateTimeKind::Date(date),
        }
    }
}

impl fmt::Display for FhirDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for FhirDateTime {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A FHIR `time`: a time of day without date or timezone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FhirTime {
    text: String,
    time: NaiveTime,
}

impl FhirTime {
    /// Parses `hh:mm:ss[.fff]` (or `hh:mm`).
    pub fn parse(value: &str) -> Result<Self> {
        let text = value.trim();
        let time = text
            .parse::<NaiveTime>()
            .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
            .map_err(|_| ValueError::InvalidTemporal {
                kind: "time",
                value: value.to_string(),
            })?;
        Ok(Self {
            text: text.to_string(),
            time,
        })
    }

    /// Returns the time of day.
    pub fn time(&self) -> NaiveTime {
        self.time
    }

    /// Returns the literal as written.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for FhirTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for FhirTime {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_year_precision_range() {
        let date = FhirDate::parse("2024").unwrap();
        assert_eq!(date.precision(), DatePrecision::Year);

        let range = date.range();
        assert_eq!(range.start, utc("2024-01-01T00:00:00Z"));
        assert_eq!(range.end, utc("2025-01-01T00:00:00Z"));
        assert_eq!(range.end_inclusive(), utc("2024-12-31T23:59:59.999Z"));
    }

    #[test]
    fn test_december_month_rolls_over() {
        let range = FhirDate::parse("2023-12").unwrap().range();
        assert_eq!(range.start, utc("2023-12-01T00:00:00Z"));
        assert_eq!(range.end, utc("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_leap_day() {
        let range = FhirDate::parse("2024-02-29").unwrap().range();
        assert_eq!(range.end, utc("2024-03-01T00:00:00Z"));
        assert!(FhirDate::parse("2023-02-29").is_err());
    }

    #[test]
    fn test_invalid_dates() {
        assert!(FhirDate::parse("24").is_err());
        assert!(FhirDate::parse("2024-1").is_err());
        assert!(FhirDate::parse("2024-13").is_err());
        assert!(FhirDate::parse("2024-01-15T10:00:00Z").is_err());
        assert!(FhirDate::parse("abcd").is_err());
    }

    #[test]
    fn test_datetime_without_offset_is_utc() {
        let dt = FhirDateTime::parse("2024-01-15T10:30:00").unwrap();
        assert_eq!(dt.precision(), DatePrecision::Second);
        assert_eq!(dt.range().start, utc("2024-01-15T10:30:00Z"));
        assert_eq!(dt.range().end, utc("2024-01-15T10:30:01Z"));
    }

    #[test]
    fn test_datetime_with_offset() {
        let dt = FhirDateTime::parse("2024-01-15T10:30:00+02:00").unwrap();
        assert_eq!(dt.range().start, utc("2024-01-15T08:30:00Z"));
    }

    #[test]
    fn test_datetime_milliseconds() {
        let dt = FhirDateTime::parse("2024-01-15T10:30:00.250Z").unwrap();
        assert_eq!(dt.precision(), DatePrecision::Millisecond);
        assert_eq!(dt.range().duration(), TimeDelta::milliseconds(1));
    }

    #[test]
    fn test_datetime_partial_date() {
        let dt = FhirDateTime::parse("2024-03").unwrap();
        assert_eq!(dt.precision(), DatePrecision::Month);
        assert_eq!(dt.range(), FhirDate::parse("2024-03").unwrap().range());
        assert!(FhirDateTime::parse("2024-03T10:00:00Z").is_err());
    }

    #[test]
    fn test_time_parsing() {
        let t = FhirTime::parse("14:05:30").unwrap();
        assert_eq!(t.time(), NaiveTime::from_hms_opt(14, 5, 30).unwrap());
        assert!(FhirTime::parse("14:05").is_ok());
        assert!(FhirTime::parse("25:00:00").is_err());
    }

    #[test]
    fn test_widen() {
        let range = FhirDate::parse("2024-01-15").unwrap().range();
        let wide = range.widen(TimeDelta::days(1));
        assert_eq!(wide.start, utc("2024-01-14T00:00:00Z"));
        assert_eq!(wide.end, utc("2024-01-17T00:00:00Z"));
    }
}
