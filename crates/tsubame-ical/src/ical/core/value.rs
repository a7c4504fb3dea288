//! iCalendar property value representation (RFC 5545 §3.3).

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use super::datetime::{DateTime, UtcOffset};
use super::duration::Duration;
use super::rrule::RRule;

/// DATE value (RFC 5545 §3.3.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Date {
    /// Year (e.g. 2026).
    pub year: u16,
    /// Month (1-12).
    pub month: u8,
    /// Day of month (1-31).
    pub day: u8,
}

impl Date {
    /// Converts to a `chrono` date, `None` for impossible dates.
    #[must_use]
    pub fn to_naive(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(i32::from(self.year), u32::from(self.month), u32::from(self.day))
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}{:02}", self.year, self.month, self.day)
    }
}

/// PERIOD value (RFC 5545 §3.3.9): explicit start/end or start/duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Period {
    /// `start/end` form.
    Explicit {
        /// Start of the period.
        start: DateTime,
        /// End of the period (exclusive).
        end: DateTime,
    },
    /// `start/duration` form.
    Duration {
        /// Start of the period.
        start: DateTime,
        /// Length of the period.
        duration: Duration,
    },
}

impl Period {
    /// Returns the start of the period.
    #[must_use]
    pub fn start(&self) -> &DateTime {
        match self {
            Self::Explicit { start, .. } | Self::Duration { start, .. } => start,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit { start, end } => write!(f, "{start}/{end}"),
            Self::Duration { start, duration } => write!(f, "{start}/{duration}"),
        }
    }
}

/// A typed iCalendar property value.
///
/// Properties whose type is not covered by the dispatch table fall back to
/// `Text` with the raw string preserved on the property.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    /// TEXT value, unescaped.
    Text(String),
    /// Comma-separated TEXT list, each element unescaped.
    TextList(Vec<String>),
    /// INTEGER value.
    Integer(i64),
    /// FLOAT value.
    Float(f64),
    /// BOOLEAN value.
    Boolean(bool),
    /// DATE value.
    Date(Date),
    /// Comma-separated DATE list.
    DateList(Vec<Date>),
    /// DATE-TIME value.
    DateTime(DateTime),
    /// Comma-separated DATE-TIME list.
    DateTimeList(Vec<DateTime>),
    /// DURATION value.
    Duration(Duration),
    /// PERIOD value.
    Period(Period),
    /// Comma-separated PERIOD list.
    PeriodList(Vec<Period>),
    /// RECUR value.
    Recur(Box<RRule>),
    /// UTC-OFFSET value.
    UtcOffset(UtcOffset),
}

impl Value {
    /// Returns the text content, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer content, if this is an integer value.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the date-time content, if this is a date-time value.
    #[must_use]
    pub fn as_datetime(&self) -> Option<&DateTime> {
        match self {
            Self::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    /// Returns the date content, if this is a date value.
    #[must_use]
    pub fn as_date(&self) -> Option<Date> {
        match self {
            Self::Date(date) => Some(*date),
            _ => None,
        }
    }

    /// Returns the duration content, if this is a duration value.
    #[must_use]
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Self::Duration(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns the recurrence rule, if this is a RECUR value.
    #[must_use]
    pub fn as_rrule(&self) -> Option<&RRule> {
        match self {
            Self::Recur(rule) => Some(rule),
            _ => None,
        }
    }

    /// Returns the UTC offset, if this is a UTC-OFFSET value.
    #[must_use]
    pub fn as_utc_offset(&self) -> Option<UtcOffset> {
        match self {
            Self::UtcOffset(offset) => Some(*offset),
            _ => None,
        }
    }
}
