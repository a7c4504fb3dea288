//! iCalendar RECUR value type (RFC 5545 §3.3.10).

use std::fmt;

use serde::Serialize;

use super::value::Date;
use crate::ical::core::DateTime;

/// Recurrence frequency (RFC 5545 §3.3.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Frequency {
    /// Every N seconds.
    Secondly,
    /// Every N minutes.
    Minutely,
    /// Every N hours.
    Hourly,
    /// Every N days.
    Daily,
    /// Every N weeks.
    Weekly,
    /// Every N months.
    Monthly,
    /// Every N years.
    Yearly,
}

impl Frequency {
    /// Returns the RFC 5545 name of this frequency.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Secondly => "SECONDLY",
            Self::Minutely => "MINUTELY",
            Self::Hourly => "HOURLY",
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
        }
    }

    /// Parses an RFC 5545 frequency name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SECONDLY" => Some(Self::Secondly),
            "MINUTELY" => Some(Self::Minutely),
            "HOURLY" => Some(Self::Hourly),
            "DAILY" => Some(Self::Daily),
            "WEEKLY" => Some(Self::Weekly),
            "MONTHLY" => Some(Self::Monthly),
            "YEARLY" => Some(Self::Yearly),
            _ => None,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Day of the week (RFC 5545 two-letter codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Weekday {
    /// Sunday (SU).
    Sunday,
    /// Monday (MO).
    Monday,
    /// Tuesday (TU).
    Tuesday,
    /// Wednesday (WE).
    Wednesday,
    /// Thursday (TH).
    Thursday,
    /// Friday (FR).
    Friday,
    /// Saturday (SA).
    Saturday,
}

impl Weekday {
    /// Returns the RFC 5545 two-letter code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sunday => "SU",
            Self::Monday => "MO",
            Self::Tuesday => "TU",
            Self::Wednesday => "WE",
            Self::Thursday => "TH",
            Self::Friday => "FR",
            Self::Saturday => "SA",
        }
    }

    /// Parses an RFC 5545 two-letter weekday code.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SU" => Some(Self::Sunday),
            "MO" => Some(Self::Monday),
            "TU" => Some(Self::Tuesday),
            "WE" => Some(Self::Wednesday),
            "TH" => Some(Self::Thursday),
            "FR" => Some(Self::Friday),
            "SA" => Some(Self::Saturday),
            _ => None,
        }
    }

    /// Converts to the `chrono` weekday.
    #[must_use]
    pub const fn to_chrono(self) -> chrono::Weekday {
        match self {
            Self::Sunday => chrono::Weekday::Sun,
            Self::Monday => chrono::Weekday::Mon,
            Self::Tuesday => chrono::Weekday::Tue,
            Self::Wednesday => chrono::Weekday::Wed,
            Self::Thursday => chrono::Weekday::Thu,
            Self::Friday => chrono::Weekday::Fri,
            Self::Saturday => chrono::Weekday::Sat,
        }
    }

    /// Converts from the `chrono` weekday.
    #[must_use]
    pub const fn from_chrono(weekday: chrono::Weekday) -> Self {
        match weekday {
            chrono::Weekday::Sun => Self::Sunday,
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
        }
    }

    /// Returns days since Sunday (SU = 0 .. SA = 6).
    #[must_use]
    pub const fn days_from_sunday(self) -> u8 {
        match self {
            Self::Sunday => 0,
            Self::Monday => 1,
            Self::Tuesday => 2,
            Self::Wednesday => 3,
            Self::Thursday => 4,
            Self::Friday => 5,
            Self::Saturday => 6,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A BYDAY entry: a weekday with an optional signed ordinal.
///
/// `2TU` means the second Tuesday, `-1SU` the last Sunday, `WE` every
/// Wednesday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekdayNum {
    /// Ordinal within the scope (negative counts from the end).
    pub ordinal: Option<i8>,
    /// The weekday.
    pub weekday: Weekday,
}

impl WeekdayNum {
    /// Every occurrence of `weekday`.
    #[must_use]
    pub const fn every(weekday: Weekday) -> Self {
        Self {
            ordinal: None,
            weekday,
        }
    }

    /// The nth occurrence of `weekday` (negative from the end).
    #[must_use]
    pub const fn nth(ordinal: i8, weekday: Weekday) -> Self {
        Self {
            ordinal: Some(ordinal),
            weekday,
        }
    }
}

impl fmt::Display for WeekdayNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ordinal) = self.ordinal {
            write!(f, "{ordinal}")?;
        }
        write!(f, "{}", self.weekday)
    }
}

/// UNTIL bound of a recurrence rule, date or date-time form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RRuleUntil {
    /// Date-only bound.
    Date(Date),
    /// Date-time bound.
    DateTime(DateTime),
}

impl fmt::Display for RRuleUntil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => write!(f, "{date}"),
            Self::DateTime(dt) => write!(f, "{dt}"),
        }
    }
}

/// Recurrence rule (RFC 5545 §3.3.10).
///
/// `count` and `until` are mutually exclusive; the parser rejects rules
/// carrying both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RRule {
    /// The base frequency (mandatory).
    pub freq: Frequency,
    /// Step multiplier at the base frequency; `None` means 1.
    pub interval: Option<u32>,
    /// Total number of occurrences.
    pub count: Option<u32>,
    /// Exclusive upper bound on occurrences.
    pub until: Option<RRuleUntil>,
    /// Week start for weekly expansion; `None` means Monday.
    pub week_start: Option<Weekday>,
    /// BYSECOND values (0-60).
    pub by_second: Vec<u8>,
    /// BYMINUTE values (0-59).
    pub by_minute: Vec<u8>,
    /// BYHOUR values (0-23).
    pub by_hour: Vec<u8>,
    /// BYDAY entries.
    pub by_day: Vec<WeekdayNum>,
    /// BYMONTHDAY values (±1-31).
    pub by_monthday: Vec<i8>,
    /// BYYEARDAY values (±1-366).
    pub by_yearday: Vec<i16>,
    /// BYWEEKNO values (±1-53).
    pub by_weekno: Vec<i8>,
    /// BYMONTH values (±1-12).
    pub by_month: Vec<i8>,
    /// BYSETPOS values (±1-366).
    pub by_setpos: Vec<i16>,
}

impl RRule {
    /// Creates a bare rule at the given frequency.
    #[must_use]
    pub const fn new(freq: Frequency) -> Self {
        Self {
            freq,
            interval: None,
            count: None,
            until: None,
            week_start: None,
            by_second: Vec::new(),
            by_minute: Vec::new(),
            by_hour: Vec::new(),
            by_day: Vec::new(),
            by_monthday: Vec::new(),
            by_yearday: Vec::new(),
            by_weekno: Vec::new(),
            by_month: Vec::new(),
            by_setpos: Vec::new(),
        }
    }

    /// Sets the interval.
    #[must_use]
    pub const fn with_interval(mut self, interval: u32) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Sets the occurrence count.
    #[must_use]
    pub const fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// Sets the UNTIL bound.
    #[must_use]
    pub fn with_until(mut self, until: RRuleUntil) -> Self {
        self.until = Some(until);
        self
    }

    /// Sets BYDAY entries.
    #[must_use]
    pub fn with_by_day(mut self, by_day: Vec<WeekdayNum>) -> Self {
        self.by_day = by_day;
        self
    }

    /// Sets BYMONTH values.
    #[must_use]
    pub fn with_by_month(mut self, by_month: Vec<i8>) -> Self {
        self.by_month = by_month;
        self
    }

    /// Sets BYMONTHDAY values.
    #[must_use]
    pub fn with_by_monthday(mut self, by_monthday: Vec<i8>) -> Self {
        self.by_monthday = by_monthday;
        self
    }

    /// Returns the effective interval (defaulting to 1).
    #[must_use]
    pub fn effective_interval(&self) -> u32 {
        self.interval.unwrap_or(1).max(1)
    }

    /// Returns whether any BY rule part is present.
    #[must_use]
    pub fn has_by_rule(&self) -> bool {
        !self.by_second.is_empty()
            || !self.by_minute.is_empty()
            || !self.by_hour.is_empty()
            || !self.by_day.is_empty()
            || !self.by_monthday.is_empty()
            || !self.by_yearday.is_empty()
            || !self.by_weekno.is_empty()
            || !self.by_month.is_empty()
    }
}

fn join<T: fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

impl fmt::Display for RRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = vec![format!("FREQ={}", self.freq)];
        if let Some(interval) = self.interval {
            parts.push(format!("INTERVAL={interval}"));
        }
        if let Some(count) = self.count {
            parts.push(format!("COUNT={count}"));
        }
        if let Some(until) = &self.until {
            parts.push(format!("UNTIL={until}"));
        }
        if !self.by_month.is_empty() {
            parts.push(format!("BYMONTH={}", join(&self.by_month)));
        }
        if !self.by_weekno.is_empty() {
            parts.push(format!("BYWEEKNO={}", join(&self.by_weekno)));
        }
        if !self.by_yearday.is_empty() {
            parts.push(format!("BYYEARDAY={}", join(&self.by_yearday)));
        }
        if !self.by_monthday.is_empty() {
            parts.push(format!("BYMONTHDAY={}", join(&self.by_monthday)));
        }
        if !self.by_day.is_empty() {
            parts.push(format!("BYDAY={}", join(&self.by_day)));
        }
        if !self.by_hour.is_empty() {
            parts.push(format!("BYHOUR={}", join(&self.by_hour)));
        }
        if !self.by_minute.is_empty() {
            parts.push(format!("BYMINUTE={}", join(&self.by_minute)));
        }
        if !self.by_second.is_empty() {
            parts.push(format!("BYSECOND={}", join(&self.by_second)));
        }
        if !self.by_setpos.is_empty() {
            parts.push(format!("BYSETPOS={}", join(&self.by_setpos)));
        }
        if let Some(week_start) = self.week_start {
            parts.push(format!("WKST={week_start}"));
        }
        f.write_str(&parts.join(";"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_round_trip() {
        for freq in [
            Frequency::Secondly,
            Frequency::Minutely,
            Frequency::Hourly,
            Frequency::Daily,
            Frequency::Weekly,
            Frequency::Monthly,
            Frequency::Yearly,
        ] {
            assert_eq!(Frequency::parse(freq.as_str()), Some(freq));
        }
        assert_eq!(Frequency::parse("FORTNIGHTLY"), None);
    }

    #[test]
    fn weekday_num_display() {
        assert_eq!(WeekdayNum::every(Weekday::Wednesday).to_string(), "WE");
        assert_eq!(WeekdayNum::nth(-1, Weekday::Sunday).to_string(), "-1SU");
        assert_eq!(WeekdayNum::nth(2, Weekday::Tuesday).to_string(), "2TU");
    }

    #[test]
    fn rrule_display() {
        let rule = RRule::new(Frequency::Yearly)
            .with_by_month(vec![3])
            .with_by_day(vec![WeekdayNum::nth(-1, Weekday::Sunday)])
            .with_count(5);
        assert_eq!(rule.to_string(), "FREQ=YEARLY;COUNT=5;BYMONTH=3;BYDAY=-1SU");
    }

    #[test]
    fn effective_interval_defaults_to_one() {
        assert_eq!(RRule::new(Frequency::Daily).effective_interval(), 1);
        assert_eq!(
            RRule::new(Frequency::Daily)
                .with_interval(4)
                .effective_interval(),
            4
        );
    }
}
