//! Value type parsers for iCalendar (RFC 5545 §3.3).
//!
//! Error sources are intentionally discarded during parsing (`map_err_ignore`);
//! the position-carrying [`ParseError`] is the error surface here.
#![expect(
    clippy::map_err_ignore,
    reason = "Value parsers intentionally discard error sources, the positional ParseError is the error surface"
)]

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::ical::core::{
    Date, DateTime, DateTimeForm, Duration, Frequency, Period, RRule, RRuleUntil, Time, UtcOffset,
    Weekday, WeekdayNum,
};

/// Parses a DATE value (RFC 5545 §3.3.4), e.g. `19970714`.
///
/// The date must exist on the calendar; `20230229` is rejected.
///
/// ## Errors
/// Returns an error if the string is not a valid 8-digit calendar date.
pub fn parse_date(s: &str, line: usize, col: usize) -> ParseResult<Date> {
    let err = || ParseError::new(ParseErrorKind::InvalidDate, line, col).with_context(format!("'{s}'"));

    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(err());
    }
    let year = s[0..4].parse::<u16>().map_err(|_| err())?;
    let month = s[4..6].parse::<u8>().map_err(|_| err())?;
    let day = s[6..8].parse::<u8>().map_err(|_| err())?;

    let date = Date { year, month, day };
    if date.to_naive().is_none() {
        return Err(err());
    }
    Ok(date)
}

/// Parses a TIME value (RFC 5545 §3.3.12), e.g. `133000` or `133000Z`.
///
/// ## Errors
/// Returns an error if the string is not a valid 6-digit time. Second 60 is
/// accepted for leap seconds.
pub fn parse_time(s: &str, line: usize, col: usize) -> ParseResult<Time> {
    let err = || ParseError::new(ParseErrorKind::InvalidTime, line, col).with_context(format!("'{s}'"));

    let (time_str, is_utc) = match s.strip_suffix('Z') {
        Some(stripped) => (stripped, true),
        None => (s, false),
    };
    if time_str.len() != 6 || !time_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(err());
    }
    let hour = time_str[0..2].parse::<u8>().map_err(|_| err())?;
    let minute = time_str[2..4].parse::<u8>().map_err(|_| err())?;
    let second = time_str[4..6].parse::<u8>().map_err(|_| err())?;

    if hour > 23 || minute > 59 || second > 60 {
        return Err(err());
    }
    Ok(Time {
        hour,
        minute,
        second,
        is_utc,
    })
}

/// Parses a DATE-TIME value (RFC 5545 §3.3.5), e.g. `19980118T230000Z`.
///
/// The form is derived from the `Z` suffix and the `TZID` parameter; the
/// two are mutually exclusive.
///
/// ## Errors
/// Returns an error for a malformed date or time part, or when a UTC value
/// carries a TZID.
pub fn parse_datetime(s: &str, tzid: Option<&str>, line: usize, col: usize) -> ParseResult<DateTime> {
    let Some((date_part, time_part)) = s.split_once('T') else {
        return Err(ParseError::new(ParseErrorKind::InvalidDateTime, line, col)
            .with_context(format!("'{s}' has no 'T' separator")));
    };
    let date = parse_date(date_part, line, col)?;
    let time = parse_time(time_part, line, col)?;

    let form = match (time.is_utc, tzid) {
        (true, None) => DateTimeForm::Utc,
        (true, Some(_)) => {
            return Err(ParseError::new(ParseErrorKind::InvalidDateTime, line, col)
                .with_context("'Z' suffix cannot be combined with a TZID parameter"));
        }
        (false, Some(tzid)) => DateTimeForm::Zoned {
            tzid: tzid.to_string(),
        },
        (false, None) => DateTimeForm::Floating,
    };

    Ok(DateTime {
        year: date.year,
        month: date.month,
        day: date.day,
        hour: time.hour,
        minute: time.minute,
        second: time.second,
        form,
    })
}

/// Parses a UTC-OFFSET value (RFC 5545 §3.3.14): `±HHMM` or `±HHMMSS`.
///
/// ## Errors
/// Returns an error for a missing sign, a wrong digit count, out-of-range
/// minutes/seconds, or the forbidden `-0000`.
pub fn parse_utc_offset(s: &str, line: usize, col: usize) -> ParseResult<UtcOffset> {
    let err =
        || ParseError::new(ParseErrorKind::InvalidUtcOffset, line, col).with_context(format!("'{s}'"));

    let (sign, rest) = match s.as_bytes().first() {
        Some(b'+') => (1, &s[1..]),
        Some(b'-') => (-1, &s[1..]),
        _ => return Err(err()),
    };
    if (rest.len() != 4 && rest.len() != 6) || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return Err(err());
    }
    let hours = rest[0..2].parse::<i32>().map_err(|_| err())?;
    let minutes = rest[2..4].parse::<i32>().map_err(|_| err())?;
    let seconds = if rest.len() == 6 {
        rest[4..6].parse::<i32>().map_err(|_| err())?
    } else {
        0
    };
    if minutes > 59 || seconds > 59 {
        return Err(err());
    }
    let total = hours * 3600 + minutes * 60 + seconds;
    if sign < 0 && total == 0 {
        // RFC 5545 forbids "-0000".
        return Err(err());
    }
    Ok(UtcOffset::from_seconds(sign * total))
}

/// Parses a DURATION value (RFC 5545 §3.3.6), e.g. `P1DT2H30M`, `-PT15M`.
///
/// A decimal fraction (`.` or `,`) is accepted on the last component and is
/// folded into whole seconds. A bare `P` with no components is rejected.
///
/// ## Errors
/// Returns an error for a malformed duration string.
pub fn parse_duration(s: &str, line: usize, col: usize) -> ParseResult<Duration> {
    let err =
        || ParseError::new(ParseErrorKind::InvalidDuration, line, col).with_context(format!("'{s}'"));

    let (negative, rest) = match s.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let rest = rest.strip_prefix(['P', 'p']).ok_or_else(err)?;

    let mut duration = Duration {
        negative,
        ..Duration::zero()
    };
    let mut in_time = false;
    let mut saw_component = false;
    let mut saw_fraction = false;
    let mut chars = rest.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c == 'T' || c == 't' {
            in_time = true;
            chars.next();
            continue;
        }
        if saw_fraction {
            // Only the last component may carry a fraction.
            return Err(err());
        }

        let mut number = String::new();
        while let Some(&d) = chars.peek() {
            if d.is_ascii_digit() {
                number.push(d);
            } else if d == '.' || d == ',' {
                number.push('.');
            } else {
                break;
            }
            chars.next();
        }
        if number.is_empty() {
            return Err(err());
        }
        let designator = chars.next().ok_or_else(err)?.to_ascii_uppercase();

        let (int_part, frac_part) = number
            .split_once('.')
            .map_or((number.as_str(), ""), |(int, frac)| (int, frac));
        let whole: u32 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| err())?
        };

        let unit_seconds: u64 = match (designator, in_time) {
            ('W', false) => 7 * 86_400,
            ('D', false) => 86_400,
            ('H', true) => 3600,
            ('M', true) => 60,
            ('S', true) => 1,
            _ => return Err(err()),
        };

        match designator {
            'W' => duration.weeks = whole,
            'D' => duration.days = whole,
            'H' => duration.hours = whole,
            'M' => duration.minutes = whole,
            'S' => duration.seconds = whole,
            _ => return Err(err()),
        }
        saw_component = true;

        if !frac_part.is_empty() {
            saw_fraction = true;
            let digits = &frac_part[..frac_part.len().min(9)];
            if !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(err());
            }
            let numerator: u64 = digits.parse().map_err(|_| err())?;
            let scale = 10u64.pow(u32::try_from(digits.len()).unwrap_or(9));
            let extra = (numerator * unit_seconds + scale / 2) / scale;
            duration.seconds = duration
                .seconds
                .checked_add(u32::try_from(extra).map_err(|_| err())?)
                .ok_or_else(err)?;
        }
    }

    if !saw_component {
        return Err(err());
    }
    Ok(duration)
}

/// Parses a PERIOD value (RFC 5545 §3.3.9): `start/end` or `start/duration`.
///
/// ## Errors
/// Returns an error if either side is malformed or the `/` is missing.
pub fn parse_period(s: &str, tzid: Option<&str>, line: usize, col: usize) -> ParseResult<Period> {
    let Some((start_str, rest)) = s.split_once('/') else {
        return Err(ParseError::new(ParseErrorKind::InvalidPeriod, line, col)
            .with_context(format!("'{s}' has no '/' separator")));
    };
    let start = parse_datetime(start_str, tzid, line, col)?;

    if rest.starts_with(['P', 'p', '+', '-']) {
        let duration = parse_duration(rest, line, col)?;
        Ok(Period::Duration { start, duration })
    } else {
        let end = parse_datetime(rest, tzid, line, col)?;
        Ok(Period::Explicit { start, end })
    }
}

/// Parses an INTEGER value (RFC 5545 §3.3.8).
///
/// ## Errors
/// Returns an error if the string is not a signed decimal integer.
pub fn parse_integer(s: &str, line: usize, col: usize) -> ParseResult<i64> {
    s.parse::<i64>().map_err(|_| {
        ParseError::new(ParseErrorKind::InvalidInteger, line, col).with_context(format!("'{s}'"))
    })
}

/// Parses a FLOAT value (RFC 5545 §3.3.7).
///
/// ## Errors
/// Returns an error if the string is not a decimal number.
pub fn parse_float(s: &str, line: usize, col: usize) -> ParseResult<f64> {
    s.parse::<f64>().map_err(|_| {
        ParseError::new(ParseErrorKind::InvalidFloat, line, col).with_context(format!("'{s}'"))
    })
}

/// Parses a BOOLEAN value (RFC 5545 §3.3.2): `TRUE` or `FALSE`.
///
/// ## Errors
/// Returns an error for anything else.
pub fn parse_boolean(s: &str, line: usize, col: usize) -> ParseResult<bool> {
    match s.to_ascii_uppercase().as_str() {
        "TRUE" => Ok(true),
        "FALSE" => Ok(false),
        _ => Err(ParseError::new(ParseErrorKind::InvalidBoolean, line, col)
            .with_context(format!("'{s}'"))),
    }
}

/// Unescapes a TEXT value (RFC 5545 §3.3.11).
#[must_use]
pub fn unescape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(escaped @ ('\\' | ',' | ';')) => out.push(escaped),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Splits a TEXT list on unescaped commas. Commas inside double-quoted
/// segments are literal, and `\"` does not toggle the quote state.
pub(crate) fn split_text_list(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    let mut quoted = false;
    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            quoted = !quoted;
        } else if c == ',' && !quoted {
            parts.push(&s[start..i]);
            start = i + 1;
        }
    }
    parts.push(&s[start..]);
    parts
}

fn recur_err(line: usize, col: usize, context: String) -> ParseError {
    ParseError::new(ParseErrorKind::InvalidRecur, line, col).with_context(context)
}

fn parse_u8_list(
    value: &str,
    max: u8,
    part: &'static str,
    line: usize,
    col: usize,
) -> ParseResult<Vec<u8>> {
    value
        .split(',')
        .map(|v| {
            let n: u8 = v
                .parse()
                .map_err(|_| recur_err(line, col, format!("invalid {part} value '{v}'")))?;
            if n > max {
                return Err(
                    ParseError::new(ParseErrorKind::RecurValueOutOfRange, line, col)
                        .with_context(format!("{part} value {n} out of range 0..={max}")),
                );
            }
            Ok(n)
        })
        .collect()
}

fn parse_signed_list<T: TryFrom<i64>>(
    value: &str,
    max: i64,
    part: &'static str,
    line: usize,
    col: usize,
) -> ParseResult<Vec<T>> {
    value
        .split(',')
        .map(|v| {
            let n: i64 = v
                .parse()
                .map_err(|_| recur_err(line, col, format!("invalid {part} value '{v}'")))?;
            if n == 0 || n.abs() > max {
                return Err(
                    ParseError::new(ParseErrorKind::RecurValueOutOfRange, line, col)
                        .with_context(format!("{part} value {n} out of range \u{b1}1..={max}")),
                );
            }
            T::try_from(n).map_err(|_| {
                ParseError::new(ParseErrorKind::RecurValueOutOfRange, line, col)
                    .with_context(format!("{part} value {n} out of range"))
            })
        })
        .collect()
}

fn parse_byday(value: &str, line: usize, col: usize) -> ParseResult<Vec<WeekdayNum>> {
    value
        .split(',')
        .map(|entry| {
            if entry.len() < 2 || !entry.is_char_boundary(entry.len() - 2) {
                return Err(ParseError::new(ParseErrorKind::InvalidWeekday, line, col)
                    .with_context(format!("'{entry}'")));
            }
            let (ordinal_str, day_str) = entry.split_at(entry.len() - 2);
            let weekday = Weekday::parse(&day_str.to_ascii_uppercase()).ok_or_else(|| {
                ParseError::new(ParseErrorKind::InvalidWeekday, line, col)
                    .with_context(format!("'{day_str}'"))
            })?;
            let ordinal = if ordinal_str.is_empty() {
                None
            } else {
                let n: i8 = ordinal_str
                    .parse()
                    .map_err(|_| recur_err(line, col, format!("invalid BYDAY ordinal '{ordinal_str}'")))?;
                if n == 0 || !(-53..=53).contains(&n) {
                    return Err(
                        ParseError::new(ParseErrorKind::RecurValueOutOfRange, line, col)
                            .with_context(format!("BYDAY ordinal {n} out of range \u{b1}1..=53")),
                    );
                }
                Some(n)
            };
            Ok(WeekdayNum { ordinal, weekday })
        })
        .collect()
}

/// Parses a RECUR value (RFC 5545 §3.3.10).
///
/// Enforces the documented grammar: FREQ is mandatory, INTERVAL must be
/// positive, COUNT and UNTIL are mutually exclusive, every BYxxx part is
/// range-checked, and BYSETPOS requires at least one other BY part.
///
/// ## Errors
/// Returns an error describing the offending rule part.
#[expect(
    clippy::too_many_lines,
    reason = "one arm per RECUR rule part keeps the grammar in one place"
)]
pub fn parse_rrule(s: &str, line: usize, col: usize) -> ParseResult<RRule> {
    let mut freq: Option<Frequency> = None;
    let mut interval = None;
    let mut count: Option<u32> = None;
    let mut until: Option<RRuleUntil> = None;
    let mut week_start = None;
    let mut by_second = Vec::new();
    let mut by_minute = Vec::new();
    let mut by_hour = Vec::new();
    let mut by_day = Vec::new();
    let mut by_monthday = Vec::new();
    let mut by_yearday = Vec::new();
    let mut by_weekno = Vec::new();
    let mut by_month = Vec::new();
    let mut by_setpos = Vec::new();

    for part in s.split(';') {
        let Some((key, value)) = part.split_once('=') else {
            return Err(recur_err(line, col, format!("rule part '{part}' has no '='")));
        };
        match key.to_ascii_uppercase().as_str() {
            "FREQ" => {
                freq = Some(Frequency::parse(&value.to_ascii_uppercase()).ok_or_else(|| {
                    ParseError::new(ParseErrorKind::InvalidFrequency, line, col)
                        .with_context(format!("'{value}'"))
                })?);
            }
            "INTERVAL" => {
                let v: u32 = value
                    .parse()
                    .map_err(|_| recur_err(line, col, format!("invalid INTERVAL '{value}'")))?;
                if v == 0 {
                    return Err(
                        ParseError::new(ParseErrorKind::RecurValueOutOfRange, line, col)
                            .with_context("INTERVAL must be positive"),
                    );
                }
                interval = Some(v);
            }
            "COUNT" => {
                if until.is_some() {
                    return Err(ParseError::new(ParseErrorKind::UntilCountConflict, line, col));
                }
                let v: u32 = value
                    .parse()
                    .map_err(|_| recur_err(line, col, format!("invalid COUNT '{value}'")))?;
                if v == 0 {
                    return Err(
                        ParseError::new(ParseErrorKind::RecurValueOutOfRange, line, col)
                            .with_context("COUNT must be positive"),
                    );
                }
                count = Some(v);
            }
            "UNTIL" => {
                if count.is_some() {
                    return Err(ParseError::new(ParseErrorKind::UntilCountConflict, line, col));
                }
                until = Some(if value.contains('T') {
                    RRuleUntil::DateTime(parse_datetime(value, None, line, col)?)
                } else {
                    RRuleUntil::Date(parse_date(value, line, col)?)
                });
            }
            "WKST" => {
                week_start = Some(Weekday::parse(&value.to_ascii_uppercase()).ok_or_else(|| {
                    ParseError::new(ParseErrorKind::InvalidWeekday, line, col)
                        .with_context(format!("'{value}'"))
                })?);
            }
            "BYSECOND" => by_second = parse_u8_list(value, 60, "BYSECOND", line, col)?,
            "BYMINUTE" => by_minute = parse_u8_list(value, 59, "BYMINUTE", line, col)?,
            "BYHOUR" => by_hour = parse_u8_list(value, 23, "BYHOUR", line, col)?,
            "BYDAY" => by_day = parse_byday(value, line, col)?,
            "BYMONTHDAY" => by_monthday = parse_signed_list(value, 31, "BYMONTHDAY", line, col)?,
            "BYYEARDAY" => by_yearday = parse_signed_list(value, 366, "BYYEARDAY", line, col)?,
            "BYWEEKNO" => by_weekno = parse_signed_list(value, 53, "BYWEEKNO", line, col)?,
            "BYMONTH" => by_month = parse_signed_list(value, 12, "BYMONTH", line, col)?,
            "BYSETPOS" => by_setpos = parse_signed_list(value, 366, "BYSETPOS", line, col)?,
            other => {
                return Err(recur_err(line, col, format!("unknown rule part '{other}'")));
            }
        }
    }

    let Some(freq) = freq else {
        return Err(ParseError::new(ParseErrorKind::MissingFrequency, line, col));
    };

    let rule = RRule {
        freq,
        interval,
        count,
        until,
        week_start,
        by_second,
        by_minute,
        by_hour,
        by_day,
        by_monthday,
        by_yearday,
        by_weekno,
        by_month,
        by_setpos,
    };
    if !rule.by_setpos.is_empty() && !rule.has_by_rule() {
        return Err(recur_err(
            line,
            col,
            "BYSETPOS requires at least one other BY rule part".to_string(),
        ));
    }
    Ok(rule)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_valid() {
        let date = parse_date("19970714", 1, 0).unwrap();
        assert_eq!((date.year, date.month, date.day), (1997, 7, 14));
    }

    #[test]
    fn date_rejects_impossible_days() {
        assert!(parse_date("20230229", 1, 0).is_err());
        assert!(parse_date("20240229", 1, 0).is_ok());
        assert!(parse_date("20231301", 1, 0).is_err());
        assert!(parse_date("2023-01", 1, 0).is_err());
    }

    #[test]
    fn time_with_leap_second() {
        let time = parse_time("235960Z", 1, 0).unwrap();
        assert_eq!(time.second, 60);
        assert!(time.is_utc);
        assert!(parse_time("236000", 1, 0).is_err());
    }

    #[test]
    fn datetime_forms() {
        let dt = parse_datetime("19980119T070000Z", None, 1, 0).unwrap();
        assert!(dt.is_utc());

        let dt = parse_datetime("19980118T230000", None, 1, 0).unwrap();
        assert!(dt.is_floating());

        let dt = parse_datetime("19980119T020000", Some("America/New_York"), 1, 0).unwrap();
        assert_eq!(dt.tzid(), Some("America/New_York"));

        assert!(parse_datetime("19980119T070000Z", Some("America/New_York"), 1, 0).is_err());
        assert!(parse_datetime("19980119", None, 1, 0).is_err());
    }

    #[test]
    fn utc_offset_round_trip() {
        for text in ["+0000", "+0800", "-1234", "+123456"] {
            let offset = parse_utc_offset(text, 1, 0).unwrap();
            assert_eq!(offset.to_string(), text, "round trip of {text}");
        }
        assert_eq!(parse_utc_offset("+123456", 1, 0).unwrap().as_seconds(), 45_296);
    }

    #[test]
    fn utc_offset_rejects_malformed() {
        assert!(parse_utc_offset("0800", 1, 0).is_err());
        assert!(parse_utc_offset("+08", 1, 0).is_err());
        assert!(parse_utc_offset("+0860", 1, 0).is_err());
        assert!(parse_utc_offset("-0000", 1, 0).is_err());
    }

    #[test]
    fn duration_round_trip() {
        for text in ["PT0S", "P1W", "P1DT5H30M", "-P1DT5H30M", "PT15M"] {
            let duration = parse_duration(text, 1, 0).unwrap();
            assert_eq!(duration.to_string(), text, "round trip of {text}");
        }
    }

    #[test]
    fn duration_fractional_component() {
        let duration = parse_duration("PT0.5H", 1, 0).unwrap();
        assert_eq!(duration.as_seconds(), 1800);

        let duration = parse_duration("PT1,5M", 1, 0).unwrap();
        assert_eq!(duration.as_seconds(), 90);
    }

    #[test]
    fn duration_rejects_malformed() {
        assert!(parse_duration("P", 1, 0).is_err());
        assert!(parse_duration("PT", 1, 0).is_err());
        assert!(parse_duration("P1X", 1, 0).is_err());
        assert!(parse_duration("1D", 1, 0).is_err());
        // Fraction only on the last component.
        assert!(parse_duration("PT0.5H30M", 1, 0).is_err());
    }

    #[test]
    fn period_forms() {
        let period = parse_period("19970101T180000Z/19970102T070000Z", None, 1, 0).unwrap();
        assert!(matches!(period, Period::Explicit { .. }));

        let period = parse_period("19970101T180000Z/PT5H30M", None, 1, 0).unwrap();
        assert!(matches!(period, Period::Duration { .. }));

        assert!(parse_period("19970101T180000Z", None, 1, 0).is_err());
    }

    #[test]
    fn simple_scalars() {
        assert_eq!(parse_integer("-42", 1, 0).unwrap(), -42);
        assert!(parse_integer("4.2", 1, 0).is_err());
        assert!((parse_float("1.333", 1, 0).unwrap() - 1.333).abs() < f64::EPSILON);
        assert!(parse_boolean("TRUE", 1, 0).unwrap());
        assert!(!parse_boolean("false", 1, 0).unwrap());
        assert!(parse_boolean("YES", 1, 0).is_err());
    }

    #[test]
    fn text_unescaping() {
        assert_eq!(unescape_text("a\\nb"), "a\nb");
        assert_eq!(unescape_text("a\\,b\\;c\\\\d"), "a,b;c\\d");
        assert_eq!(unescape_text("plain"), "plain");
    }

    #[test]
    fn text_list_splitting() {
        assert_eq!(split_text_list("a,b,c"), vec!["a", "b", "c"]);
        assert_eq!(split_text_list("a\\,b,c"), vec!["a\\,b", "c"]);
        assert_eq!(
            split_text_list("\"Doe, John\",plain"),
            vec!["\"Doe, John\"", "plain"]
        );
        assert_eq!(
            split_text_list("a\\\"b,c"),
            vec!["a\\\"b", "c"]
        );
    }

    #[test]
    fn rrule_full_grammar() {
        let rule = parse_rrule(
            "FREQ=YEARLY;INTERVAL=2;BYMONTH=3;BYDAY=-1SU;WKST=SU",
            1,
            0,
        )
        .unwrap();
        assert_eq!(rule.freq, Frequency::Yearly);
        assert_eq!(rule.interval, Some(2));
        assert_eq!(rule.by_month, vec![3]);
        assert_eq!(rule.by_day, vec![WeekdayNum::nth(-1, Weekday::Sunday)]);
        assert_eq!(rule.week_start, Some(Weekday::Sunday));
    }

    #[test]
    fn rrule_until_forms() {
        let rule = parse_rrule("FREQ=DAILY;UNTIL=20260401", 1, 0).unwrap();
        assert!(matches!(rule.until, Some(RRuleUntil::Date(_))));

        let rule = parse_rrule("FREQ=DAILY;UNTIL=20260401T090000Z", 1, 0).unwrap();
        assert!(matches!(rule.until, Some(RRuleUntil::DateTime(_))));
    }

    #[test]
    fn rrule_requires_freq() {
        let err = parse_rrule("COUNT=10", 1, 0).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingFrequency);
    }

    #[test]
    fn rrule_count_until_conflict() {
        let err = parse_rrule("FREQ=DAILY;COUNT=10;UNTIL=20260401", 1, 0).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UntilCountConflict);
        let err = parse_rrule("FREQ=DAILY;UNTIL=20260401;COUNT=10", 1, 0).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UntilCountConflict);
    }

    #[test]
    fn rrule_range_validation() {
        for bad in [
            "FREQ=YEARLY;BYMONTH=13",
            "FREQ=YEARLY;BYMONTH=0",
            "FREQ=MONTHLY;BYMONTHDAY=32",
            "FREQ=YEARLY;BYWEEKNO=54",
            "FREQ=DAILY;BYHOUR=25",
            "FREQ=DAILY;BYMINUTE=60",
            "FREQ=DAILY;BYSECOND=61",
            "FREQ=YEARLY;BYYEARDAY=367",
            "FREQ=DAILY;INTERVAL=0",
            "FREQ=DAILY;COUNT=0",
            "FREQ=MONTHLY;BYDAY=0MO",
        ] {
            let err = parse_rrule(bad, 1, 0).unwrap_err();
            assert_eq!(
                err.kind,
                ParseErrorKind::RecurValueOutOfRange,
                "expected range error for {bad}"
            );
        }
        assert!(parse_rrule("FREQ=MONTHLY;BYMONTHDAY=-31", 1, 0).is_ok());
        assert!(parse_rrule("FREQ=DAILY;BYSECOND=60", 1, 0).is_ok());
    }

    #[test]
    fn rrule_setpos_needs_other_by_part() {
        assert!(parse_rrule("FREQ=MONTHLY;BYSETPOS=1", 1, 0).is_err());
        assert!(parse_rrule("FREQ=MONTHLY;BYDAY=MO;BYSETPOS=-1", 1, 0).is_ok());
    }

    #[test]
    fn rrule_rejects_unknown_part() {
        let err = parse_rrule("FREQ=DAILY;BYGALAXY=1", 1, 0).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidRecur);
    }
}
