//! End-instant derivation for VEVENT components.

use chrono::{Datelike, Duration as ChronoDuration, NaiveDateTime, Timelike};
use thiserror::Error;

use crate::ical::core::{
    Component, DateTime, DateTimeForm, Property, Value, property_names as names,
};

/// Failure to derive an event's end instant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventEndError {
    /// The event carries a DURATION but no DTSTART to add it to.
    #[error("VEVENT is missing DTSTART")]
    MissingStart,
    /// The event carries neither DTEND nor DURATION.
    #[error("VEVENT carries neither DTEND nor DURATION")]
    MissingEnd,
    /// The arithmetic left the representable date range.
    #[error("'{0}' has no representable end instant")]
    OutOfRange(String),
}

/// Derives the end instant of a VEVENT.
///
/// DTEND wins when present (a DATE-valued DTEND becomes midnight at the
/// start of that day); otherwise DURATION is added to DTSTART and the
/// result keeps the start's form (floating, UTC, or zoned).
///
/// ## Errors
/// Fails when the event has neither DTEND nor DURATION, carries a
/// DURATION without a DTSTART, or the addition leaves the representable
/// date range.
pub fn event_end(event: &Component) -> Result<DateTime, EventEndError> {
    if let Some(end) = event.property(names::DTEND) {
        return match &end.value {
            Value::DateTime(dt) => Ok(dt.clone()),
            Value::Date(d) => Ok(DateTime::floating(d.year, d.month, d.day, 0, 0, 0)),
            _ => Err(EventEndError::MissingEnd),
        };
    }
    let Some(duration) = event
        .property(names::DURATION)
        .and_then(|p| p.value.as_duration())
    else {
        return Err(EventEndError::MissingEnd);
    };
    let start = event
        .property(names::DTSTART)
        .and_then(Property::as_datetime)
        .ok_or(EventEndError::MissingStart)?;
    let out_of_range = || EventEndError::OutOfRange(start.to_string());
    let end = start
        .to_naive()
        .and_then(|naive| {
            naive.checked_add_signed(ChronoDuration::seconds(duration.as_seconds()))
        })
        .ok_or_else(out_of_range)?;
    with_form(end, start.form.clone()).ok_or_else(out_of_range)
}

fn with_form(naive: NaiveDateTime, form: DateTimeForm) -> Option<DateTime> {
    Some(DateTime {
        year: u16::try_from(naive.year()).ok()?,
        month: u8::try_from(naive.month()).ok()?,
        day: u8::try_from(naive.day()).ok()?,
        hour: u8::try_from(naive.hour()).ok()?,
        minute: u8::try_from(naive.minute()).ok()?,
        second: u8::try_from(naive.second()).ok()?,
        form,
    })
}
