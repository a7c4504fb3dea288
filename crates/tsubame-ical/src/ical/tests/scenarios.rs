use chrono::{NaiveDate, NaiveDateTime};

use super::fixtures::{BERLIN_CALENDAR, FOLDED_EVENT, MISSING_VERSION};
use crate::ical::build::to_plain;
use crate::ical::core::{DateTime, Property};
use crate::ical::expand::{VTimezone, expand, to_utc};
use crate::ical::parse::{ParseErrorKind, parse};

fn utc_at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(h, mi, 0)
        .unwrap()
}

fn zoned(naive: NaiveDateTime, tzid: &str) -> DateTime {
    use chrono::{Datelike, Timelike};
    DateTime::zoned(
        u16::try_from(naive.year()).unwrap(),
        u8::try_from(naive.month()).unwrap(),
        u8::try_from(naive.day()).unwrap(),
        u8::try_from(naive.hour()).unwrap(),
        u8::try_from(naive.minute()).unwrap(),
        u8::try_from(naive.second()).unwrap(),
        tzid,
    )
}

#[test_log::test]
fn parses_a_complete_calendar() {
    let calendar = parse(BERLIN_CALENDAR).unwrap();
    assert_eq!(calendar.version(), Some("2.0"));
    assert_eq!(calendar.prodid(), Some("-//tsubame//ical//EN"));

    let events = calendar.events();
    assert_eq!(events.len(), 1);
    let event = events[0];
    assert_eq!(event.uid(), Some("standup-2026"));
    assert_eq!(event.summary(), Some("Daily standup"));
    assert_eq!(
        event.property("DESCRIPTION").and_then(Property::as_text),
        Some("Quick sync, 15 minutes\nVideo link in the invite")
    );

    let alarms = event.alarms();
    assert_eq!(alarms.len(), 1);
    assert_eq!(
        alarms[0].property("ACTION").and_then(Property::as_text),
        Some("DISPLAY")
    );
    let trigger = alarms[0].property("TRIGGER").unwrap();
    let duration = trigger.value.as_duration().unwrap();
    assert!(duration.negative);
    assert_eq!(duration.minutes, 10);
}

#[test]
fn unfolds_wrapped_descriptions() {
    let calendar = parse(FOLDED_EVENT).unwrap();
    assert_eq!(
        calendar.events()[0]
            .property("DESCRIPTION")
            .and_then(Property::as_text),
        Some("This description continues across folded lines and a tab-folded one")
    );
}

#[test_log::test]
fn expands_event_occurrences_across_dst() {
    let calendar = parse(BERLIN_CALENDAR).unwrap();
    let zone = VTimezone::from_component(calendar.timezones()[0]).unwrap();
    let event = calendar.events()[0];

    let dtstart = event.property("DTSTART").unwrap();
    let tzid = dtstart.tzid().unwrap();
    let start = dtstart.as_datetime().unwrap().to_naive().unwrap();
    let rule = event.property("RRULE").unwrap().as_rrule().unwrap();

    let occurrences: Vec<_> = expand(rule, start, None).unwrap().collect();
    assert_eq!(occurrences.len(), 10);

    let zones = [zone];
    let in_utc: Vec<_> = occurrences
        .iter()
        .map(|&o| to_utc(&zoned(o, tzid), &zones).unwrap())
        .collect();

    // Winter time until the last Sunday of March 2026 (the 29th), then
    // the same local hour lands one UTC hour earlier.
    assert_eq!(in_utc[0], utc_at(2026, 3, 23, 8, 0));
    assert_eq!(in_utc[5], utc_at(2026, 3, 28, 8, 0));
    assert_eq!(in_utc[6], utc_at(2026, 3, 29, 7, 0));
    assert_eq!(in_utc[9], utc_at(2026, 4, 1, 7, 0));
}

#[test]
fn missing_version_is_fatal() {
    let err = parse(MISSING_VERSION).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::MissingRequiredProperty);
}

#[test]
fn component_tree_serializes() {
    let calendar = parse(BERLIN_CALENDAR).unwrap();
    let json = serde_json::to_value(&calendar).unwrap();
    assert!(json["calendars"][0]["properties"].is_array());
    assert_eq!(json["calendars"][0]["kind"], "Calendar");
}

#[test]
fn plain_projection_keeps_nesting() {
    let plain = to_plain(&parse(BERLIN_CALENDAR).unwrap());
    let event = &plain["VCALENDAR"][0]["VEVENT"][0];
    assert_eq!(event["UID"], "standup-2026");
    assert_eq!(event["VALARM"][0]["ACTION"], "DISPLAY");
    assert_eq!(event["DTSTART"]["parameters"]["TZID"], "Europe/Berlin");
    assert_eq!(
        plain["VCALENDAR"][0]["VTIMEZONE"][0]["TZID"],
        "Europe/Berlin"
    );
}
