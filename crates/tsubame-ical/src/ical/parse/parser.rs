//! Full document parser: content lines into the typed component tree.

use std::iter::Peekable;
use std::vec::IntoIter;

use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::lexer::{parse_content_line, split_lines};
use super::parameters::validate_parameters;
use super::schema::{ComponentSchema, schema_for};
use super::values::{
    parse_boolean, parse_date, parse_datetime, parse_duration, parse_float, parse_integer,
    parse_period, parse_rrule, parse_utc_offset, split_text_list, unescape_text,
};
use crate::ical::core::{
    Component, ComponentKind, ContentLine, ICalendar, Property, Value, is_non_standard_name,
};

type Lines = Peekable<IntoIter<(usize, ContentLine)>>;

/// The value type a property's raw value is parsed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueType {
    Text,
    TextList,
    Integer,
    Float,
    Boolean,
    Date,
    DateTime,
    Duration,
    Period,
    Recur,
    UtcOffset,
}

/// Static property-name dispatch table. `None` means the name is unknown.
fn known_property(name: &str) -> Option<ValueType> {
    match name {
        "DTSTART" | "DTEND" | "DTSTAMP" | "CREATED" | "LAST-MODIFIED" | "RECURRENCE-ID"
        | "EXDATE" | "RDATE" => Some(ValueType::DateTime),
        "DURATION" | "TRIGGER" => Some(ValueType::Duration),
        "SEQUENCE" | "REPEAT" | "PRIORITY" | "PERCENT-COMPLETE" => Some(ValueType::Integer),
        "RRULE" => Some(ValueType::Recur),
        "TZOFFSETFROM" | "TZOFFSETTO" => Some(ValueType::UtcOffset),
        "FREEBUSY" => Some(ValueType::Period),
        "CATEGORIES" | "RESOURCES" => Some(ValueType::TextList),
        "VERSION" | "PRODID" | "CALSCALE" | "METHOD" | "UID" | "SUMMARY" | "DESCRIPTION"
        | "GEO"
        | "LOCATION" | "COMMENT" | "STATUS" | "TRANSP" | "CLASS" | "URL" | "ATTENDEE"
        | "ORGANIZER" | "CONTACT" | "RELATED-TO" | "ACTION" | "ATTACH" | "TZID" | "TZNAME"
        | "TZURL" => Some(ValueType::Text),
        _ => None,
    }
}

/// Maps a `VALUE=` parameter to a value type.
fn value_type_from_param(name: &str) -> Option<ValueType> {
    match name.to_ascii_uppercase().as_str() {
        "TEXT" | "BINARY" | "URI" | "CAL-ADDRESS" => Some(ValueType::Text),
        "INTEGER" => Some(ValueType::Integer),
        "FLOAT" => Some(ValueType::Float),
        "BOOLEAN" => Some(ValueType::Boolean),
        "DATE" => Some(ValueType::Date),
        "DATE-TIME" => Some(ValueType::DateTime),
        "DURATION" => Some(ValueType::Duration),
        "PERIOD" => Some(ValueType::Period),
        "RECUR" => Some(ValueType::Recur),
        "UTC-OFFSET" => Some(ValueType::UtcOffset),
        _ => None,
    }
}

/// Picks the value type for a content line.
///
/// An explicit `VALUE=` parameter wins; otherwise RDATE/EXDATE and TRIGGER
/// are disambiguated from the shape of the raw value, and everything else
/// comes from the dispatch table.
fn resolve_value_type(
    content: &ContentLine,
    known: Option<ValueType>,
    line_no: usize,
) -> ParseResult<ValueType> {
    if let Some(explicit) = content.value_type() {
        return value_type_from_param(explicit).ok_or_else(|| {
            ParseError::new(ParseErrorKind::InvalidParameterValue, line_no, 0)
                .with_context(format!("unknown VALUE type '{explicit}'"))
        });
    }
    Ok(match content.name.as_str() {
        "RDATE" | "EXDATE" => {
            if content.raw_value.contains('/') {
                ValueType::Period
            } else if content.raw_value.contains('T') {
                ValueType::DateTime
            } else {
                ValueType::Date
            }
        }
        "TRIGGER" => {
            if content.raw_value.starts_with(['P', 'p', '+', '-']) {
                ValueType::Duration
            } else {
                ValueType::DateTime
            }
        }
        _ => known.unwrap_or(ValueType::Text),
    })
}

fn parse_typed_value(
    value_type: ValueType,
    content: &ContentLine,
    line_no: usize,
) -> ParseResult<Value> {
    let raw = content.raw_value.as_str();
    let tzid = content.tzid();
    let is_list = raw.contains(',');

    Ok(match value_type {
        ValueType::Text => Value::Text(unescape_text(raw)),
        ValueType::TextList => Value::TextList(
            split_text_list(raw)
                .into_iter()
                .map(unescape_text)
                .collect(),
        ),
        ValueType::Integer => Value::Integer(parse_integer(raw, line_no, 0)?),
        ValueType::Float => Value::Float(parse_float(raw, line_no, 0)?),
        ValueType::Boolean => Value::Boolean(parse_boolean(raw, line_no, 0)?),
        ValueType::Date => {
            if is_list {
                Value::DateList(
                    raw.split(',')
                        .map(|part| parse_date(part, line_no, 0))
                        .collect::<ParseResult<Vec<_>>>()?,
                )
            } else {
                Value::Date(parse_date(raw, line_no, 0)?)
            }
        }
        ValueType::DateTime => {
            if is_list {
                Value::DateTimeList(
                    raw.split(',')
                        .map(|part| parse_datetime(part, tzid, line_no, 0))
                        .collect::<ParseResult<Vec<_>>>()?,
                )
            } else {
                Value::DateTime(parse_datetime(raw, tzid, line_no, 0)?)
            }
        }
        ValueType::Duration => Value::Duration(parse_duration(raw, line_no, 0)?),
        ValueType::Period => {
            if is_list {
                Value::PeriodList(
                    raw.split(',')
                        .map(|part| parse_period(part, tzid, line_no, 0))
                        .collect::<ParseResult<Vec<_>>>()?,
                )
            } else {
                Value::Period(parse_period(raw, tzid, line_no, 0)?)
            }
        }
        ValueType::Recur => Value::Recur(Box::new(parse_rrule(raw, line_no, 0)?)),
        ValueType::UtcOffset => Value::UtcOffset(parse_utc_offset(raw, line_no, 0)?),
    })
}

fn parse_property(content: ContentLine, line_no: usize) -> ParseResult<Property> {
    let standard = !is_non_standard_name(&content.name);
    let known = known_property(&content.name);
    if standard && known.is_none() {
        return Err(
            ParseError::new(ParseErrorKind::UnexpectedProperty, line_no, 0)
                .with_context(format!("unknown property '{}'", content.name)),
        );
    }
    validate_parameters(&content, standard, line_no)?;

    let value = if standard {
        let value_type = resolve_value_type(&content, known, line_no)?;
        parse_typed_value(value_type, &content, line_no)?
    } else {
        // Extension properties keep their raw text.
        Value::Text(content.raw_value.clone())
    };

    Ok(Property {
        name: content.name,
        params: content.params,
        value,
        raw_value: content.raw_value,
    })
}

fn component_kind(content: &ContentLine, line_no: usize) -> ParseResult<ComponentKind> {
    let name = content.raw_value.trim().to_ascii_uppercase();
    ComponentKind::parse(&name).ok_or_else(|| {
        ParseError::new(ParseErrorKind::UnknownComponent, line_no, 0)
            .with_context(format!("BEGIN:{name}"))
    })
}

fn finalize_component(
    component: &Component,
    schema: &ComponentSchema,
    end_line: usize,
) -> ParseResult<()> {
    for required in schema.mandatory {
        if component.property(required).is_none() {
            return Err(
                ParseError::new(ParseErrorKind::MissingRequiredProperty, end_line, 0)
                    .with_context(format!(
                        "'{required}' in component '{}'",
                        component.kind
                    )),
            );
        }
    }
    for (a, b) in schema.exclusive {
        if component.property(a).is_some() && component.property(b).is_some() {
            return Err(
                ParseError::new(ParseErrorKind::ConflictingProperties, end_line, 0).with_context(
                    format!("'{a}' and '{b}' in component '{}'", component.kind),
                ),
            );
        }
    }
    if component.kind == ComponentKind::Timezone && component.children.is_empty() {
        return Err(
            ParseError::new(ParseErrorKind::MissingRequiredProperty, end_line, 0)
                .with_context("VTIMEZONE requires at least one STANDARD or DAYLIGHT observance"),
        );
    }
    Ok(())
}

fn parse_component(kind: ComponentKind, begin_line: usize, lines: &mut Lines) -> ParseResult<Component> {
    let schema = schema_for(kind);
    let mut component = Component::new(kind);

    while let Some((line_no, content)) = lines.next() {
        match content.name.as_str() {
            "BEGIN" => {
                let child_kind = component_kind(&content, line_no)?;
                if !schema.allows_child(child_kind) {
                    return Err(
                        ParseError::new(ParseErrorKind::UnexpectedComponent, line_no, 0)
                            .with_context(format!("'{child_kind}' not allowed inside '{kind}'")),
                    );
                }
                component
                    .children
                    .push(parse_component(child_kind, line_no, lines)?);
            }
            "END" => {
                let end_name = content.raw_value.trim().to_ascii_uppercase();
                if end_name != kind.as_str() {
                    return Err(
                        ParseError::new(ParseErrorKind::MismatchedEnd, line_no, 0)
                            .with_context(format!("expected END:{kind}, got END:{end_name}")),
                    );
                }
                finalize_component(&component, schema, line_no)?;
                return Ok(component);
            }
            _ => {
                let property = parse_property(content, line_no)?;
                if !schema.is_list(&property.name) && component.property(&property.name).is_some() {
                    return Err(
                        ParseError::new(ParseErrorKind::DuplicateProperty, line_no, 0)
                            .with_context(format!(
                                "non-list property '{}' appeared twice in component '{kind}'",
                                property.name
                            )),
                    );
                }
                component.add_property(property);
            }
        }
    }

    Err(ParseError::new(ParseErrorKind::MissingEnd, begin_line, 0)
        .with_context(format!("missing END:{kind}")))
}

/// Parses an iCalendar stream into its VCALENDAR components.
///
/// The stream root is virtual: it accepts any number of sibling VCALENDARs
/// and terminates at end of input without requiring an END of its own.
///
/// ## Errors
/// Returns the first structural or value error with its line number.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse(input: &str) -> ParseResult<ICalendar> {
    let logical = split_lines(input);
    tracing::debug!(logical_lines = logical.len(), "parsing iCalendar input");

    let mut lines = Vec::with_capacity(logical.len());
    for (line_no, text) in &logical {
        lines.push((*line_no, parse_content_line(text, *line_no)?));
    }
    let mut lines: Lines = lines.into_iter().peekable();

    let mut calendars = Vec::new();
    while let Some((line_no, content)) = lines.next() {
        if content.name == "BEGIN" {
            let kind = component_kind(&content, line_no)?;
            if kind != ComponentKind::Calendar {
                return Err(
                    ParseError::new(ParseErrorKind::UnexpectedComponent, line_no, 0)
                        .with_context(format!("'{kind}' cannot appear at the top level")),
                );
            }
            calendars.push(parse_component(kind, line_no, &mut lines)?);
        } else {
            return Err(
                ParseError::new(ParseErrorKind::UnexpectedProperty, line_no, 0).with_context(
                    format!("property '{}' outside any component", content.name),
                ),
            );
        }
    }

    tracing::debug!(calendars = calendars.len(), "parsed iCalendar stream");
    Ok(ICalendar { calendars })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ical::core::{DateTimeForm, Frequency};

    const SIMPLE_VEVENT: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example Corp//Calendar//EN\r\n\
BEGIN:VEVENT\r\n\
UID:event-1@example.com\r\n\
DTSTAMP:20260120T090000Z\r\n\
DTSTART;TZID=Europe/Berlin:20260123T120000\r\n\
SUMMARY:Team standup\r\n\
RRULE:FREQ=DAILY;COUNT=5\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    #[test]
    fn parse_simple_event() {
        let ical = parse(SIMPLE_VEVENT).unwrap();
        assert_eq!(ical.version(), Some("2.0"));
        assert_eq!(ical.calendars.len(), 1);

        let events = ical.events();
        assert_eq!(events.len(), 1);
        let event = events[0];
        assert_eq!(event.uid(), Some("event-1@example.com"));
        assert_eq!(event.summary(), Some("Team standup"));

        let dtstart = event.property("DTSTART").unwrap().as_datetime().unwrap();
        assert_eq!(dtstart.tzid(), Some("Europe/Berlin"));
        assert_eq!((dtstart.year, dtstart.month, dtstart.day), (2026, 1, 23));

        let rule = event.property("RRULE").unwrap().as_rrule().unwrap();
        assert_eq!(rule.freq, Frequency::Daily);
        assert_eq!(rule.count, Some(5));
    }

    #[test]
    fn parse_multiple_calendars() {
        let input = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//A//EN\r\nEND:VCALENDAR\r\n\
BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//B//EN\r\nEND:VCALENDAR\r\n";
        let ical = parse(input).unwrap();
        assert_eq!(ical.calendars.len(), 2);
    }

    #[test]
    fn mismatched_end_is_fatal() {
        let input = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//A//EN\r\n\
BEGIN:VEVENT\r\nUID:u\r\nDTSTAMP:20260101T000000Z\r\nDTSTART:20260101T100000\r\n\
END:VCALENDAR\r\n";
        let err = parse(input).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MismatchedEnd);
        assert_eq!(err.line, 8);
    }

    #[test]
    fn missing_end_is_fatal() {
        let input = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//A//EN\r\n";
        let err = parse(input).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingEnd);
    }

    #[test]
    fn unknown_component_is_fatal() {
        let input = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//A//EN\r\n\
BEGIN:VJOURNAL\r\nEND:VJOURNAL\r\nEND:VCALENDAR\r\n";
        let err = parse(input).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnknownComponent);
    }

    #[test]
    fn misplaced_component_is_fatal() {
        // VALARM is known but not allowed directly inside VCALENDAR.
        let input = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//A//EN\r\n\
BEGIN:VALARM\r\nACTION:DISPLAY\r\nTRIGGER:-PT15M\r\nEND:VALARM\r\nEND:VCALENDAR\r\n";
        let err = parse(input).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedComponent);
    }

    #[test]
    fn duplicate_singleton_is_fatal() {
        let input = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//A//EN\r\n\
BEGIN:VEVENT\r\nUID:u\r\nDTSTAMP:20260101T000000Z\r\nDTSTART:20260101T100000\r\n\
RRULE:FREQ=DAILY\r\nRRULE:FREQ=WEEKLY\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";
        let err = parse(input).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::DuplicateProperty);
        assert_eq!(err.line, 9);
    }

    #[test]
    fn missing_mandatory_property_is_fatal() {
        let input = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nEND:VCALENDAR\r\n";
        let err = parse(input).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingRequiredProperty);
    }

    #[test]
    fn dtend_and_duration_conflict() {
        let input = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//A//EN\r\n\
BEGIN:VEVENT\r\nUID:u\r\nDTSTAMP:20260101T000000Z\r\nDTSTART:20260101T100000\r\n\
DTEND:20260101T110000\r\nDURATION:PT1H\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";
        let err = parse(input).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ConflictingProperties);
    }

    #[test]
    fn unknown_property_is_fatal() {
        let input = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//A//EN\r\n\
FAVOURITE:unset\r\nEND:VCALENDAR\r\n";
        let err = parse(input).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedProperty);
    }

    #[test]
    fn extension_properties_pass_through() {
        let input = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//A//EN\r\n\
X-WR-CALNAME;X-SOURCE=web:Team calendar\r\nEND:VCALENDAR\r\n";
        let ical = parse(input).unwrap();
        let calname = ical.calendars[0].property("X-WR-CALNAME").unwrap();
        assert_eq!(calname.as_text(), Some("Team calendar"));
        assert_eq!(calname.param_value("X-SOURCE"), Some("web"));
    }

    #[test]
    fn value_date_override() {
        let input = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//A//EN\r\n\
BEGIN:VEVENT\r\nUID:u\r\nDTSTAMP:20260101T000000Z\r\n\
DTSTART;VALUE=DATE:20260123\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";
        let ical = parse(input).unwrap();
        let dtstart = &ical.events()[0].property("DTSTART").unwrap().value;
        assert_eq!(
            dtstart.as_date().map(|d| (d.year, d.month, d.day)),
            Some((2026, 1, 23))
        );
    }

    #[test]
    fn exdate_list_heuristics() {
        let input = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//A//EN\r\n\
BEGIN:VEVENT\r\nUID:u\r\nDTSTAMP:20260101T000000Z\r\nDTSTART:20260101T100000\r\n\
EXDATE:20260102T100000,20260103T100000\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";
        let ical = parse(input).unwrap();
        let exdate = &ical.events()[0].property("EXDATE").unwrap().value;
        match exdate {
            Value::DateTimeList(list) => assert_eq!(list.len(), 2),
            other => panic!("expected DateTimeList, got {other:?}"),
        }
    }

    #[test]
    fn property_outside_component_is_fatal() {
        let err = parse("VERSION:2.0\r\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedProperty);
    }

    #[test]
    fn dtstart_with_utc_and_tzid_is_fatal() {
        let input = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//A//EN\r\n\
BEGIN:VEVENT\r\nUID:u\r\nDTSTAMP:20260101T000000Z\r\n\
DTSTART;TZID=Europe/Berlin:20260101T100000Z\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";
        let err = parse(input).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidDateTime);
        assert_eq!(err.line, 7);
    }

    #[test]
    fn folded_input_parses() {
        let input = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//A//EN\r\n\
BEGIN:VEVENT\r\nUID:u\r\nDTSTAMP:20260101T000000Z\r\nDTSTART:20260101T100000\r\n\
DESCRIPTION:This description spans\r\n  two physical lines\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";
        let ical = parse(input).unwrap();
        assert_eq!(
            ical.events()[0].property("DESCRIPTION").unwrap().as_text(),
            Some("This description spans two physical lines")
        );
    }
}
