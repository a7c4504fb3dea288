//! iCalendar properties and content lines (RFC 5545 §3.1).

use serde::Serialize;

use super::datetime::DateTime;
use super::parameter::{Parameter, names as param_names};
use super::rrule::RRule;
use super::value::Value;

/// A lexed content line: `NAME;PARAM=VAL:VALUE` before value typing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine {
    /// Property name, uppercase.
    pub name: String,
    /// Parameters in source order.
    pub params: Vec<Parameter>,
    /// Raw value text, exactly as it appeared after the colon.
    pub raw_value: String,
}

impl ContentLine {
    /// Looks up a parameter by name (case-insensitive).
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Parameter> {
        self.params
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Returns the first value of a parameter, if present.
    #[must_use]
    pub fn param_value(&self, name: &str) -> Option<&str> {
        self.param(name).and_then(Parameter::value)
    }

    /// Returns the `VALUE` parameter (explicit value type), if present.
    #[must_use]
    pub fn value_type(&self) -> Option<&str> {
        self.param_value(param_names::VALUE)
    }

    /// Returns the `TZID` parameter, if present.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        self.param_value(param_names::TZID)
    }
}

/// A typed property within a component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    /// Property name, uppercase.
    pub name: String,
    /// Parameters in source order.
    pub params: Vec<Parameter>,
    /// Parsed, typed value.
    pub value: Value,
    /// Raw value text for round-tripping.
    pub raw_value: String,
}

impl Property {
    /// Creates a property from its parts.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        params: Vec<Parameter>,
        value: Value,
        raw_value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            params,
            value,
            raw_value: raw_value.into(),
        }
    }

    /// Creates a parameterless text property.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        Self::new(name, Vec::new(), Value::Text(value.clone()), value)
    }

    /// Looks up a parameter by name (case-insensitive).
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Parameter> {
        self.params
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Returns the first value of a parameter, if present.
    #[must_use]
    pub fn param_value(&self, name: &str) -> Option<&str> {
        self.param(name).and_then(Parameter::value)
    }

    /// Returns the `TZID` parameter, if present.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        self.param_value(param_names::TZID)
    }

    /// Whether this is an `X-` or `IANA-` extension property.
    #[must_use]
    pub fn is_non_standard(&self) -> bool {
        is_non_standard_name(&self.name)
    }

    /// Returns the text content, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        self.value.as_text()
    }

    /// Returns the date-time content, if this is a date-time value.
    #[must_use]
    pub fn as_datetime(&self) -> Option<&DateTime> {
        self.value.as_datetime()
    }

    /// Returns the recurrence rule, if this is a RECUR value.
    #[must_use]
    pub fn as_rrule(&self) -> Option<&RRule> {
        self.value.as_rrule()
    }
}

/// Whether a property or parameter name is an `X-`/`IANA-` extension.
#[must_use]
pub fn is_non_standard_name(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    upper.starts_with("X-") || upper.starts_with("IANA-")
}

/// Well-known property names (RFC 5545 §3.7, §3.8).
pub mod names {
    /// Calendar scale.
    pub const CALSCALE: &str = "CALSCALE";
    /// iTIP method.
    pub const METHOD: &str = "METHOD";
    /// Product identifier.
    pub const PRODID: &str = "PRODID";
    /// iCalendar version.
    pub const VERSION: &str = "VERSION";

    /// Attendee.
    pub const ATTENDEE: &str = "ATTENDEE";
    /// Categories.
    pub const CATEGORIES: &str = "CATEGORIES";
    /// Classification.
    pub const CLASS: &str = "CLASS";
    /// Comment.
    pub const COMMENT: &str = "COMMENT";
    /// Creation timestamp.
    pub const CREATED: &str = "CREATED";
    /// Description.
    pub const DESCRIPTION: &str = "DESCRIPTION";
    /// End of the event.
    pub const DTEND: &str = "DTEND";
    /// Creation/change stamp of the object.
    pub const DTSTAMP: &str = "DTSTAMP";
    /// Start of the event or observance.
    pub const DTSTART: &str = "DTSTART";
    /// Duration.
    pub const DURATION: &str = "DURATION";
    /// Exception dates.
    pub const EXDATE: &str = "EXDATE";
    /// Geographic position.
    pub const GEO: &str = "GEO";
    /// Last modification timestamp.
    pub const LAST_MODIFIED: &str = "LAST-MODIFIED";
    /// Location.
    pub const LOCATION: &str = "LOCATION";
    /// Organizer.
    pub const ORGANIZER: &str = "ORGANIZER";
    /// Priority.
    pub const PRIORITY: &str = "PRIORITY";
    /// Recurrence dates.
    pub const RDATE: &str = "RDATE";
    /// Recurrence identifier.
    pub const RECURRENCE_ID: &str = "RECURRENCE-ID";
    /// Recurrence rule.
    pub const RRULE: &str = "RRULE";
    /// Revision sequence number.
    pub const SEQUENCE: &str = "SEQUENCE";
    /// Status.
    pub const STATUS: &str = "STATUS";
    /// Summary.
    pub const SUMMARY: &str = "SUMMARY";
    /// Transparency.
    pub const TRANSP: &str = "TRANSP";
    /// Unique identifier.
    pub const UID: &str = "UID";
    /// URL.
    pub const URL: &str = "URL";

    /// Alarm action.
    pub const ACTION: &str = "ACTION";
    /// Alarm repeat count.
    pub const REPEAT: &str = "REPEAT";
    /// Alarm trigger.
    pub const TRIGGER: &str = "TRIGGER";

    /// Timezone identifier.
    pub const TZID: &str = "TZID";
    /// Timezone name.
    pub const TZNAME: &str = "TZNAME";
    /// Offset in effect before the observance.
    pub const TZOFFSETFROM: &str = "TZOFFSETFROM";
    /// Offset in effect during the observance.
    pub const TZOFFSETTO: &str = "TZOFFSETTO";
    /// Timezone URL.
    pub const TZURL: &str = "TZURL";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_line_param_lookup() {
        let line = ContentLine {
            name: "DTSTART".into(),
            params: vec![Parameter::new("TZID", "Europe/Berlin")],
            raw_value: "20240523T115445".into(),
        };
        assert_eq!(line.tzid(), Some("Europe/Berlin"));
        assert_eq!(line.param_value("tzid"), Some("Europe/Berlin"));
        assert_eq!(line.value_type(), None);
    }

    #[test]
    fn text_property() {
        let prop = Property::text("summary", "Standup");
        assert_eq!(prop.name, "SUMMARY");
        assert_eq!(prop.as_text(), Some("Standup"));
        assert!(!prop.is_non_standard());
    }

    #[test]
    fn non_standard_names() {
        assert!(is_non_standard_name("X-WR-CALNAME"));
        assert!(is_non_standard_name("iana-token"));
        assert!(!is_non_standard_name("SUMMARY"));
    }
}
