//! iCalendar property parameters (RFC 5545 §3.2).

use std::fmt;

use serde::Serialize;

/// A property parameter with one or more values.
///
/// Multi-valued parameters (`MEMBER`, `DELEGATED-TO`, ...) keep every value;
/// single-valued parameters hold exactly one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    /// Parameter name, uppercase.
    pub name: String,
    /// Parameter values with quoting and escapes already removed.
    pub values: Vec<String>,
}

impl Parameter {
    /// Creates a single-valued parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            values: vec![value.into()],
        }
    }

    /// Creates a multi-valued parameter.
    #[must_use]
    pub fn with_values(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            values,
        }
    }

    /// Returns the first value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}

fn needs_quoting(value: &str) -> bool {
    value.contains([':', ';', ','])
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=", self.name)?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            if needs_quoting(value) {
                write!(f, "\"{value}\"")?;
            } else {
                write!(f, "{value}")?;
            }
        }
        Ok(())
    }
}

/// Well-known parameter names (RFC 5545 §3.2).
pub mod names {
    /// Alternate text representation.
    pub const ALTREP: &str = "ALTREP";
    /// Common name.
    pub const CN: &str = "CN";
    /// Calendar user type.
    pub const CUTYPE: &str = "CUTYPE";
    /// Delegators.
    pub const DELEGATED_FROM: &str = "DELEGATED-FROM";
    /// Delegatees.
    pub const DELEGATED_TO: &str = "DELEGATED-TO";
    /// Directory entry reference.
    pub const DIR: &str = "DIR";
    /// Display hints (RFC 7986).
    pub const DISPLAY: &str = "DISPLAY";
    /// Email address (RFC 7986).
    pub const EMAIL: &str = "EMAIL";
    /// Inline encoding.
    pub const ENCODING: &str = "ENCODING";
    /// Free/busy time type.
    pub const FBTYPE: &str = "FBTYPE";
    /// Feature hints (RFC 7986).
    pub const FEATURE: &str = "FEATURE";
    /// Format type (MIME).
    pub const FMTTYPE: &str = "FMTTYPE";
    /// Label (RFC 7986).
    pub const LABEL: &str = "LABEL";
    /// Language tag.
    pub const LANGUAGE: &str = "LANGUAGE";
    /// Group membership.
    pub const MEMBER: &str = "MEMBER";
    /// Participation status.
    pub const PARTSTAT: &str = "PARTSTAT";
    /// Recurrence identifier range.
    pub const RANGE: &str = "RANGE";
    /// Alarm trigger relationship.
    pub const RELATED: &str = "RELATED";
    /// Relationship type.
    pub const RELTYPE: &str = "RELTYPE";
    /// Participation role.
    pub const ROLE: &str = "ROLE";
    /// RSVP expectation.
    pub const RSVP: &str = "RSVP";
    /// Sent-by calendar user.
    pub const SENT_BY: &str = "SENT-BY";
    /// Timezone identifier.
    pub const TZID: &str = "TZID";
    /// Value data type override.
    pub const VALUE: &str = "VALUE";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_plain() {
        let param = Parameter::new("TZID", "Europe/Berlin");
        assert_eq!(param.to_string(), "TZID=Europe/Berlin");
    }

    #[test]
    fn display_quoted() {
        let param = Parameter::new("ALTREP", "cid:part1;part2");
        assert_eq!(param.to_string(), "ALTREP=\"cid:part1;part2\"");
    }

    #[test]
    fn display_multi_valued() {
        let param = Parameter::with_values(
            "DELEGATED-TO",
            vec!["mailto:a@example.com".into(), "mailto:b@example.com".into()],
        );
        assert_eq!(
            param.to_string(),
            "DELEGATED-TO=\"mailto:a@example.com\",\"mailto:b@example.com\""
        );
    }

    #[test]
    fn name_uppercased() {
        assert_eq!(Parameter::new("tzid", "X").name, "TZID");
    }
}
