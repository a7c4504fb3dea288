//! iCalendar component tree (RFC 5545 §3.6).

use std::fmt;

use serde::Serialize;

use super::property::{Property, names};

/// The component variants this engine understands.
///
/// Unknown `BEGIN:` names are rejected by the parser, so every parsed
/// component carries one of these kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ComponentKind {
    /// VCALENDAR.
    Calendar,
    /// VEVENT.
    Event,
    /// VALARM.
    Alarm,
    /// VTIMEZONE.
    Timezone,
    /// STANDARD observance inside a VTIMEZONE.
    Standard,
    /// DAYLIGHT observance inside a VTIMEZONE.
    Daylight,
}

impl ComponentKind {
    /// Returns the RFC 5545 component name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Calendar => "VCALENDAR",
            Self::Event => "VEVENT",
            Self::Alarm => "VALARM",
            Self::Timezone => "VTIMEZONE",
            Self::Standard => "STANDARD",
            Self::Daylight => "DAYLIGHT",
        }
    }

    /// Parses an RFC 5545 component name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "VCALENDAR" => Some(Self::Calendar),
            "VEVENT" => Some(Self::Event),
            "VALARM" => Some(Self::Alarm),
            "VTIMEZONE" => Some(Self::Timezone),
            "STANDARD" => Some(Self::Standard),
            "DAYLIGHT" => Some(Self::Daylight),
            _ => None,
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A component with its properties and nested sub-components.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    /// The component kind.
    pub kind: ComponentKind,
    /// Properties in source order.
    pub properties: Vec<Property>,
    /// Sub-components in source order.
    pub children: Vec<Component>,
}

impl Component {
    /// Creates an empty component of the given kind.
    #[must_use]
    pub const fn new(kind: ComponentKind) -> Self {
        Self {
            kind,
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Adds a property.
    pub fn add_property(&mut self, property: Property) {
        self.properties.push(property);
    }

    /// Returns the first property with the given name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Returns every property with the given name.
    #[must_use]
    pub fn properties(&self, name: &str) -> Vec<&Property> {
        self.properties
            .iter()
            .filter(|p| p.name.eq_ignore_ascii_case(name))
            .collect()
    }

    /// Returns the UID property value, if present.
    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        self.property(names::UID).and_then(Property::as_text)
    }

    /// Returns the SUMMARY property value, if present.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.property(names::SUMMARY).and_then(Property::as_text)
    }

    /// Returns the sub-components of the given kind.
    #[must_use]
    pub fn children_of_kind(&self, kind: ComponentKind) -> Vec<&Component> {
        self.children.iter().filter(|c| c.kind == kind).collect()
    }

    /// Returns all VEVENT sub-components.
    #[must_use]
    pub fn events(&self) -> Vec<&Component> {
        self.children_of_kind(ComponentKind::Event)
    }

    /// Returns all VALARM sub-components.
    #[must_use]
    pub fn alarms(&self) -> Vec<&Component> {
        self.children_of_kind(ComponentKind::Alarm)
    }

    /// Returns all VTIMEZONE sub-components.
    #[must_use]
    pub fn timezones(&self) -> Vec<&Component> {
        self.children_of_kind(ComponentKind::Timezone)
    }
}

/// A parsed iCalendar stream: every VCALENDAR the input contained.
///
/// The stream root is virtual; it has no BEGIN/END of its own and simply
/// accumulates sibling calendars until end of input.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ICalendar {
    /// The VCALENDAR components in source order.
    pub calendars: Vec<Component>,
}

impl ICalendar {
    /// Returns the VERSION of the first calendar, if present.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.calendars
            .first()
            .and_then(|c| c.property(names::VERSION))
            .and_then(Property::as_text)
    }

    /// Returns the PRODID of the first calendar, if present.
    #[must_use]
    pub fn prodid(&self) -> Option<&str> {
        self.calendars
            .first()
            .and_then(|c| c.property(names::PRODID))
            .and_then(Property::as_text)
    }

    /// Returns every VEVENT across all calendars.
    #[must_use]
    pub fn events(&self) -> Vec<&Component> {
        self.calendars.iter().flat_map(Component::events).collect()
    }

    /// Returns every VTIMEZONE across all calendars.
    #[must_use]
    pub fn timezones(&self) -> Vec<&Component> {
        self.calendars
            .iter()
            .flat_map(Component::timezones)
            .collect()
    }
}
