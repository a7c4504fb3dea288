//! Static per-component schemas: mandatory keys, list keys, mutually
//! exclusive pairs, and allowed sub-components.

use crate::ical::core::{ComponentKind, property_names as names};

/// Cardinality rules for one component kind.
#[derive(Debug)]
pub(crate) struct ComponentSchema {
    /// Properties that must be present when the component closes.
    pub mandatory: &'static [&'static str],
    /// Properties that may appear more than once.
    pub list: &'static [&'static str],
    /// Property pairs that must not both be present.
    pub exclusive: &'static [(&'static str, &'static str)],
    /// Sub-component kinds this component accepts.
    pub children: &'static [ComponentKind],
}

static VCALENDAR: ComponentSchema = ComponentSchema {
    mandatory: &[names::VERSION, names::PRODID],
    list: &[],
    exclusive: &[],
    children: &[ComponentKind::Event, ComponentKind::Timezone],
};

static VEVENT: ComponentSchema = ComponentSchema {
    mandatory: &[names::UID, names::DTSTAMP, names::DTSTART],
    list: &[
        names::ATTENDEE,
        names::CATEGORIES,
        names::COMMENT,
        names::EXDATE,
        names::RDATE,
    ],
    exclusive: &[(names::DTEND, names::DURATION)],
    children: &[ComponentKind::Alarm],
};

static VALARM: ComponentSchema = ComponentSchema {
    mandatory: &[names::ACTION, names::TRIGGER],
    list: &[names::ATTENDEE],
    exclusive: &[],
    children: &[],
};

static VTIMEZONE: ComponentSchema = ComponentSchema {
    mandatory: &[names::TZID],
    list: &[],
    exclusive: &[],
    children: &[ComponentKind::Standard, ComponentKind::Daylight],
};

static OBSERVANCE: ComponentSchema = ComponentSchema {
    mandatory: &[names::DTSTART, names::TZOFFSETFROM, names::TZOFFSETTO],
    list: &[names::RDATE],
    exclusive: &[(names::RRULE, names::RDATE)],
    children: &[],
};

/// Returns the schema for a component kind.
pub(crate) fn schema_for(kind: ComponentKind) -> &'static ComponentSchema {
    match kind {
        ComponentKind::Calendar => &VCALENDAR,
        ComponentKind::Event => &VEVENT,
        ComponentKind::Alarm => &VALARM,
        ComponentKind::Timezone => &VTIMEZONE,
        ComponentKind::Standard | ComponentKind::Daylight => &OBSERVANCE,
    }
}

impl ComponentSchema {
    /// Whether a property may appear more than once here.
    pub fn is_list(&self, name: &str) -> bool {
        self.list.iter().any(|l| l.eq_ignore_ascii_case(name))
    }

    /// Whether a sub-component kind is allowed here.
    pub fn allows_child(&self, kind: ComponentKind) -> bool {
        self.children.contains(&kind)
    }
}
