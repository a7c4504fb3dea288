//! UTC offset resolution against VTIMEZONE observance rules.
//!
//! A VTIMEZONE describes a timezone as a set of STANDARD/DAYLIGHT
//! observances, each recurring via RRULE or RDATE. [`resolve`] finds the
//! observance whose latest transition at or before a local timestamp is
//! the most recent and reports that observance's offset. Only timezones
//! defined in the input are known; there is no external timezone database
//! to fall back on.

use chrono::{Duration as ChronoDuration, NaiveDateTime};
use thiserror::Error;

use super::recur::{ExpandError, expand};
use crate::ical::core::{
    Component, ComponentKind, DateTime, Property, RRule, UtcOffset, Value,
    property_names as names,
};

/// Errors raised while resolving timestamps against timezone definitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The referenced TZID has no VTIMEZONE definition in the input.
    #[error("missing timezone definition for TZID '{0}'")]
    UnknownTimezone(String),
    /// The component handed to [`VTimezone::from_component`] is not a
    /// VTIMEZONE.
    #[error("component {0} is not a VTIMEZONE")]
    NotATimezone(String),
    /// The VTIMEZONE carries no TZID.
    #[error("VTIMEZONE is missing its TZID")]
    MissingTzid,
    /// A timezone definition has no observances to resolve against.
    #[error("timezone '{tzid}' defines no observances")]
    NoObservances {
        /// The timezone identifier.
        tzid: String,
    },
    /// No observance transition precedes the instant being resolved.
    #[error("no observance in timezone '{tzid}' applies at or before the requested instant")]
    NoApplicableObservance {
        /// The timezone identifier.
        tzid: String,
    },
    /// An observance is missing a property or carries one of the wrong
    /// value type.
    #[error("observance in timezone '{tzid}' has a missing or malformed {property}")]
    MalformedObservance {
        /// The timezone identifier.
        tzid: String,
        /// The property at fault.
        property: &'static str,
    },
    /// A date-time does not exist on the calendar.
    #[error("'{0}' is not a representable date-time")]
    InvalidDateTime(String),
    /// Expanding an observance's recurrence rule failed.
    #[error(transparent)]
    Expand(#[from] ExpandError),
}

/// Whether an observance is the standard or daylight-saving phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservanceKind {
    /// STANDARD sub-component.
    Standard,
    /// DAYLIGHT sub-component.
    Daylight,
}

/// One STANDARD or DAYLIGHT phase of a timezone.
#[derive(Debug, Clone, PartialEq)]
pub struct Observance {
    /// Standard or daylight phase.
    pub kind: ObservanceKind,
    /// First transition into this phase, in the timezone's local time.
    pub onset: NaiveDateTime,
    /// Offset in effect just before each transition.
    pub offset_from: UtcOffset,
    /// Offset in effect once the phase starts.
    pub offset_to: UtcOffset,
    /// Recurrence of the transition, if any.
    pub rrule: Option<RRule>,
    /// Explicit additional transitions.
    pub rdates: Vec<NaiveDateTime>,
    /// Customary phase name (TZNAME), if present.
    pub name: Option<String>,
}

/// A timezone definition extracted from a VTIMEZONE component.
#[derive(Debug, Clone, PartialEq)]
pub struct VTimezone {
    /// The timezone identifier events reference via `TZID=`.
    pub tzid: String,
    /// The observances in source order.
    pub observances: Vec<Observance>,
}

impl VTimezone {
    /// Extracts a timezone definition from a parsed VTIMEZONE component.
    ///
    /// ## Errors
    /// Fails when the component is not a VTIMEZONE, lacks a TZID, or an
    /// observance is missing DTSTART/TZOFFSETFROM/TZOFFSETTO or carries a
    /// value of the wrong type.
    pub fn from_component(component: &Component) -> Result<Self, ResolveError> {
        if component.kind != ComponentKind::Timezone {
            return Err(ResolveError::NotATimezone(component.kind.to_string()));
        }
        let tzid = component
            .property(names::TZID)
            .and_then(Property::as_text)
            .ok_or(ResolveError::MissingTzid)?
            .to_owned();

        let mut observances = Vec::new();
        for child in &component.children {
            let kind = match child.kind {
                ComponentKind::Standard => ObservanceKind::Standard,
                ComponentKind::Daylight => ObservanceKind::Daylight,
                _ => continue,
            };
            observances.push(extract_observance(child, kind, &tzid)?);
        }
        Ok(Self { tzid, observances })
    }

    /// Offset in effect at a local wall-clock instant.
    ///
    /// Scans every observance whose onset is not in the future, takes the
    /// latest transition each produces at or before `at`, and returns the
    /// winner's `offset_to`.
    ///
    /// ## Errors
    /// Fails when the timezone has no observances, no observance applies at
    /// or before `at`, or an observance rule cannot be expanded.
    pub fn offset_at(&self, at: NaiveDateTime) -> Result<UtcOffset, ResolveError> {
        let mut latest: Option<(NaiveDateTime, UtcOffset)> = None;
        for observance in &self.observances {
            if observance.onset > at {
                continue;
            }
            let mut transition = observance.onset;
            for &rdate in &observance.rdates {
                if rdate <= at && rdate > transition {
                    transition = rdate;
                }
            }
            if let Some(rule) = &observance.rrule {
                // The bound is exclusive, so nudge it past `at` to keep a
                // transition landing exactly on `at` in range.
                let bound = at
                    .checked_add_signed(ChronoDuration::seconds(1))
                    .unwrap_or(at);
                if let Some(last) = expand(rule, observance.onset, Some(bound))?.last() {
                    if last > transition {
                        transition = last;
                    }
                }
            }
            if latest.is_none_or(|(best, _)| transition > best) {
                latest = Some((transition, observance.offset_to));
            }
        }
        if let Some((_, offset)) = latest {
            return Ok(offset);
        }
        if self.observances.is_empty() {
            return Err(ResolveError::NoObservances {
                tzid: self.tzid.clone(),
            });
        }
        Err(ResolveError::NoApplicableObservance {
            tzid: self.tzid.clone(),
        })
    }
}

fn extract_observance(
    child: &Component,
    kind: ObservanceKind,
    tzid: &str,
) -> Result<Observance, ResolveError> {
    let malformed = |property: &'static str| ResolveError::MalformedObservance {
        tzid: tzid.to_owned(),
        property,
    };

    let onset_dt = child
        .property(names::DTSTART)
        .and_then(Property::as_datetime)
        .ok_or_else(|| malformed(names::DTSTART))?;
    let onset = onset_dt
        .to_naive()
        .ok_or_else(|| ResolveError::InvalidDateTime(onset_dt.to_string()))?;

    let offset_from = child
        .property(names::TZOFFSETFROM)
        .and_then(|p| p.value.as_utc_offset())
        .ok_or_else(|| malformed(names::TZOFFSETFROM))?;
    let offset_to = child
        .property(names::TZOFFSETTO)
        .and_then(|p| p.value.as_utc_offset())
        .ok_or_else(|| malformed(names::TZOFFSETTO))?;

    let rrule = child
        .property(names::RRULE)
        .and_then(Property::as_rrule)
        .cloned();

    let mut rdates = Vec::new();
    for property in child.properties(names::RDATE) {
        match &property.value {
            Value::DateTime(dt) => rdates.push(naive_of(dt)?),
            Value::DateTimeList(list) => {
                for dt in list {
                    rdates.push(naive_of(dt)?);
                }
            }
            _ => return Err(malformed(names::RDATE)),
        }
    }

    Ok(Observance {
        kind,
        onset,
        offset_from,
        offset_to,
        rrule,
        rdates,
        name: child
            .property(names::TZNAME)
            .and_then(Property::as_text)
            .map(str::to_owned),
    })
}

fn naive_of(dt: &DateTime) -> Result<NaiveDateTime, ResolveError> {
    dt.to_naive()
        .ok_or_else(|| ResolveError::InvalidDateTime(dt.to_string()))
}

/// Resolves the UTC offset in effect for a date-time.
///
/// UTC and floating date-times resolve to offset zero; zoned date-times
/// are looked up in `zones` by exact TZID match.
///
/// ## Errors
/// Fails when the TZID has no definition in `zones` or the matched
/// timezone cannot produce an offset.
#[tracing::instrument(skip_all, fields(dt = %dt))]
pub fn resolve(dt: &DateTime, zones: &[VTimezone]) -> Result<UtcOffset, ResolveError> {
    if dt.is_utc() || dt.is_floating() {
        return Ok(UtcOffset::UTC);
    }
    let Some(tzid) = dt.tzid() else {
        return Ok(UtcOffset::UTC);
    };
    let zone = zones
        .iter()
        .find(|z| z.tzid == tzid)
        .ok_or_else(|| ResolveError::UnknownTimezone(tzid.to_owned()))?;
    let at = naive_of(dt)?;
    let offset = zone.offset_at(at)?;
    tracing::debug!(tzid, %offset, "resolved timezone offset");
    Ok(offset)
}

/// Converts a date-time to its UTC wall-clock equivalent.
///
/// ## Errors
/// Same failure modes as [`resolve`], plus unrepresentable results at the
/// edges of the calendar.
pub fn to_utc(dt: &DateTime, zones: &[VTimezone]) -> Result<NaiveDateTime, ResolveError> {
    let offset = resolve(dt, zones)?;
    let naive = naive_of(dt)?;
    naive
        .checked_sub_signed(ChronoDuration::seconds(i64::from(offset.as_seconds())))
        .ok_or_else(|| ResolveError::InvalidDateTime(dt.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::ical::parse::parse;

    const BERLIN: &str = "BEGIN:VCALENDAR\r\n\
        VERSION:2.0\r\n\
        PRODID:-//tsubame//ical//EN\r\n\
        BEGIN:VTIMEZONE\r\n\
        TZID:Europe/Berlin\r\n\
        BEGIN:DAYLIGHT\r\n\
        TZNAME:CEST\r\n\
        DTSTART:19700329T020000\r\n\
        TZOFFSETFROM:+0100\r\n\
        TZOFFSETTO:+0200\r\n\
        RRULE:FREQ=YEARLY;BYMONTH=3;BYDAY=-1SU\r\n\
        END:DAYLIGHT\r\n\
        BEGIN:STANDARD\r\n\
        TZNAME:CET\r\n\
        DTSTART:19701025T030000\r\n\
        TZOFFSETFROM:+0200\r\n\
        TZOFFSETTO:+0100\r\n\
        RRULE:FREQ=YEARLY;BYMONTH=10;BYDAY=-1SU\r\n\
        END:STANDARD\r\n\
        END:VTIMEZONE\r\n\
        END:VCALENDAR\r\n";

    fn berlin() -> VTimezone {
        let calendar = parse(BERLIN).unwrap();
        VTimezone::from_component(calendar.timezones()[0]).unwrap()
    }

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn extracts_observances() {
        let zone = berlin();
        assert_eq!(zone.tzid, "Europe/Berlin");
        assert_eq!(zone.observances.len(), 2);
        let daylight = &zone.observances[0];
        assert_eq!(daylight.kind, ObservanceKind::Daylight);
        assert_eq!(daylight.name.as_deref(), Some("CEST"));
        assert_eq!(daylight.onset, local(1970, 3, 29, 2, 0, 0));
        assert_eq!(daylight.offset_to, UtcOffset::from_seconds(2 * 3600));
        assert!(daylight.rrule.is_some());
    }

    #[test_log::test]
    fn summer_resolves_to_daylight_offset() {
        let dt = DateTime::zoned(2024, 5, 23, 11, 54, 45, "Europe/Berlin");
        let offset = resolve(&dt, &[berlin()]).unwrap();
        assert_eq!(offset.to_string(), "+0200");
        assert_eq!(
            to_utc(&dt, &[berlin()]).unwrap(),
            local(2024, 5, 23, 9, 54, 45)
        );
    }

    #[test_log::test]
    fn winter_resolves_to_standard_offset() {
        let dt = DateTime::zoned(2024, 1, 15, 12, 0, 0, "Europe/Berlin");
        assert_eq!(resolve(&dt, &[berlin()]).unwrap().to_string(), "+0100");
    }

    #[test]
    fn instant_before_all_onsets_is_fatal() {
        let zone = berlin();
        assert_eq!(
            zone.offset_at(local(1969, 6, 1, 0, 0, 0)).unwrap_err(),
            ResolveError::NoApplicableObservance {
                tzid: "Europe/Berlin".into(),
            }
        );
    }

    #[test]
    fn transition_boundary_switches_phase() {
        let zone = berlin();
        // Spring-forward 2024 happens 2024-03-31 at 02:00 local.
        assert_eq!(
            zone.offset_at(local(2024, 3, 31, 1, 59, 59)).unwrap().to_string(),
            "+0100"
        );
        assert_eq!(
            zone.offset_at(local(2024, 3, 31, 2, 0, 0)).unwrap().to_string(),
            "+0200"
        );
    }

    #[test]
    fn utc_and_floating_are_offset_zero() {
        let utc = DateTime::utc(2024, 5, 23, 9, 0, 0);
        let floating = DateTime::floating(2024, 5, 23, 9, 0, 0);
        assert_eq!(resolve(&utc, &[]).unwrap(), UtcOffset::UTC);
        assert_eq!(resolve(&floating, &[]).unwrap(), UtcOffset::UTC);
    }

    #[test]
    fn unknown_tzid_is_fatal() {
        let dt = DateTime::zoned(2024, 5, 23, 9, 0, 0, "America/Nowhere");
        assert_eq!(
            resolve(&dt, &[berlin()]).unwrap_err(),
            ResolveError::UnknownTimezone("America/Nowhere".into())
        );
    }

    #[test]
    fn rdate_observance_transitions() {
        let mut zone = berlin();
        // Replace the daylight rule with explicit transition dates.
        zone.observances[0].rrule = None;
        zone.observances[0].rdates =
            vec![local(2023, 3, 26, 2, 0, 0), local(2024, 3, 31, 2, 0, 0)];
        zone.observances[1].rrule = None;
        zone.observances[1].rdates = vec![local(2023, 10, 29, 3, 0, 0)];
        assert_eq!(
            zone.offset_at(local(2024, 4, 1, 12, 0, 0)).unwrap().to_string(),
            "+0200"
        );
        assert_eq!(
            zone.offset_at(local(2023, 12, 1, 12, 0, 0)).unwrap().to_string(),
            "+0100"
        );
    }

    #[test]
    fn missing_offset_is_malformed() {
        let calendar = parse(BERLIN).unwrap();
        let mut component = calendar.timezones()[0].clone();
        component.children[0]
            .properties
            .retain(|p| p.name != names::TZOFFSETTO);
        assert_eq!(
            VTimezone::from_component(&component).unwrap_err(),
            ResolveError::MalformedObservance {
                tzid: "Europe/Berlin".into(),
                property: names::TZOFFSETTO,
            }
        );
    }
}
