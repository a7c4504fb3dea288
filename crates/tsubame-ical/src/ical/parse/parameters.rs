//! Known-parameter validation (RFC 5545 §3.2).

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::ical::core::{ContentLine, is_non_standard_name};

/// How a known parameter's values are constrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamKind {
    /// One free-form value.
    Single,
    /// Any number of free-form values.
    List,
    /// One value from a fixed set.
    Enum(&'static [&'static str]),
}

/// The static parameter table. Unlisted names are unknown.
fn known_parameter(name: &str) -> Option<ParamKind> {
    match name {
        "ALTREP" | "CN" | "CUTYPE" | "DIR" | "EMAIL" | "FBTYPE" | "FMTTYPE" | "LABEL"
        | "LANGUAGE" | "PARTSTAT" | "RELTYPE" | "ROLE" | "SENT-BY" | "TZID" | "VALUE" => {
            Some(ParamKind::Single)
        }
        "DELEGATED-FROM" | "DELEGATED-TO" | "DISPLAY" | "FEATURE" | "MEMBER" => {
            Some(ParamKind::List)
        }
        "ENCODING" => Some(ParamKind::Enum(&["8BIT", "BASE64"])),
        "RANGE" => Some(ParamKind::Enum(&["THISANDFUTURE"])),
        "RELATED" => Some(ParamKind::Enum(&["START", "END"])),
        "RSVP" => Some(ParamKind::Enum(&["TRUE", "FALSE"])),
        _ => None,
    }
}

/// Validates every parameter of a content line.
///
/// `standard_property` is whether the property name itself is a standard
/// one; unknown parameters are only fatal there. `X-`/`IANA-` parameters
/// pass through opaquely everywhere.
///
/// ## Errors
/// Returns an error for an unknown parameter on a standard property, a
/// value outside an enum parameter's set, or multiple values on a
/// single-valued parameter.
pub fn validate_parameters(
    line: &ContentLine,
    standard_property: bool,
    line_no: usize,
) -> ParseResult<()> {
    for param in &line.params {
        if is_non_standard_name(&param.name) {
            continue;
        }
        let Some(kind) = known_parameter(&param.name) else {
            if standard_property {
                return Err(
                    ParseError::new(ParseErrorKind::UnknownParameter, line_no, 0).with_context(
                        format!("parameter '{}' on property '{}'", param.name, line.name),
                    ),
                );
            }
            continue;
        };
        match kind {
            ParamKind::List => {}
            ParamKind::Single => {
                if param.values.len() > 1 {
                    return Err(
                        ParseError::new(ParseErrorKind::InvalidParameterValue, line_no, 0)
                            .with_context(format!(
                                "parameter '{}' does not allow multiple values",
                                param.name
                            )),
                    );
                }
            }
            ParamKind::Enum(allowed) => {
                for value in &param.values {
                    let upper = value.to_ascii_uppercase();
                    if !allowed.contains(&upper.as_str()) {
                        return Err(
                            ParseError::new(ParseErrorKind::InvalidParameterValue, line_no, 0)
                                .with_context(format!(
                                    "'{value}' is not a valid value for parameter '{}'",
                                    param.name
                                )),
                        );
                    }
                }
            }
        }
    }
    Ok(())
}
