//! Parse error types with source position attribution.

use std::error::Error;
use std::fmt;

/// Result alias for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// A parse failure with its source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// What went wrong.
    pub kind: ParseErrorKind,
    /// 1-based physical line number of the logical line.
    pub line: usize,
    /// 0-based column within the logical line.
    pub column: usize,
    /// Optional free-form detail.
    pub context: Option<String>,
}

impl ParseError {
    /// Creates an error at the given position.
    #[must_use]
    pub const fn new(kind: ParseErrorKind, line: usize, column: usize) -> Self {
        Self {
            kind,
            line,
            column,
            context: None,
        }
    }

    /// Attaches free-form context to the error.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "`{}` at line {}, column {}",
            self.kind, self.line, self.column
        )?;
        if let Some(context) = &self.context {
            write!(f, ": {context}")?;
        }
        Ok(())
    }
}

impl Error for ParseError {}

/// The categories of parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Content line has no colon separating name from value.
    MissingColon,
    /// Property name contains invalid characters.
    InvalidPropertyName,
    /// Malformed parameter (missing `=`, empty name, ...).
    InvalidParameter,
    /// Parameter value not permitted for this parameter.
    InvalidParameterValue,
    /// Parameter not defined for a standard property.
    UnknownParameter,
    /// Quoted parameter value never closed.
    UnclosedQuote,
    /// Malformed DATE value.
    InvalidDate,
    /// Malformed TIME value.
    InvalidTime,
    /// Malformed DATE-TIME value.
    InvalidDateTime,
    /// Malformed DURATION value.
    InvalidDuration,
    /// Malformed PERIOD value.
    InvalidPeriod,
    /// Malformed UTC-OFFSET value.
    InvalidUtcOffset,
    /// Malformed RECUR value.
    InvalidRecur,
    /// Malformed INTEGER value.
    InvalidInteger,
    /// Malformed FLOAT value.
    InvalidFloat,
    /// Malformed BOOLEAN value.
    InvalidBoolean,
    /// Unknown FREQ part in a RECUR value.
    InvalidFrequency,
    /// Unknown weekday code in a RECUR value.
    InvalidWeekday,
    /// RECUR value carries both COUNT and UNTIL.
    UntilCountConflict,
    /// RECUR value has no FREQ part.
    MissingFrequency,
    /// RECUR numeric part outside its documented range.
    RecurValueOutOfRange,
    /// END line without a matching BEGIN.
    MismatchedEnd,
    /// Input ended inside an open component.
    MissingEnd,
    /// BEGIN names a component this engine does not know.
    UnknownComponent,
    /// A known component appeared where its parent does not allow it.
    UnexpectedComponent,
    /// A property appeared outside any component, or is not known.
    UnexpectedProperty,
    /// A singleton property appeared twice in one component.
    DuplicateProperty,
    /// Two mutually exclusive properties are both present.
    ConflictingProperties,
    /// A mandatory property is absent.
    MissingRequiredProperty,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::MissingColon => "missing ':' in content line",
            Self::InvalidPropertyName => "invalid property name",
            Self::InvalidParameter => "invalid parameter",
            Self::InvalidParameterValue => "invalid parameter value",
            Self::UnknownParameter => "unknown parameter",
            Self::UnclosedQuote => "unclosed quote in parameter value",
            Self::InvalidDate => "invalid DATE value",
            Self::InvalidTime => "invalid TIME value",
            Self::InvalidDateTime => "invalid DATE-TIME value",
            Self::InvalidDuration => "invalid DURATION value",
            Self::InvalidPeriod => "invalid PERIOD value",
            Self::InvalidUtcOffset => "invalid UTC-OFFSET value",
            Self::InvalidRecur => "invalid RECUR value",
            Self::InvalidInteger => "invalid INTEGER value",
            Self::InvalidFloat => "invalid FLOAT value",
            Self::InvalidBoolean => "invalid BOOLEAN value",
            Self::InvalidFrequency => "invalid recurrence frequency",
            Self::InvalidWeekday => "invalid weekday",
            Self::UntilCountConflict => "RECUR value has both COUNT and UNTIL",
            Self::MissingFrequency => "RECUR value is missing FREQ",
            Self::RecurValueOutOfRange => "RECUR value out of range",
            Self::MismatchedEnd => "mismatched END",
            Self::MissingEnd => "unexpected end of input, missing END",
            Self::UnknownComponent => "unknown component",
            Self::UnexpectedComponent => "component not allowed here",
            Self::UnexpectedProperty => "property not allowed here",
            Self::DuplicateProperty => "duplicate property",
            Self::ConflictingProperties => "conflicting properties",
            Self::MissingRequiredProperty => "missing required property",
        };
        f.write_str(message)
    }
}
