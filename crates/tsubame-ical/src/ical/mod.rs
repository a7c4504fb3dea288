//! iCalendar RFC 5545 implementation.
//!
//! - `core`: Type definitions for iCalendar structures
//! - `parse`: Parsers for iCalendar content
//! - `expand`: Recurrence expansion and timezone offset resolution
//! - `build`: Plain key/value output representation
//!
//! ## Example
//!
//! ```rust
//! use tsubame_ical::ical::parse;
//!
//! let input = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Example//EN\r\nEND:VCALENDAR\r\n";
//! let ical = parse(input).unwrap();
//! assert_eq!(ical.calendars.len(), 1);
//! ```

pub mod build;
pub mod core;
pub mod expand;
pub mod parse;

#[cfg(test)]
mod tests;

// Re-export commonly used items at module level
pub use build::to_plain;
pub use core::{Component, ComponentKind, ICalendar, Parameter, Property};
pub use expand::{
    EventEndError, ExpandError, Occurrences, ResolveError, VTimezone, event_end, expand, resolve,
    to_utc,
};
pub use parse::{ParseError, ParseResult, parse};
