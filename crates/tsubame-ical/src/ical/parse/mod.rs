//! iCalendar parsing (RFC 5545).
//!
//! - Lexer: content line splitting with unfolding
//! - Parameters: known-parameter validation
//! - Values: typed value parsing (DATE, DURATION, RECUR, ...)
//! - Schema: per-component cardinality rules
//! - Parser: full document parsing into the component tree

mod error;
mod lexer;
mod parameters;
mod parser;
mod schema;
mod values;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use lexer::{parse_content_line, split_lines, unfold};
pub use parser::parse;
pub use values::{
    parse_boolean, parse_date, parse_datetime, parse_duration, parse_float, parse_integer,
    parse_period, parse_rrule, parse_time, parse_utc_offset, unescape_text,
};
