//! Recurrence expansion and timezone offset resolution.
//!
//! - `recur`: lazy pull-based RRULE expansion (RFC 5545 §3.3.10)
//! - `timezone`: UTC offset resolution against VTIMEZONE observances
//! - `event`: end-instant derivation for VEVENTs

mod event;
mod recur;
mod timezone;

pub use event::{EventEndError, event_end};
pub use recur::{ExpandError, Occurrences, expand};
pub use timezone::{Observance, ObservanceKind, ResolveError, VTimezone, resolve, to_utc};
