//! iCalendar (RFC 5545) data engine.
//!
//! Parses iCalendar text into a typed component tree, expands recurrence
//! rules into lazy occurrence sequences, and resolves local times against
//! calendar-embedded VTIMEZONE definitions.

pub mod ical;
