//! Projections of the parsed component tree into other shapes.

mod plain;

pub use plain::to_plain;
