//! End-to-end scenarios over the full parse/expand/resolve pipeline.

mod scenarios;
