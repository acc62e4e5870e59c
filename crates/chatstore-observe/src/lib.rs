//! Observability helpers for chatstore: subscriber setup and the span
//! field names shared by store and repository instrumentation.

pub mod store_attrs;
pub mod tracing_setup;
