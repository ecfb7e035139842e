//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured `tracing` events throughout; components never format
//!   their own output
//! - Every dropped record and every reconnect logs enough context (source
//!   URL, connection id, record excerpt) to diagnose from logs alone
//! - Log level comes from config, overridable via `RUST_LOG`

pub mod logging;
