//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Stream disconnect or failed open:
//!     → supervisor asks backoff.rs for the next delay
//!     → sleeps, then reconnects
//! ```
//!
//! # Design Decisions
//! - The delay policy is configuration, not a constant; observed upstream
//!   deployments disagree on the right value
//! - Forwarding failures are never retried; only the stream reconnects

pub mod backoff;
