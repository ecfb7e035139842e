//! Event-stream subsystem.
//!
//! # Data Flow
//! ```text
//! Upstream GET (Accept: text/event-stream)
//!     → response body (live byte stream)
//!     → parser.rs (line framing, field grammar, record assembly)
//!     → EventRecord
//!     → supervisor.rs (reconnection, channel hand-off)
//!     → mpsc channel to the relay loop
//!
//! Supervisor states:
//!     connecting → streaming → (error) → reconnecting → connecting
//! ```
//!
//! # Design Decisions
//! - The parser never resumes a closed source; resumption belongs to the
//!   supervisor alone
//! - Records cross the task boundary by value; the channel is the only
//!   synchronization primitive
//! - Delivery is in emission order, at-most-once

pub mod event;
pub mod parser;
pub mod supervisor;

pub use event::{EventRecord, StreamError};
pub use parser::EventStreamParser;
pub use supervisor::StreamSupervisor;
