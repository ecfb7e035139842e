//! Webhook event-stream relay.
//!
//! Relays webhook events delivered over a long-lived server-pushed event
//! stream to a local HTTP target, optionally verifying an HMAC-SHA1
//! signature before forwarding. Used to expose a locally running service
//! to a remote webhook source without the source reaching the local
//! network directly.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌────────────────────────────────────────────────────┐
//!                 │                  WEBHOOK RELAY                     │
//!                 │                                                    │
//!  Event stream   │  ┌─────────┐     ┌────────────┐     ┌──────────┐   │
//!  ───────────────┼─▶│ stream  │────▶│  stream    │────▶│  relay   │   │
//!  (server push)  │  │ parser  │     │ supervisor │     │  loop    │   │
//!                 │  └─────────┘     └────────────┘     └────┬─────┘   │
//!                 │                   reconnects on          │         │
//!                 │                   disconnect             ▼         │
//!                 │                                   ┌──────────┐     │
//!                 │                                   │  verify  │     │
//!                 │                                   │ (HMAC)   │     │
//!                 │                                   └────┬─────┘     │
//!                 │                                        ▼           │
//!  Local target   │                                 ┌──────────┐      │
//!  ◀──────────────┼─────────────────────────────────│ forward  │      │
//!  (HTTP POST)    │                                 └──────────┘      │
//!                 │                                                    │
//!                 │  ┌──────────────────────────────────────────────┐  │
//!                 │  │           Cross-Cutting Concerns             │  │
//!                 │  │  ┌────────┐ ┌────────────┐ ┌─────────────┐   │  │
//!                 │  │  │ config │ │ resilience │ │observability│   │  │
//!                 │  │  └────────┘ └────────────┘ └─────────────┘   │  │
//!                 │  └──────────────────────────────────────────────┘  │
//!                 └────────────────────────────────────────────────────┘
//! ```
//!
//! One producer task runs the supervisor's fetch-and-parse loop; the relay
//! loop consumes from a single channel and forwards strictly in order.

// Core subsystems
pub mod config;
pub mod relay;
pub mod stream;

// Cross-cutting concerns
pub mod observability;
pub mod resilience;

pub use config::RelayConfig;
pub use relay::Forwarder;
pub use stream::{EventRecord, StreamSupervisor};
