//! Event record and stream error definitions.

use thiserror::Error;

/// One decoded unit of the event stream.
///
/// Records are created by the parser, handed to the supervisor's channel by
/// value and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    /// The stream endpoint this record came from.
    pub source: String,

    /// Declared event name, empty when the stream did not supply one.
    /// Retained for completeness; the forwarding logic does not use it.
    pub event_type: Vec<u8>,

    /// Raw decoded event body. Expected to be a JSON document describing a
    /// webhook delivery, but the parser makes no such assumption.
    pub payload: Vec<u8>,
}

/// Errors that can occur while reading the upstream event stream.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The stream reached end of input. The upstream held the connection
    /// open on purpose, so an ordinary EOF means the connection was lost.
    #[error("lost connection to event stream")]
    ConnectionLost,

    /// Any other read failure on the stream body.
    #[error("stream read error: {0}")]
    Read(#[from] std::io::Error),

    /// The stream request could not be opened.
    #[error("failed to connect to event stream: {0}")]
    Connect(#[from] reqwest::Error),

    /// The stream endpoint answered with a non-success status.
    #[error("event stream endpoint returned status {0}")]
    Status(reqwest::StatusCode),

    /// The consumer side of the pipeline is gone. Fatal: without a
    /// destination there is nothing left to relay to.
    #[error("event channel closed")]
    ChannelClosed,
}

impl StreamError {
    /// Whether the supervisor may recover from this error by reconnecting.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, StreamError::ChannelClosed)
    }
}
