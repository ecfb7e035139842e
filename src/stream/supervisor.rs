//! Stream supervision and reconnection.
//!
//! # Responsibilities
//! - Own the lifecycle of one upstream connection at a time
//! - Probe the source for reachability before entering streaming mode
//! - Feed parser output into the relay channel verbatim
//! - Replace a dead connection after a policy-controlled delay
//!
//! # Design Decisions
//! - Transient errors are always retried; the loop has no terminal state
//!   under normal operation
//! - The only fatal condition is a closed destination channel, surfaced as
//!   an `Err` from `run` instead of a panic
//! - The upstream client carries no total request timeout; only the
//!   pre-flight probe is deadline-bounded

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::TryStreamExt;
use reqwest::header::{ACCEPT, USER_AGENT};
use tokio::sync::mpsc;
use tokio_util::io::StreamReader;

use crate::config::ReconnectConfig;
use crate::resilience::backoff::reconnect_delay;
use crate::stream::event::{EventRecord, StreamError};
use crate::stream::parser::EventStreamParser;

/// Global atomic counter for connection IDs.
/// Relaxed ordering is sufficient since we only need uniqueness.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for one upstream connection attempt, for log
/// correlation across reconnects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// How one streaming session ended.
enum SessionEnd {
    /// The stream died; carries the number of records it delivered first.
    Disconnected(StreamError, u64),
    /// The consumer dropped the channel. Fatal.
    ChannelClosed,
}

/// Keeps exactly one record sequence flowing to the relay loop for the
/// process lifetime, transparently replacing dead upstream connections.
pub struct StreamSupervisor {
    source: String,
    client: reqwest::Client,
    reconnect: ReconnectConfig,
    probe_timeout: Duration,
    tx: mpsc::UnboundedSender<EventRecord>,
}

impl StreamSupervisor {
    /// Create a supervisor for `source`.
    ///
    /// `client` must be configured without a total request timeout; the
    /// stream connection is intentionally long-lived.
    pub fn new(
        source: impl Into<String>,
        client: reqwest::Client,
        reconnect: ReconnectConfig,
        probe_timeout: Duration,
        tx: mpsc::UnboundedSender<EventRecord>,
    ) -> Self {
        Self {
            source: source.into(),
            client,
            reconnect,
            probe_timeout,
            tx,
        }
    }

    /// Run the supervision loop.
    ///
    /// Returns only on the fatal condition: the destination channel was
    /// closed by its consumer.
    pub async fn run(self) -> Result<(), StreamError> {
        let mut attempt: u32 = 0;

        loop {
            let conn_id = ConnectionId::new();

            match self.stream_once(conn_id).await {
                Ok(SessionEnd::Disconnected(err, delivered)) => {
                    tracing::warn!(
                        connection_id = %conn_id,
                        source = %self.source,
                        error = %err,
                        records = delivered,
                        "event stream disconnected"
                    );
                    if delivered > 0 {
                        attempt = 0;
                    }
                }
                Ok(SessionEnd::ChannelClosed) => {
                    tracing::error!(
                        connection_id = %conn_id,
                        "relay consumer is gone; stopping supervisor"
                    );
                    return Err(StreamError::ChannelClosed);
                }
                Err(err) => {
                    tracing::warn!(
                        connection_id = %conn_id,
                        source = %self.source,
                        error = %err,
                        "could not open event stream"
                    );
                }
            }

            attempt = attempt.saturating_add(1);
            let delay = reconnect_delay(&self.reconnect, attempt);
            tracing::info!(
                source = %self.source,
                attempt,
                delay_ms = delay.as_millis() as u64,
                "reconnecting to event stream"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// One pass of the state machine: probe, open, then pump the stream
    /// until it dies.
    async fn stream_once(&self, conn_id: ConnectionId) -> Result<SessionEnd, StreamError> {
        self.probe().await?;

        let response = self
            .client
            .get(&self.source)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::Status(status));
        }

        tracing::info!(
            connection_id = %conn_id,
            source = %self.source,
            "event stream connected"
        );

        let body = StreamReader::new(response.bytes_stream().map_err(std::io::Error::other));
        let mut parser = EventStreamParser::new(self.source.clone(), Box::pin(body));
        let mut delivered: u64 = 0;

        while let Some(item) = parser.next_record().await {
            match item {
                Ok(record) => {
                    if self.tx.send(record).is_err() {
                        return Ok(SessionEnd::ChannelClosed);
                    }
                    delivered += 1;
                }
                Err(err) => return Ok(SessionEnd::Disconnected(err, delivered)),
            }
        }

        // Unreachable in practice: the parser always ends with an error.
        Ok(SessionEnd::Disconnected(StreamError::ConnectionLost, delivered))
    }

    /// Pre-flight reachability check.
    ///
    /// Any HTTP response proves the source is reachable; only transport
    /// errors and the deadline count as failures.
    async fn probe(&self) -> Result<(), StreamError> {
        let request = self
            .client
            .get(&self.source)
            .header(USER_AGENT, "webhook-relay-preflight")
            .send();

        match tokio::time::timeout(self.probe_timeout, request).await {
            Ok(Ok(response)) => {
                let status = response.status();
                if !status.is_success() {
                    tracing::warn!(
                        source = %self.source,
                        status = %status,
                        "pre-flight probe returned non-success status"
                    );
                }
                Ok(())
            }
            Ok(Err(e)) => Err(StreamError::Connect(e)),
            Err(_) => Err(StreamError::Read(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "pre-flight probe timed out",
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_id_unique() {
        let id1 = ConnectionId::new();
        let id2 = ConnectionId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn connection_id_display() {
        let id = ConnectionId(7);
        assert_eq!(id.to_string(), "conn-7");
    }
}
