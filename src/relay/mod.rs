//! Relay subsystem: verification and forwarding of stream records.
//!
//! # Data Flow
//! ```text
//! mpsc channel (from stream supervisor)
//!     → decode payload fields (forward.rs)
//!     → body present?            no → drop (logged)
//!     → secret configured?       no → forward
//!     → signature present?       no → drop (logged)
//!     → scheme is sha1=?         no → skip with warning
//!     → HMAC verifies? (verify.rs) no → drop (error log)
//!     → forward.rs (one POST, filtered headers)
//! ```
//!
//! # Design Decisions
//! - Records are processed strictly sequentially; target-side ordering
//!   matches source-side ordering
//! - Every drop is logged with enough context to diagnose
//! - A forwarding failure never touches the supervisor's connection state

pub mod forward;
pub mod verify;

pub use forward::{ForwardError, Forwarder, WebhookPayload};
pub use verify::{valid_signature, SIGNATURE_SCHEME};

use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use url::Url;

use crate::config::RelayConfig;
use crate::stream::{EventRecord, StreamError, StreamSupervisor};

/// Fatal relay errors. Everything recoverable is handled (and logged)
/// inside the pipeline.
#[derive(Debug, Error)]
pub enum RelayError {
    /// An HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// The target URL did not parse.
    #[error("invalid target URL: {0}")]
    TargetUrl(#[from] url::ParseError),

    /// The supervisor ended with a fatal stream error.
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// The supervisor task itself failed.
    #[error("supervisor task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Run the relay pipeline for the lifetime of the process.
///
/// Spawns the stream supervisor as the producer task and consumes its
/// records sequentially. Returns only on a fatal error.
pub async fn run(config: RelayConfig) -> Result<(), RelayError> {
    let connect_timeout = Duration::from_secs(config.timeouts.connect_secs);
    let request_timeout = Duration::from_secs(config.timeouts.request_secs);

    // The upstream client deliberately has no total request timeout: the
    // stream response body is read for as long as the connection lives.
    let upstream_client = reqwest::Client::builder()
        .connect_timeout(connect_timeout)
        .build()?;

    let target_url: Url = config.target.url.parse()?;
    let target_client = reqwest::Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(request_timeout)
        .danger_accept_invalid_certs(config.target.accept_invalid_certs)
        .build()?;
    let forwarder = Forwarder::new(target_client, target_url);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let supervisor = StreamSupervisor::new(
        config.source.url.clone(),
        upstream_client,
        config.reconnect.clone(),
        request_timeout,
        tx,
    );
    let supervisor_task = tokio::spawn(supervisor.run());

    tracing::info!(
        source = %config.source.url,
        target = %config.target.url,
        verification = config.verification_secret().is_some(),
        "relaying webhook events"
    );

    while let Some(record) = rx.recv().await {
        process_record(&record, config.verification_secret(), &forwarder).await;
    }

    // The channel only closes when the supervisor ended, and the
    // supervisor only ends on a fatal error.
    supervisor_task.await??;
    Ok(())
}

/// Verify and forward a single record, logging every drop.
pub async fn process_record(record: &EventRecord, secret: Option<&str>, forwarder: &Forwarder) {
    tracing::debug!(
        source = %record.source,
        event_type = %String::from_utf8_lossy(&record.event_type),
        payload = %String::from_utf8_lossy(&record.payload),
        "received event record"
    );

    let payload = match WebhookPayload::decode(&record.payload) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::info!(error = %e, "discarding record: payload does not decode");
            return;
        }
    };

    let Some(body) = payload.body() else {
        tracing::info!(source = %record.source, "discarding record: no body field");
        return;
    };

    if let Some(secret) = secret {
        let Some(signature) = payload.signature() else {
            tracing::info!(source = %record.source, "discarding record: no signature field");
            return;
        };
        let Some(signature_hex) = signature.strip_prefix(SIGNATURE_SCHEME) else {
            tracing::warn!(
                signature = %signature,
                "skipping record: signature scheme is not sha1"
            );
            return;
        };
        if !valid_signature(&body, signature_hex, secret.as_bytes()) {
            tracing::error!(source = %record.source, "invalid HMAC signature; record dropped");
            return;
        }
    }

    match forwarder.forward(&payload).await {
        Ok(status) => {
            tracing::info!(
                status = %status,
                target = %forwarder.target(),
                "webhook forwarded to target"
            );
        }
        Err(e) => {
            tracing::error!(error = %e, target = %forwarder.target(), "failed to forward webhook");
        }
    }
}
