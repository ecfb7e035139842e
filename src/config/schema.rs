//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the webhook relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Upstream event-stream source.
    pub source: SourceConfig,

    /// Local target the webhooks are forwarded to.
    pub target: TargetConfig,

    /// Shared secret for HMAC-SHA1 payload verification.
    /// Empty or absent disables verification.
    pub secret: Option<String>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Reconnect policy for the upstream stream.
    pub reconnect: ReconnectConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl RelayConfig {
    /// The configured secret, if verification is enabled.
    ///
    /// An empty string counts as "no secret configured".
    pub fn verification_secret(&self) -> Option<&str> {
        self.secret.as_deref().filter(|s| !s.is_empty())
    }
}

/// Upstream source configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SourceConfig {
    /// URL of the webhook proxy channel
    /// (e.g., "https://smee.io/VyOocXe0HCKwlSj").
    pub url: String,
}

/// Forwarding target configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Full URL of the service events are forwarded to
    /// (e.g., "http://jenkins.local:8080/github-webhook/").
    pub url: String,

    /// Disable TLS certificate verification for the target connection only.
    pub accept_invalid_certs: bool,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            accept_invalid_certs: false,
        }
    }
}

/// Timeout configuration for outbound operations.
///
/// The upstream stream read itself is never bounded by these values; the
/// stream connection is intentionally long-lived.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds (both clients).
    pub connect_secs: u64,

    /// Request timeout in seconds for the pre-flight reachability probe
    /// and for each forwarded request to the target.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 120,
        }
    }
}

/// Reconnect delay policy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconnectPolicy {
    /// Constant delay between attempts.
    Fixed,
    /// Exponential growth with jitter, capped at `max_delay_ms`.
    Exponential,
}

/// Reconnect configuration for the stream supervisor.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReconnectConfig {
    /// Delay policy between reconnect attempts.
    pub policy: ReconnectPolicy,

    /// Base delay in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay in milliseconds (exponential policy cap).
    pub max_delay_ms: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            policy: ReconnectPolicy::Exponential,
            base_delay_ms: 1_000,
            max_delay_ms: 60_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
