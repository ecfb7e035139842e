//! Webhook forwarding stage.
//!
//! # Responsibilities
//! - Decode a record's payload into its body and header-like fields
//! - Select which inbound fields become outbound headers
//! - Replay the body as a POST against the configured target
//!
//! # Design Decisions
//! - Field values are kept as raw JSON text so the body is forwarded
//!   byte-for-byte as it appeared on the stream
//! - Header selection: keys with the case-sensitive `x-` prefix, plus
//!   `content-type` matched case-insensitively. The asymmetry is the
//!   upstream contract, not an oversight
//! - No retries; a failed forward drops that record only

use std::collections::BTreeMap;

use serde_json::value::RawValue;
use thiserror::Error;
use url::Url;

/// Field name carrying the original webhook body.
const BODY_FIELD: &str = "body";

/// Field name carrying the payload signature.
const SIGNATURE_FIELD: &str = "x-hub-signature";

/// Errors from decoding or forwarding one record.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// The payload was not a JSON object.
    #[error("payload is not a JSON object: {0}")]
    Decode(#[from] serde_json::Error),

    /// The payload object has no `body` field.
    #[error("payload has no body field")]
    MissingBody,

    /// The POST to the target failed.
    #[error("target request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// A record payload decoded into its header-like fields.
///
/// Values stay as raw JSON text: a string field is unescaped on access,
/// anything else is passed through as its literal JSON rendering.
pub struct WebhookPayload {
    fields: BTreeMap<String, Box<RawValue>>,
}

impl WebhookPayload {
    /// Decode a payload into its fields.
    pub fn decode(payload: &[u8]) -> Result<Self, ForwardError> {
        let fields = serde_json::from_slice(payload)?;
        Ok(Self { fields })
    }

    /// Raw bytes of the `body` field, exactly as they appeared inbound.
    pub fn body(&self) -> Option<Vec<u8>> {
        self.fields.get(BODY_FIELD).map(|raw| raw_bytes(raw))
    }

    /// The `x-hub-signature` field, when present and a string.
    pub fn signature(&self) -> Option<String> {
        self.fields
            .get(SIGNATURE_FIELD)
            .and_then(|raw| serde_json::from_str(raw.get()).ok())
    }

    /// The fields selected for outbound headers.
    pub fn forwarded_headers(&self) -> impl Iterator<Item = (&str, String)> {
        self.fields
            .iter()
            .filter(|(key, _)| is_forwarded_header(key))
            .map(|(key, raw)| (key.as_str(), raw_text(raw)))
    }
}

/// The exact header-selection rule: `x-` prefix checked case-sensitively,
/// `content-type` checked case-insensitively.
fn is_forwarded_header(key: &str) -> bool {
    key.starts_with("x-") || key.to_lowercase() == "content-type"
}

fn raw_bytes(raw: &RawValue) -> Vec<u8> {
    match serde_json::from_str::<String>(raw.get()) {
        Ok(s) => s.into_bytes(),
        Err(_) => raw.get().as_bytes().to_vec(),
    }
}

fn raw_text(raw: &RawValue) -> String {
    serde_json::from_str::<String>(raw.get()).unwrap_or_else(|_| raw.get().to_string())
}

/// Sends validated records to the target service.
pub struct Forwarder {
    client: reqwest::Client,
    target: Url,
}

impl Forwarder {
    /// Create a forwarder posting to `target`.
    pub fn new(client: reqwest::Client, target: Url) -> Self {
        Self { client, target }
    }

    /// The configured target URL.
    pub fn target(&self) -> &Url {
        &self.target
    }

    /// Perform exactly one outbound POST for a validated payload.
    pub async fn forward(&self, payload: &WebhookPayload) -> Result<reqwest::StatusCode, ForwardError> {
        let body = payload.body().ok_or(ForwardError::MissingBody)?;

        let mut request = self.client.post(self.target.clone()).body(body);
        for (key, value) in payload.forwarded_headers() {
            request = request.header(key, value);
        }

        let response = request.send().await?;
        Ok(response.status())
    }
}

impl std::fmt::Debug for Forwarder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forwarder")
            .field("target", &self.target.as_str())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_object_is_byte_exact() {
        let payload =
            WebhookPayload::decode(br#"{"body":{"action":"opened","number":1}}"#).unwrap();
        assert_eq!(
            payload.body().unwrap(),
            br#"{"action":"opened","number":1}"#
        );
    }

    #[test]
    fn test_body_string_is_unescaped() {
        let payload = WebhookPayload::decode(br#"{"body":"line1\nline2"}"#).unwrap();
        assert_eq!(payload.body().unwrap(), b"line1\nline2");
    }

    #[test]
    fn test_missing_body() {
        let payload = WebhookPayload::decode(br#"{"x-github-event":"push"}"#).unwrap();
        assert!(payload.body().is_none());
    }

    #[test]
    fn test_non_object_payload_rejected() {
        assert!(WebhookPayload::decode(b"[1,2,3]").is_err());
        assert!(WebhookPayload::decode(b"not json").is_err());
    }

    #[test]
    fn test_signature_extraction() {
        let payload =
            WebhookPayload::decode(br#"{"body":"b","x-hub-signature":"sha1=abcd"}"#).unwrap();
        assert_eq!(payload.signature().as_deref(), Some("sha1=abcd"));

        let payload = WebhookPayload::decode(br#"{"body":"b"}"#).unwrap();
        assert!(payload.signature().is_none());
    }

    #[test]
    fn test_header_selection_rule() {
        let payload = WebhookPayload::decode(
            br#"{"body":"b","x-github-event":"push","Content-Type":"application/json","other":"x"}"#,
        )
        .unwrap();
        let headers: BTreeMap<_, _> = payload.forwarded_headers().collect();
        assert_eq!(headers.get("x-github-event").map(String::as_str), Some("push"));
        assert_eq!(
            headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
        assert!(!headers.contains_key("other"));
        assert!(!headers.contains_key("body"));
    }

    #[test]
    fn test_x_prefix_is_case_sensitive() {
        let payload = WebhookPayload::decode(
            br#"{"body":"b","X-GitHub-Event":"push","x-github-delivery":"d-1"}"#,
        )
        .unwrap();
        let headers: BTreeMap<_, _> = payload.forwarded_headers().collect();
        assert!(!headers.contains_key("X-GitHub-Event"));
        assert!(headers.contains_key("x-github-delivery"));
    }

    #[test]
    fn test_content_type_is_case_insensitive() {
        let payload =
            WebhookPayload::decode(br#"{"body":"b","CONTENT-TYPE":"text/plain"}"#).unwrap();
        let headers: BTreeMap<_, _> = payload.forwarded_headers().collect();
        assert_eq!(headers.get("CONTENT-TYPE").map(String::as_str), Some("text/plain"));
    }

    #[test]
    fn test_non_string_header_values_use_literal_json() {
        let payload = WebhookPayload::decode(br#"{"body":"b","x-retry-count":3}"#).unwrap();
        let headers: BTreeMap<_, _> = payload.forwarded_headers().collect();
        assert_eq!(headers.get("x-retry-count").map(String::as_str), Some("3"));
    }
}
