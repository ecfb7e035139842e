//! Payload signature verification.
//!
//! # Responsibilities
//! - Compute HMAC-SHA1 over a candidate payload with the shared secret
//! - Compare against the supplied hex signature in constant time
//!
//! # Design Decisions
//! - Malformed hex is a verification failure, never a crash
//! - The scheme prefix (`sha1=`) is the caller's concern; this module only
//!   sees the hex digest

use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Signature scheme prefix this relay understands.
pub const SIGNATURE_SCHEME: &str = "sha1=";

/// Reports whether `signature_hex` is a valid HMAC-SHA1 tag for `payload`
/// under `secret`.
///
/// The comparison is constant-time with respect to the computed digest.
pub fn valid_signature(payload: &[u8], signature_hex: &str, secret: &[u8]) -> bool {
    let supplied = match hex::decode(signature_hex) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "signature is not valid hex");
            return false;
        }
    };

    // HMAC accepts keys of any length; this cannot fail in practice.
    let Ok(mut mac) = HmacSha1::new_from_slice(secret) else {
        return false;
    };
    mac.update(payload);
    mac.verify_slice(&supplied).is_ok()
}
