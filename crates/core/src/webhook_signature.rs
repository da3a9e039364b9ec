//! Stripe webhook signature verification.
//!
//! The `stripe-signature` header looks like `t=1712345678,v1=<hex>,v0=<hex>`.
//! The expected `v1` value is the hex HMAC-SHA256 of `"{t}.{body}"` keyed
//! with the endpoint secret. Several `v1` entries may be present during secret
//! rotation; any one of them matching is enough.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed payload, in seconds.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("Malformed stripe-signature header")]
    MalformedHeader,

    #[error("No v1 signature in stripe-signature header")]
    NoSignature,

    #[error("Webhook timestamp outside the tolerance window")]
    TimestampOutOfTolerance,

    #[error("Webhook signature mismatch")]
    Mismatch,
}

/// Compute the hex `v1` signature for a payload.
pub fn compute_signature(secret: &str, timestamp: i64, body: &[u8]) -> String {
    // HMAC accepts keys of any length, so this never fails.
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a `stripe-signature` header against the raw request body.
///
/// `now` is the current unix time in seconds.
pub fn verify_stripe_signature(
    header: &str,
    body: &[u8],
    secret: &str,
    now: i64,
    tolerance_secs: i64,
) -> Result<(), SignatureError> {
    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<Vec<u8>> = Vec::new();

    for part in header.split(',') {
        let (key, value) = part
            .trim()
            .split_once('=')
            .ok_or(SignatureError::MalformedHeader)?;
        match key {
            "t" => {
                timestamp = Some(value.parse().map_err(|_| SignatureError::MalformedHeader)?);
            }
            "v1" => {
                if let Ok(bytes) = hex::decode(value) {
                    signatures.push(bytes);
                }
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::MalformedHeader)?;
    if signatures.is_empty() {
        return Err(SignatureError::NoSignature);
    }
    if (now - timestamp).abs() > tolerance_secs {
        return Err(SignatureError::TimestampOutOfTolerance);
    }

    let matched = signatures.iter().any(|candidate| {
        HmacSha256::new_from_slice(secret.as_bytes())
            .map(|mut mac| {
                mac.update(timestamp.to_string().as_bytes());
                mac.update(b".");
                mac.update(body);
                mac.verify_slice(candidate).is_ok()
            })
            .unwrap_or(false)
    });

    if matched {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test";
    const BODY: &[u8] = br#"{"type":"customer.subscription.deleted"}"#;
    const NOW: i64 = 1_712_345_678;

    fn header(ts: i64, secret: &str) -> String {
        format!("t={ts},v1={}", compute_signature(secret, ts, BODY))
    }

    #[test]
    fn signature_is_lowercase_hex() {
        let sig = compute_signature(SECRET, NOW, BODY);
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn valid_signature_passes() {
        assert_eq!(
            verify_stripe_signature(&header(NOW, SECRET), BODY, SECRET, NOW + 10, DEFAULT_TOLERANCE_SECS),
            Ok(())
        );
    }

    #[test]
    fn any_v1_entry_may_match() {
        let h = format!("t={NOW},v1=deadbeef,v0=abc,{}", &header(NOW, SECRET)[format!("t={NOW},").len()..]);
        assert_eq!(
            verify_stripe_signature(&h, BODY, SECRET, NOW, DEFAULT_TOLERANCE_SECS),
            Ok(())
        );
    }

    #[test]
    fn wrong_secret_fails() {
        assert_eq!(
            verify_stripe_signature(&header(NOW, "other"), BODY, SECRET, NOW, DEFAULT_TOLERANCE_SECS),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn tampered_body_fails() {
        assert_eq!(
            verify_stripe_signature(&header(NOW, SECRET), b"{}", SECRET, NOW, DEFAULT_TOLERANCE_SECS),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn stale_timestamp_fails() {
        assert_eq!(
            verify_stripe_signature(&header(NOW, SECRET), BODY, SECRET, NOW + 301, DEFAULT_TOLERANCE_SECS),
            Err(SignatureError::TimestampOutOfTolerance)
        );
    }

    #[test]
    fn malformed_headers() {
        assert_eq!(
            verify_stripe_signature("garbage", BODY, SECRET, NOW, 300),
            Err(SignatureError::MalformedHeader)
        );
        assert_eq!(
            verify_stripe_signature("v1=abcd", BODY, SECRET, NOW, 300),
            Err(SignatureError::MalformedHeader)
        );
        assert_eq!(
            verify_stripe_signature(&format!("t={NOW}"), BODY, SECRET, NOW, 300),
            Err(SignatureError::NoSignature)
        );
    }
}
