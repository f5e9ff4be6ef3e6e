//! Subscription plans and payments webhook signature verification.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Plans
// ---------------------------------------------------------------------------

/// Plan every user starts on and falls back to when a subscription ends.
pub const FREE_PLAN: &str = "free";

/// Plans offered through checkout, with their monthly price in USD cents.
pub const PAID_PLANS: &[(&str, i64)] = &[("starter", 2_000), ("builder", 5_000), ("pro", 10_000)];

/// Currency used for every checkout session.
pub const CURRENCY: &str = "usd";

/// Monthly price of a paid plan in cents, or `None` for unknown plans.
pub fn plan_price_cents(plan_id: &str) -> Option<i64> {
    PAID_PLANS
        .iter()
        .find(|(id, _)| *id == plan_id)
        .map(|(_, cents)| *cents)
}

/// Validate a plan requested for checkout.
pub fn validate_plan(plan_id: &str) -> Result<i64, CoreError> {
    plan_price_cents(plan_id).ok_or_else(|| {
        let names: Vec<&str> = PAID_PLANS.iter().map(|(id, _)| *id).collect();
        CoreError::Validation(format!(
            "Invalid plan '{plan_id}'. Must be one of: {names:?}"
        ))
    })
}

/// Capitalised plan name for checkout line items.
pub fn plan_display_name(plan_id: &str) -> String {
    let mut chars = plan_id.chars();
    match chars.next() {
        Some(first) => format!("{}{} Plan", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Webhook signatures
// ---------------------------------------------------------------------------

type HmacSha256 = Hmac<Sha256>;

/// Default accepted clock skew between the signed timestamp and now.
pub const DEFAULT_SIGNATURE_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("Signature header is malformed")]
    MalformedHeader,

    #[error("Signature header has no timestamp")]
    MissingTimestamp,

    #[error("Signature header has no v1 signature")]
    MissingSignature,

    #[error("Signature timestamp is outside the tolerance window")]
    TimestampOutOfTolerance,

    #[error("No signature matches the payload")]
    Mismatch,
}

/// Sign a payload the way the payments provider does.
///
/// Returns a complete header value, `t=<timestamp>,v1=<hex>`.
pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mac = signed_mac(payload, secret, timestamp);
    format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
}

/// Verify a webhook signature header against the raw request body.
///
/// Any of several `v1` entries may match, which lets the provider roll
/// secrets. `now` is unix seconds.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> Result<(), SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let (key, value) = part
            .trim()
            .split_once('=')
            .ok_or(SignatureError::MalformedHeader)?;
        match key {
            "t" => {
                timestamp = Some(
                    value
                        .parse::<i64>()
                        .map_err(|_| SignatureError::MalformedHeader)?,
                )
            }
            "v1" => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::MissingTimestamp)?;
    if signatures.is_empty() {
        return Err(SignatureError::MissingSignature);
    }
    if now.abs_diff(timestamp) > tolerance_secs.unsigned_abs() {
        return Err(SignatureError::TimestampOutOfTolerance);
    }

    let matched = signatures.iter().any(|candidate| {
        hex::decode(candidate).is_ok_and(|expected| {
            signed_mac(payload, secret, timestamp)
                .verify_slice(&expected)
                .is_ok()
        })
    });

    if matched {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

fn signed_mac(payload: &[u8], secret: &str, timestamp: i64) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    mac
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
