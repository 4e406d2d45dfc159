//! Bearer token inspection.
//!
//! Reads the expiry claim of a JWT without verifying its signature. The
//! client only uses this to decide when to refresh; the backend remains the
//! authority on whether a token is valid.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Seconds of remaining lifetime below which a token counts as expiring.
pub const DEFAULT_EXPIRY_THRESHOLD_SECS: i64 = 120;

/// Errors from decoding a token's claims.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Not three dot-separated segments.
    #[error("Token is not a JWT")]
    Malformed,

    /// The payload segment is not base64url.
    #[error("Token payload encoding error: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// The payload is not a JSON object with an `exp` claim.
    #[error("Token claims error: {0}")]
    Claims(#[from] serde_json::Error),
}

/// The registered claims the client cares about.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    /// Expiry, as a Unix timestamp. Fractional seconds are floored.
    #[serde(deserialize_with = "unix_seconds")]
    pub exp: i64,
    /// Subject (user id), if present.
    #[serde(default)]
    pub sub: Option<String>,
}

/// NumericDate allows non-integer values.
#[allow(clippy::cast_possible_truncation)]
fn unix_seconds<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(secs) = number.as_i64() {
        return Ok(secs);
    }
    match number.as_f64() {
        Some(secs) if secs.is_finite() => Ok(secs.floor() as i64),
        _ => Err(D::Error::custom(format!(
            "exp is not a Unix timestamp: {number}"
        ))),
    }
}

/// Decode the payload of `token` without checking its signature.
///
/// # Errors
///
/// Returns `TokenError` if the token is not a JWT or its payload lacks a
/// numeric `exp` claim.
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let mut segments = token.trim().split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(TokenError::Malformed);
    };

    // Accept standard-alphabet and padded payloads as well.
    let normalized: String = payload
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    let bytes = URL_SAFE_NO_PAD.decode(normalized)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Seconds until `token` expires, relative to the Unix timestamp `now`.
///
/// Negative once expired.
///
/// # Errors
///
/// Returns `TokenError` if the expiry cannot be decoded.
pub fn expires_in(token: &str, now: i64) -> Result<i64, TokenError> {
    Ok(decode_claims(token)?.exp.saturating_sub(now))
}

/// Whether `token` has less than `seconds` of lifetime left at `now`.
///
/// A token whose expiry cannot be read counts as expiring, so it gets
/// refreshed or cleared instead of lingering.
#[must_use]
pub fn expires_within(token: &str, seconds: i64, now: i64) -> bool {
    match expires_in(token, now) {
        Ok(remaining) => remaining < seconds,
        Err(e) => {
            tracing::debug!(error = %e, "Unreadable token expiry, treating as expiring");
            true
        }
    }
}

/// Whether `token` expires within the default threshold from now.
#[must_use]
pub fn is_expiring_soon(token: &str) -> bool {
    expires_within(
        token,
        DEFAULT_EXPIRY_THRESHOLD_SECS,
        chrono::Utc::now().timestamp(),
    )
}
