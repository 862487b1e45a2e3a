//
//  rested-api
//  auth/token.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bearer Token Decoding
//!
//! Bearer tokens are JSON Web Tokens: three dot-separated segments, the
//! middle one a base64url-encoded JSON object of claims. Only the `exp` claim
//! (seconds since the Unix epoch) is read. Signatures are never verified;
//! that is the server's job.
//!
//! ## Validity Rule
//!
//! A token is expired when:
//!
//! - it has no decodable expiry (wrong segment count, bad base64, bad JSON,
//!   missing, non-numeric, or out-of-range `exp`), or
//! - less than [`EXPIRY_MARGIN_MILLIS`] remain before its expiry.
//!
//! Decode failures never surface to callers of the token manager. They only
//! force a refresh.
//!
//! ## Example
//!
//! ```rust
//! use rested_api::auth::Token;
//!
//! let token = Token::new("not-a-jwt");
//! assert!(token.expiry_millis().is_none());
//! assert!(token.is_expired());
//! ```

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::util::now_millis;
use crate::util::types::to_number;

/// Remaining lifetime below which a token counts as expired.
pub const EXPIRY_MARGIN_MILLIS: i64 = 5_000;

/// Largest expiry accepted, in either direction: the range of an ECMAScript date.
const MAX_EXPIRY_MILLIS: f64 = 8.64e15;

/// base64url, padded or not.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Standard base64, padded or not. Some issuers do not use the URL-safe alphabet.
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Reasons a token's expiry could not be derived.
#[derive(Error, Debug)]
pub enum TokenError {
    /// The token does not have exactly three segments.
    #[error("Token has {0} segment(s), expected 3")]
    Segments(usize),

    /// The claims segment is not valid base64.
    #[error("Token claims are not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// The claims segment is not a JSON object.
    #[error("Token claims are not valid JSON: {0}")]
    Claims(#[from] serde_json::Error),

    /// The claims carry no numeric `exp`.
    #[error("Token has no expiry claim")]
    MissingExpiry,

    /// The `exp` claim is outside the representable date range.
    #[error("Token expiry {0} is out of range")]
    ExpiryOutOfRange(f64),
}

/// Reads the expiry of a token, in milliseconds since the Unix epoch.
///
/// # Parameters
///
/// * `token` - The raw bearer token
///
/// # Returns
///
/// The `exp` claim multiplied by 1000.
///
/// # Errors
///
/// Returns a [`TokenError`] describing which decoding step failed.
///
/// # Example
///
/// ```rust
/// use base64::Engine;
/// use base64::engine::general_purpose::URL_SAFE_NO_PAD;
/// use rested_api::auth::decode_expiry;
///
/// let claims = URL_SAFE_NO_PAD.encode(r#"{"exp":1700000000}"#);
/// let token = format!("header.{}.signature", claims);
/// assert_eq!(decode_expiry(&token)?, 1_700_000_000_000);
/// # Ok::<(), rested_api::auth::TokenError>(())
/// ```
pub fn decode_expiry(token: &str) -> Result<i64, TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(TokenError::Segments(segments.len()));
    }

    let bytes = URL_SAFE_LENIENT
        .decode(segments[1])
        .or_else(|_| STANDARD_LENIENT.decode(segments[1]))?;
    let claims: Value = serde_json::from_slice(&bytes)?;

    let exp = claims
        .get("exp")
        .and_then(to_number)
        .ok_or(TokenError::MissingExpiry)?;

    let millis = exp * 1000.0;
    if !(-MAX_EXPIRY_MILLIS..=MAX_EXPIRY_MILLIS).contains(&millis) {
        return Err(TokenError::ExpiryOutOfRange(exp));
    }

    Ok(millis as i64)
}

/// A bearer token with its derived expiry.
///
/// Value and expiry are always constructed together, so a reader never sees
/// one without the other.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    /// The raw bearer string
    value: String,
    /// Expiry in epoch milliseconds, `None` when undecodable
    expiry_millis: Option<i64>,
}

impl Token {
    /// Wraps a raw token and decodes its expiry.
    ///
    /// Decode failures are kept as an absent expiry, which makes the token
    /// permanently expired.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let expiry_millis = match decode_expiry(&value) {
            Ok(expiry) => Some(expiry),
            Err(e) => {
                tracing::debug!("Token expiry unavailable: {}", e);
                None
            }
        };

        Self {
            value,
            expiry_millis,
        }
    }

    /// Returns the raw bearer string.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the decoded expiry in epoch milliseconds.
    pub fn expiry_millis(&self) -> Option<i64> {
        self.expiry_millis
    }

    /// Returns the decoded expiry as a timestamp.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expiry_millis
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }

    /// Whether the token is expired at the given instant.
    ///
    /// # Parameters
    ///
    /// * `now_millis` - The reference instant in epoch milliseconds
    pub fn is_expired_at(&self, now_millis: i64) -> bool {
        match self.expiry_millis {
            Some(expiry) => expiry.saturating_sub(now_millis) < EXPIRY_MARGIN_MILLIS,
            None => true,
        }
    }

    /// Whether the token is expired now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(now_millis())
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("value", &"<redacted>")
            .field("expiry_millis", &self.expiry_millis)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};

    fn token_with_claims(claims: &str) -> String {
        format!("eyJhbGciOiJIUzI1NiJ9.{}.sig", URL_SAFE_NO_PAD.encode(claims))
    }

    #[test]
    fn test_decode_expiry() {
        let token = token_with_claims(r#"{"exp": 1700000000, "sub": "1"}"#);
        assert_eq!(decode_expiry(&token).unwrap(), 1_700_000_000_000);
    }

    #[test]
    fn test_decode_accepts_padded_standard_alphabet() {
        let token = format!("h.{}.s", STANDARD.encode(r#"{"exp":10}"#));
        assert_eq!(decode_expiry(&token).unwrap(), 10_000);
    }

    #[test]
    fn test_decode_failures() {
        assert!(matches!(decode_expiry("a.b"), Err(TokenError::Segments(2))));
        assert!(matches!(decode_expiry("a.!!!.c"), Err(TokenError::Encoding(_))));

        let not_json = format!("a.{}.c", URL_SAFE_NO_PAD.encode("nope"));
        assert!(matches!(decode_expiry(&not_json), Err(TokenError::Claims(_))));

        let no_exp = token_with_claims(r#"{"sub":"1"}"#);
        assert!(matches!(decode_expiry(&no_exp), Err(TokenError::MissingExpiry)));
    }

    #[test]
    fn test_expiry_margin() {
        let now = 1_700_000_000_000;
        let now_secs = now / 1000;

        let soon = Token::new(token_with_claims(&format!(r#"{{"exp":{}}}"#, now_secs + 2)));
        assert!(soon.is_expired_at(now));

        let later = Token::new(token_with_claims(&format!(r#"{{"exp":{}}}"#, now_secs + 10)));
        assert!(!later.is_expired_at(now));

        let edge = Token::new(token_with_claims(&format!(r#"{{"exp":{}}}"#, now_secs + 5)));
        assert!(!edge.is_expired_at(now));
    }

    #[test]
    fn test_out_of_range_expiry_is_always_expired() {
        let past = token_with_claims(r#"{"exp":-1e300}"#);
        assert!(matches!(decode_expiry(&past), Err(TokenError::ExpiryOutOfRange(_))));
        assert!(Token::new(past).is_expired());

        let future = token_with_claims(r#"{"exp":1e300}"#);
        assert!(matches!(decode_expiry(&future), Err(TokenError::ExpiryOutOfRange(_))));
        assert!(Token::new(future).is_expired());
    }

    #[test]
    fn test_expiry_check_saturates_at_extreme_instants() {
        let token = Token::new(token_with_claims(r#"{"exp":-8640000000000}"#));
        assert_eq!(token.expiry_millis(), Some(-8_640_000_000_000_000));
        assert!(token.is_expired_at(i64::MAX));
        assert!(!token.is_expired_at(i64::MIN));
    }

    #[test]
    fn test_malformed_token_is_always_expired() {
        let token = Token::new("opaque");
        assert!(token.is_expired_at(0));
        assert!(token.expires_at().is_none());
    }

    #[test]
    fn test_debug_redacts_value() {
        let token = Token::new("secret.value.here");
        assert!(!format!("{:?}", token).contains("secret"));
    }
}
