//! Expiry of compact tokens.
//!
//! Reads the `exp` claim from a token payload so the session layer can
//! decide whether the stored credentials are still usable and whether a
//! refresh is due.

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::Value;

use crate::core::decoder::{Segment, decode_token};
use crate::error::TokenError;

/// When a token stops being valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// The payload carries no `exp` claim.
    Never,
    At(DateTime<Utc>),
}

impl Expiry {
    /// Time left before expiry, `None` for tokens that never expire.
    ///
    /// The result is negative once the token has expired.
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        match self {
            Expiry::Never => None,
            Expiry::At(at) => Some(*at - now),
        }
    }

    /// Whether the token is expired, or will be within `margin`.
    pub fn expires_within(&self, now: DateTime<Utc>, margin: TimeDelta) -> bool {
        self.remaining(now).is_some_and(|left| left <= margin)
    }
}

/// Read the expiry of a compact token without verifying it.
///
/// # Errors
///
/// Returns a malformed-token error if the token cannot be decoded, the
/// payload is not a JSON object, or `exp` is not a numeric timestamp.
pub fn token_expiry(token: &str) -> Result<Expiry, TokenError> {
    let decoded = decode_token(token)?;
    let claims: Value =
        serde_json::from_slice(&decoded.payload).map_err(|e| TokenError::JsonParseError {
            segment: Segment::Payload,
            reason: e.to_string(),
        })?;

    let Some(claims) = claims.as_object() else {
        return Err(TokenError::JsonParseError {
            segment: Segment::Payload,
            reason: "claims are not a JSON object".to_string(),
        });
    };

    let Some(exp) = claims.get("exp") else {
        return Ok(Expiry::Never);
    };

    // Some issuers emit fractional seconds; truncate to whole seconds.
    let seconds = exp
        .as_i64()
        .or_else(|| exp.as_f64().map(|f| f as i64))
        .ok_or_else(|| TokenError::JsonParseError {
            segment: Segment::Payload,
            reason: "'exp' claim is not a number".to_string(),
        })?;

    DateTime::from_timestamp(seconds, 0)
        .map(Expiry::At)
        .ok_or_else(|| TokenError::JsonParseError {
            segment: Segment::Payload,
            reason: format!("'exp' claim {seconds} is out of range"),
        })
}
