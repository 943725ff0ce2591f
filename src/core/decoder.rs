//! Compact token decoding.
//!
//! Splits a raw `header.payload.signature` string into its three segments
//! and base64url-decodes each one into raw bytes. No signature check and
//! no JSON parsing happen here; interpreting the bytes is left to the
//! display layer.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::error::TokenError;

/// One of the three segments of a compact token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Header,
    Payload,
    Signature,
}

impl Segment {
    pub fn name(self) -> &'static str {
        match self {
            Segment::Header => "header",
            Segment::Payload => "payload",
            Segment::Signature => "signature",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The decoded byte buffers of a compact token.
///
/// Implements a custom `Debug` that redacts `payload` and `signature`
/// to prevent accidental leakage of claim data.
#[derive(Clone, PartialEq, Eq)]
pub struct DecodedToken {
    pub header: Vec<u8>,
    pub payload: Vec<u8>,
    pub signature: Vec<u8>,
}

impl DecodedToken {
    /// Borrow the decoded bytes of the given segment.
    pub fn segment(&self, segment: Segment) -> &[u8] {
        match segment {
            Segment::Header => &self.header,
            Segment::Payload => &self.payload,
            Segment::Signature => &self.signature,
        }
    }
}

impl fmt::Debug for DecodedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedToken")
            .field("header", &String::from_utf8_lossy(&self.header))
            .field("payload", &"[REDACTED]")
            .field("signature", &"[REDACTED]")
            .finish()
    }
}

/// Decode a compact token into its three raw byte buffers.
///
/// # Errors
///
/// Returns [`TokenError::MalformedToken`] unless the token has exactly three
/// `.`-separated segments, [`TokenError::EmptySegment`] if one of them is
/// empty, and [`TokenError::Base64DecodeError`] naming the first segment
/// that is not unpadded base64url.
pub fn decode_token(token: &str) -> Result<DecodedToken, TokenError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(TokenError::MalformedToken { found: parts.len() });
    }

    let header = decode_segment(parts[0], Segment::Header)?;
    let payload = decode_segment(parts[1], Segment::Payload)?;
    let signature = decode_segment(parts[2], Segment::Signature)?;

    Ok(DecodedToken {
        header,
        payload,
        signature,
    })
}

/// Base64url-decode a single non-empty segment.
fn decode_segment(encoded: &str, segment: Segment) -> Result<Vec<u8>, TokenError> {
    if encoded.is_empty() {
        return Err(TokenError::EmptySegment { segment });
    }
    URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|_| TokenError::Base64DecodeError { segment })
}
