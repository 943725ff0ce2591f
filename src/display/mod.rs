//! Terminal rendering of tokens.
//!
//! Writes either the raw compact token or a pretty-printed decoded
//! segment to the given destination.

pub mod json_printer;

use std::io::Write;

use crate::core::decoder::{DecodedToken, Segment};
use crate::error::TokenError;

/// Write the compact token verbatim followed by a newline.
pub fn render_raw<W: Write>(out: &mut W, token: &str) -> Result<(), TokenError> {
    writeln!(out, "{token}")
        .and_then(|()| out.flush())
        .map_err(|e| TokenError::Render {
            part: "token".to_string(),
            reason: e.to_string(),
        })
}

/// Pretty-print one decoded segment.
pub fn render_segment<W: Write>(
    out: &mut W,
    decoded: &DecodedToken,
    segment: Segment,
    use_color: bool,
) -> Result<(), TokenError> {
    json_printer::write_pretty(out, decoded.segment(segment), use_color)
        .and_then(|()| out.flush())
        .map_err(|e| TokenError::Render {
            part: segment.to_string(),
            reason: e.to_string(),
        })
}
