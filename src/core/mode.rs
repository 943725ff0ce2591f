//! Display mode selection.
//!
//! The `--header`, `--payload` and `--signature` flags are mutually
//! exclusive; this module folds them into a single [`DisplayMode`].

use crate::core::decoder::Segment;
use crate::error::TokenError;

/// What the `token` command writes to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// The raw compact token.
    #[default]
    Full,
    Header,
    Payload,
    Signature,
}

impl DisplayMode {
    /// The segment this mode renders, or `None` for the raw token.
    pub fn segment(self) -> Option<Segment> {
        match self {
            DisplayMode::Full => None,
            DisplayMode::Header => Some(Segment::Header),
            DisplayMode::Payload => Some(Segment::Payload),
            DisplayMode::Signature => Some(Segment::Signature),
        }
    }
}

/// Resolve the display flags into a [`DisplayMode`].
///
/// # Errors
///
/// Returns [`TokenError::MutuallyExclusiveModes`] when more than one flag
/// is set.
pub fn validate(header: bool, payload: bool, signature: bool) -> Result<DisplayMode, TokenError> {
    let requested: Vec<DisplayMode> = [
        (header, DisplayMode::Header),
        (payload, DisplayMode::Payload),
        (signature, DisplayMode::Signature),
    ]
    .into_iter()
    .filter_map(|(set, mode)| set.then_some(mode))
    .collect();

    match requested.as_slice() {
        [] => Ok(DisplayMode::Full),
        [mode] => Ok(*mode),
        _ => Err(TokenError::MutuallyExclusiveModes),
    }
}
