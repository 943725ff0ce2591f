//! Handler for the `token` subcommand.
//!
//! Prints the access or refresh token held by the current session, either
//! raw or with one segment decoded, then writes the (possibly refreshed)
//! tokens back to the session.

use std::io::Write;

use anyhow::Result;

use crate::cli::TokenArgs;
use crate::core::decoder::decode_token;
use crate::core::mode;
use crate::core::selector::{TokenKind, select};
use crate::display;
use crate::error::TokenError;
use crate::session::CredentialResolver;

/// Execute the `token` subcommand with the given arguments.
///
/// The display flags are validated before the resolver is touched. Output
/// is written before the session is saved, so a save failure is reported
/// without retracting what was already printed.
pub fn execute<R, W>(args: &TokenArgs, resolver: &mut R, out: &mut W, use_color: bool) -> Result<()>
where
    R: CredentialResolver,
    W: Write,
{
    let mode = mode::validate(args.header, args.payload, args.signature)?;
    let kind = TokenKind::from_refresh_flag(args.refresh);

    let mut session = resolver.load_session()?.ok_or(TokenError::NotLoggedIn)?;

    if !resolver.is_armed(&session)? {
        return Err(TokenError::SessionExpired.into());
    }

    let tokens = resolver.resolve_tokens(&session)?;
    let selected = select(kind, &tokens.access, &tokens.refresh);
    if selected.is_empty() {
        return Err(TokenError::Resolver {
            reason: "the session has no refresh token".to_string(),
        }
        .into());
    }
    tracing::debug!(?kind, ?mode, "displaying token");

    match mode.segment() {
        None => display::render_raw(out, selected)?,
        Some(segment) => {
            let decoded = decode_token(selected)?;
            display::render_segment(out, &decoded, segment, use_color)?;
        }
    }

    session.set_tokens(&tokens);
    resolver.save_session(&session)?;

    Ok(())
}
