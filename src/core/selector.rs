//! Access/refresh token selection.

/// Which of the two session tokens to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenKind {
    #[default]
    Access,
    Refresh,
}

impl TokenKind {
    /// Map the `--refresh` flag to a kind.
    pub fn from_refresh_flag(refresh: bool) -> Self {
        if refresh {
            TokenKind::Refresh
        } else {
            TokenKind::Access
        }
    }
}

/// Pick the token to display.
pub fn select<'a>(kind: TokenKind, access: &'a str, refresh: &'a str) -> &'a str {
    match kind {
        TokenKind::Access => access,
        TokenKind::Refresh => refresh,
    }
}
