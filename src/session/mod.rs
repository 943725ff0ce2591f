//! Persisted session and credential resolution.
//!
//! The `token` command reaches the session only through the
//! [`CredentialResolver`] trait. [`FileResolver`] is the production
//! implementation backed by a JSON session file and an OAuth token
//! endpoint.

pub mod refresh;
pub mod resolver;
pub mod store;

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::TokenError;

pub use resolver::FileResolver;

/// State left behind by a previous login.
///
/// Implements a custom `Debug` that redacts tokens and the client secret.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl Session {
    /// The access token, if one is stored and non-empty.
    pub fn access_token(&self) -> Option<&str> {
        non_empty(self.access_token.as_deref())
    }

    /// The refresh token, if one is stored and non-empty.
    pub fn refresh_token(&self) -> Option<&str> {
        non_empty(self.refresh_token.as_deref())
    }

    /// Whether the session can run the client credentials grant on its own.
    pub fn has_client_credentials(&self) -> bool {
        non_empty(self.client_id.as_deref()).is_some()
            && non_empty(self.client_secret.as_deref()).is_some()
            && non_empty(self.token_url.as_deref()).is_some()
    }

    /// Overwrite both stored tokens with a freshly resolved pair.
    pub fn set_tokens(&mut self, tokens: &TokenPair) {
        self.access_token = Some(tokens.access.to_string());
        self.refresh_token = Some(tokens.refresh.to_string());
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

fn redacted(value: &Option<String>) -> Option<&'static str> {
    value.as_ref().map(|_| "[REDACTED]")
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &redacted(&self.client_secret))
            .field("scopes", &self.scopes)
            .field("access_token", &redacted(&self.access_token))
            .field("refresh_token", &redacted(&self.refresh_token))
            .finish()
    }
}

/// The current access and refresh token.
///
/// Both buffers are wiped on drop. The refresh token is empty when the
/// provider never issued one.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access: Zeroizing<String>,
    pub refresh: Zeroizing<String>,
}

impl TokenPair {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: Zeroizing::new(access.into()),
            refresh: Zeroizing::new(refresh.into()),
        }
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"[REDACTED]")
            .field("refresh", &"[REDACTED]")
            .finish()
    }
}

/// Source of live credentials for the `token` command.
pub trait CredentialResolver {
    /// Load the persisted session, `None` when nobody is logged in.
    fn load_session(&mut self) -> Result<Option<Session>, TokenError>;

    /// Whether the session holds credentials that are usable or refreshable.
    fn is_armed(&self, session: &Session) -> Result<bool, TokenError>;

    /// Return the current token pair, refreshing it if needed.
    fn resolve_tokens(&mut self, session: &Session) -> Result<TokenPair, TokenError>;

    /// Persist the session.
    fn save_session(&mut self, session: &Session) -> Result<(), TokenError>;
}
