//! File-backed credential resolver.
//!
//! Combines the session file with the token endpoint: decides whether the
//! stored credentials are still usable and refreshes the access token when
//! it is about to expire.

use std::path::PathBuf;

use chrono::{DateTime, TimeDelta, Utc};

use crate::core::expiry::{Expiry, token_expiry};
use crate::error::TokenError;
use crate::session::refresh::{self, Grant, TokenRequest};
use crate::session::store::{self, SessionStore};
use crate::session::{CredentialResolver, Session, TokenPair};

/// Access tokens with less than this much time left are refreshed.
const REFRESH_MARGIN_SECS: i64 = 60;

/// [`CredentialResolver`] backed by a JSON session file.
#[derive(Debug, Clone)]
pub struct FileResolver {
    config: Option<PathBuf>,
}

impl FileResolver {
    /// Create a resolver for the given session file, or the default
    /// location when `None`.
    ///
    /// The default path is resolved on first use, not here.
    pub fn new(config: Option<PathBuf>) -> Self {
        Self { config }
    }

    fn store(&self) -> Result<SessionStore, TokenError> {
        match &self.config {
            Some(path) => Ok(SessionStore::new(path)),
            None => store::default_path().map(SessionStore::new),
        }
    }
}

impl CredentialResolver for FileResolver {
    fn load_session(&mut self) -> Result<Option<Session>, TokenError> {
        let store = self.store()?;
        tracing::debug!(path = %store.path().display(), "loading session");
        store.load()
    }

    fn is_armed(&self, session: &Session) -> Result<bool, TokenError> {
        is_armed_at(session, Utc::now())
    }

    fn resolve_tokens(&mut self, session: &Session) -> Result<TokenPair, TokenError> {
        resolve_tokens_at(session, Utc::now())
    }

    fn save_session(&mut self, session: &Session) -> Result<(), TokenError> {
        let store = self.store()?;
        tracing::debug!(path = %store.path().display(), "saving session");
        store.save(session)
    }
}

/// Whether the session is usable at `now`.
///
/// Armed when the access token is unexpired, when a refresh token is
/// available that has not expired (opaque refresh tokens count as
/// unexpired), or when client credentials allow a fresh grant.
fn is_armed_at(session: &Session, now: DateTime<Utc>) -> Result<bool, TokenError> {
    if let Some(access) = session.access_token() {
        let expiry = token_expiry(access).map_err(|e| TokenError::ArmedCheck {
            reason: format!("access token: {e}"),
        })?;
        if !expiry.expires_within(now, TimeDelta::zero()) {
            return Ok(true);
        }
        tracing::debug!("access token has expired");
    }

    if let Some(refresh) = session.refresh_token() {
        if refresh_token_usable(refresh, now) {
            return Ok(true);
        }
        tracing::debug!("refresh token has expired");
    }

    Ok(session.has_client_credentials())
}

/// Whether a refresh token can still be exchanged at `now`.
///
/// Opaque (non-JWT) refresh tokens carry no expiry and count as usable.
fn refresh_token_usable(refresh: &str, now: DateTime<Utc>) -> bool {
    match token_expiry(refresh) {
        Ok(expiry) => !expiry.expires_within(now, TimeDelta::zero()),
        Err(_) => {
            tracing::debug!("refresh token is opaque, assuming it is still valid");
            true
        }
    }
}

/// Return the current token pair, refreshing when the access token is
/// missing or expires within [`REFRESH_MARGIN_SECS`].
fn resolve_tokens_at(session: &Session, now: DateTime<Utc>) -> Result<TokenPair, TokenError> {
    let refresh_token = session.refresh_token().unwrap_or_default();

    if let Some(access) = session.access_token() {
        let expiry = token_expiry(access).map_err(|e| TokenError::Resolver {
            reason: format!("access token: {e}"),
        })?;
        if !expiry.expires_within(now, TimeDelta::seconds(REFRESH_MARGIN_SECS)) {
            match expiry {
                Expiry::Never => tracing::debug!("access token does not expire"),
                Expiry::At(_) => tracing::debug!(
                    remaining_secs = ?expiry.remaining(now).map(|d| d.num_seconds()),
                    "access token is still valid"
                ),
            }
            return Ok(TokenPair::new(access, refresh_token));
        }
    }

    let token_url = session.token_url.as_deref().ok_or_else(|| TokenError::Resolver {
        reason: "session has no token URL to refresh tokens with".to_string(),
    })?;
    let client_id = session.client_id.as_deref().ok_or_else(|| TokenError::Resolver {
        reason: "session has no client identifier to refresh tokens with".to_string(),
    })?;

    let grant = match session.refresh_token() {
        Some(refresh) if refresh_token_usable(refresh, now) => Grant::RefreshToken(refresh),
        _ if session.has_client_credentials() => Grant::ClientCredentials,
        Some(_) => {
            return Err(TokenError::Resolver {
                reason: "refresh token has expired and the session has no client credentials"
                    .to_string(),
            });
        }
        None => {
            return Err(TokenError::Resolver {
                reason: "session has neither a refresh token nor client credentials".to_string(),
            });
        }
    };

    tracing::info!("refreshing tokens");
    let response = refresh::request_tokens(&TokenRequest {
        token_url,
        client_id,
        client_secret: session.client_secret.as_deref(),
        scopes: &session.scopes,
        grant,
    })?;

    // Providers that do not rotate refresh tokens omit them from the response.
    let refresh = response
        .refresh_token
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| refresh_token.to_string());

    Ok(TokenPair::new(response.access_token, refresh))
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(NOW, 0).unwrap()
    }

    fn token_expiring_at(exp: i64) -> String {
        format!(
            "{}.{}.{}",
            URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"x","exp":{exp}}}"#)),
            URL_SAFE_NO_PAD.encode(b"sig")
        )
    }

    fn session(access: Option<String>, refresh: Option<String>) -> Session {
        Session {
            token_url: Some("https://sso.example.com/token".to_string()),
            client_id: Some("cli".to_string()),
            access_token: access,
            refresh_token: refresh,
            ..Session::default()
        }
    }

    // --- Armed check ---

    #[test]
    fn test_armed_with_valid_access_token() {
        let s = session(Some(token_expiring_at(NOW + 300)), None);
        assert!(is_armed_at(&s, now()).unwrap());
    }

    #[test]
    fn test_armed_with_expired_access_and_valid_refresh() {
        let s = session(
            Some(token_expiring_at(NOW - 10)),
            Some(token_expiring_at(NOW + 3600)),
        );
        assert!(is_armed_at(&s, now()).unwrap());
    }

    #[test]
    fn test_armed_with_opaque_refresh_token() {
        let s = session(Some(token_expiring_at(NOW - 10)), Some("opaque".to_string()));
        assert!(is_armed_at(&s, now()).unwrap());
    }

    #[test]
    fn test_not_armed_when_everything_expired() {
        let s = session(
            Some(token_expiring_at(NOW - 10)),
            Some(token_expiring_at(NOW - 5)),
        );
        assert!(!is_armed_at(&s, now()).unwrap());
    }

    #[test]
    fn test_not_armed_without_tokens() {
        assert!(!is_armed_at(&session(None, None), now()).unwrap());
    }

    #[test]
    fn test_armed_with_client_credentials_only() {
        let s = Session {
            client_secret: Some("secret".to_string()),
            ..session(None, None)
        };
        assert!(is_armed_at(&s, now()).unwrap());
    }

    #[test]
    fn test_armed_check_fails_on_malformed_access_token() {
        let s = session(Some("garbage".to_string()), None);
        let err = is_armed_at(&s, now()).unwrap_err();
        assert!(matches!(err, TokenError::ArmedCheck { reason } if reason.contains("access token")));
    }

    // --- Token resolution ---

    #[test]
    fn test_resolve_returns_stored_pair_when_fresh() {
        let access = token_expiring_at(NOW + 3600);
        let s = session(Some(access.clone()), Some("refresh".to_string()));

        let pair = resolve_tokens_at(&s, now()).unwrap();
        assert_eq!(pair.access.as_str(), access);
        assert_eq!(pair.refresh.as_str(), "refresh");
    }

    #[test]
    fn test_resolve_without_refresh_token_yields_empty_refresh() {
        let access = token_expiring_at(NOW + 3600);
        let pair = resolve_tokens_at(&session(Some(access), None), now()).unwrap();
        assert!(pair.refresh.is_empty());
    }

    #[test]
    fn test_resolve_near_expiry_without_token_url_fails() {
        let s = Session {
            token_url: None,
            ..session(Some(token_expiring_at(NOW + 30)), Some("refresh".to_string()))
        };
        let err = resolve_tokens_at(&s, now()).unwrap_err();
        assert!(matches!(err, TokenError::Resolver { reason } if reason.contains("token URL")));
    }

    #[test]
    fn test_resolve_without_any_grant_fails() {
        let s = session(Some(token_expiring_at(NOW - 1)), None);
        let err = resolve_tokens_at(&s, now()).unwrap_err();
        assert!(matches!(err, TokenError::Resolver { reason } if reason.contains("neither")));
    }

    #[test]
    fn test_refresh_token_usable() {
        assert!(refresh_token_usable(&token_expiring_at(NOW + 60), now()));
        assert!(refresh_token_usable("opaque", now()));
        assert!(!refresh_token_usable(&token_expiring_at(NOW), now()));
        assert!(!refresh_token_usable(&token_expiring_at(NOW - 60), now()));
    }

    #[test]
    fn test_resolve_with_expired_refresh_and_no_client_credentials_fails() {
        let s = session(
            Some(token_expiring_at(NOW - 600)),
            Some(token_expiring_at(NOW - 60)),
        );
        let err = resolve_tokens_at(&s, now()).unwrap_err();
        assert!(
            matches!(err, TokenError::Resolver { ref reason } if reason.contains("refresh token has expired")),
            "unexpected error: {err:?}"
        );
    }

    fn resolve_against(url: String, s: Session) -> Result<TokenPair, TokenError> {
        let s = Session {
            token_url: Some(url),
            ..s
        };
        std::thread::spawn(move || resolve_tokens_at(&s, now()))
            .join()
            .unwrap()
    }

    #[tokio::test]
    async fn test_resolve_refreshes_expiring_access_token() {
        use wiremock::matchers::{body_string_contains, method};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let mock_server = MockServer::start().await;
        let new_access = token_expiring_at(NOW + 900);

        Mock::given(method("POST"))
            .and(body_string_contains("refresh_token=old-refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                r#"{{"access_token":"{new_access}","refresh_token":"new-refresh"}}"#
            )))
            .expect(1)
            .mount(&mock_server)
            .await;

        let s = session(Some(token_expiring_at(NOW + 30)), Some("old-refresh".to_string()));
        let pair = resolve_against(format!("{}/token", mock_server.uri()), s).unwrap();

        assert_eq!(pair.access.as_str(), new_access);
        assert_eq!(pair.refresh.as_str(), "new-refresh");
    }

    #[tokio::test]
    async fn test_resolve_keeps_refresh_token_when_not_rotated() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"access_token":"a.b.c"}"#))
            .mount(&mock_server)
            .await;

        let s = session(None, Some("long-lived".to_string()));
        let pair = resolve_against(format!("{}/token", mock_server.uri()), s).unwrap();

        assert_eq!(pair.access.as_str(), "a.b.c");
        assert_eq!(pair.refresh.as_str(), "long-lived");
    }

    #[tokio::test]
    async fn test_resolve_falls_back_to_client_credentials_when_refresh_expired() {
        use wiremock::matchers::{body_string_contains, method};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let mock_server = MockServer::start().await;
        let new_access = token_expiring_at(NOW + 900);

        Mock::given(method("POST"))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("client_secret=secret"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                r#"{{"access_token":"{new_access}"}}"#
            )))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("grant_type=refresh_token"))
            .respond_with(ResponseTemplate::new(400).set_body_string(
                r#"{"error":"invalid_grant","error_description":"Token is expired"}"#,
            ))
            .expect(0)
            .mount(&mock_server)
            .await;

        let expired_refresh = token_expiring_at(NOW - 60);
        let s = Session {
            client_secret: Some("secret".to_string()),
            ..session(Some(token_expiring_at(NOW - 600)), Some(expired_refresh.clone()))
        };
        assert!(is_armed_at(&s, now()).unwrap());

        let pair = resolve_against(format!("{}/token", mock_server.uri()), s).unwrap();
        assert_eq!(pair.access.as_str(), new_access);
        assert_eq!(pair.refresh.as_str(), expired_refresh);
    }

    #[test]
    fn test_file_resolver_loads_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let mut resolver = FileResolver::new(Some(dir.path().join("session.json")));

        assert!(resolver.load_session().unwrap().is_none());

        let s = session(Some(token_expiring_at(NOW)), Some("refresh".to_string()));
        resolver.save_session(&s).unwrap();
        assert_eq!(resolver.load_session().unwrap(), Some(s));
    }
}
