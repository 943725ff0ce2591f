//! OAuth token endpoint requests.
//!
//! Exchanges a refresh token (or client credentials) for a new token pair
//! using a blocking `reqwest` client.
//!
//! # Security
//!
//! - Only HTTPS endpoints are accepted, except for loopback hosts.
//! - Redirects are disabled so credentials are never re-posted elsewhere.
//! - Request timeout is enforced (30 seconds).
//! - Response size is limited (1 MB).
//! - URLs in error messages are stripped of credentials and query strings.

use std::fmt;
use std::io::Read;
use std::net::IpAddr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::TokenError;

/// Maximum token endpoint response body size in bytes (1 MB).
const TOKEN_MAX_RESPONSE_SIZE: u64 = 1_048_576;

/// HTTP request timeout for the token endpoint in seconds.
const TOKEN_TIMEOUT_SECS: u64 = 30;

/// The OAuth grant used to obtain new tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant<'a> {
    RefreshToken(&'a str),
    ClientCredentials,
}

impl Grant<'_> {
    fn grant_type(&self) -> &'static str {
        match self {
            Grant::RefreshToken(_) => "refresh_token",
            Grant::ClientCredentials => "client_credentials",
        }
    }
}

/// Everything needed to call the token endpoint.
pub struct TokenRequest<'a> {
    pub token_url: &'a str,
    pub client_id: &'a str,
    pub client_secret: Option<&'a str>,
    pub scopes: &'a [String],
    pub grant: Grant<'a>,
}

/// Successful token endpoint response.
#[derive(Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// OAuth error response body (RFC 6749 section 5.2).
#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Request new tokens from the token endpoint.
///
/// # Errors
///
/// Returns [`TokenError::TokenEndpoint`] if the URL is not acceptable, the
/// request fails, the server answers with a non-success status, or the
/// body is not a token response.
pub fn request_tokens(request: &TokenRequest<'_>) -> Result<TokenResponse, TokenError> {
    let endpoint_url = validate_token_url(request.token_url)?;

    let scope = request.scopes.join(" ");
    let mut form: Vec<(&str, &str)> = vec![
        ("grant_type", request.grant.grant_type()),
        ("client_id", request.client_id),
    ];
    if let Grant::RefreshToken(refresh_token) = request.grant {
        form.push(("refresh_token", refresh_token));
    }
    if let Some(secret) = request.client_secret {
        form.push(("client_secret", secret));
    }
    if !scope.is_empty() {
        form.push(("scope", scope.as_str()));
    }

    tracing::debug!(
        url = %endpoint_url,
        grant_type = request.grant.grant_type(),
        "requesting tokens"
    );

    let endpoint_error = |reason: String| TokenError::TokenEndpoint {
        url: endpoint_url.clone(),
        reason,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(TOKEN_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| endpoint_error(sanitize_reqwest_error(&e)))?;

    let response = client
        .post(request.token_url)
        .header(reqwest::header::ACCEPT, "application/json")
        .form(&form)
        .send()
        .map_err(|e| endpoint_error(sanitize_reqwest_error(&e)))?;

    let status = response.status();
    let body = read_bounded_response(response).map_err(endpoint_error)?;

    if !status.is_success() {
        tracing::warn!(url = %endpoint_url, status = status.as_u16(), "token request rejected");
        return Err(endpoint_error(describe_failure(status.as_u16(), &body)));
    }

    let tokens: TokenResponse = serde_json::from_slice(&body)
        .map_err(|_| endpoint_error("response is not a valid token response".to_string()))?;

    if tokens.access_token.is_empty() {
        return Err(endpoint_error(
            "response does not contain an access token".to_string(),
        ));
    }

    Ok(tokens)
}

/// Accept HTTPS URLs, and plain HTTP only for loopback hosts.
///
/// Returns the sanitized URL for display.
fn validate_token_url(url: &str) -> Result<String, TokenError> {
    let parsed = reqwest::Url::parse(url).map_err(|_| TokenError::TokenEndpoint {
        url: url.to_string(),
        reason: "invalid token URL".to_string(),
    })?;
    let shown = display_url(&parsed);

    match parsed.scheme() {
        "https" => Ok(shown),
        "http" if is_loopback(&parsed) => Ok(shown),
        scheme => Err(TokenError::TokenEndpoint {
            url: shown,
            reason: format!(
                "only HTTPS URLs are accepted for the token endpoint (got scheme '{scheme}')"
            ),
        }),
    }
}

fn is_loopback(url: &reqwest::Url) -> bool {
    match url.host_str() {
        Some("localhost") => true,
        Some(host) => host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .is_ok_and(|ip| ip.is_loopback()),
        None => false,
    }
}

/// Read a response body with a size limit to prevent resource exhaustion.
fn read_bounded_response(response: reqwest::blocking::Response) -> Result<Vec<u8>, String> {
    let mut bytes = Vec::new();
    response
        .take(TOKEN_MAX_RESPONSE_SIZE + 1)
        .read_to_end(&mut bytes)
        .map_err(|_| "failed to read response body".to_string())?;

    if bytes.len() as u64 > TOKEN_MAX_RESPONSE_SIZE {
        return Err(format!(
            "response exceeds maximum size of {TOKEN_MAX_RESPONSE_SIZE} bytes"
        ));
    }

    Ok(bytes)
}

/// Build the reason for a non-success response.
///
/// Includes the OAuth `error` and `error_description` when the body carries
/// them; other bodies are not echoed.
fn describe_failure(status: u16, body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorResponse>(body) {
        Ok(ErrorResponse {
            error,
            error_description: Some(description),
        }) => format!("server returned HTTP {status}: {error}: {description}"),
        Ok(ErrorResponse { error, .. }) => format!("server returned HTTP {status}: {error}"),
        Err(_) => format!("server returned HTTP {status}"),
    }
}

/// Sanitize a `reqwest` error into a user-friendly reason string.
fn sanitize_reqwest_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "token endpoint timed out".to_string()
    } else if err.is_connect() {
        "failed to connect to token endpoint".to_string()
    } else {
        "token request failed".to_string()
    }
}

/// Render a URL for messages as scheme, host, port and path only, dropping
/// userinfo, query and fragment.
fn display_url(url: &reqwest::Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}://{host}:{port}{}", url.scheme(), url.path()),
        None => format!("{}://{host}{}", url.scheme(), url.path()),
    }
}
