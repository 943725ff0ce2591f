//! Domain error types for authctl.
//!
//! All business-logic errors are defined here using `thiserror`.
//! These errors are converted to user-friendly messages at the CLI boundary.

use thiserror::Error;

use crate::core::decoder::Segment;

/// Errors that can occur while resolving, decoding, or displaying a token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// More than one of the segment display flags was requested.
    #[error("options '--header', '--payload' and '--signature' are mutually exclusive")]
    MutuallyExclusiveModes,

    /// No persisted session exists.
    #[error("not logged in, run the 'login' command")]
    NotLoggedIn,

    /// The stored credentials have expired and cannot be refreshed.
    #[error("tokens have expired, run the 'login' command to re-authenticate")]
    SessionExpired,

    /// The session file exists but could not be read or parsed.
    #[error("can't load session file '{path}': {reason}")]
    SessionLoad {
        /// Location of the session file.
        path: String,
        /// Description of the failure.
        reason: String,
    },

    /// The expiry of the stored tokens could not be determined.
    #[error("can't check if tokens have expired: {reason}")]
    ArmedCheck {
        /// Description of the failure.
        reason: String,
    },

    /// The session does not carry what is needed to obtain tokens.
    #[error("can't get token: {reason}")]
    Resolver {
        /// Description of the failure.
        reason: String,
    },

    /// The token endpoint rejected the request or could not be reached.
    #[error("can't get token from '{url}': {reason}")]
    TokenEndpoint {
        /// The sanitized token endpoint URL.
        url: String,
        /// Description of the failure.
        reason: String,
    },

    /// The token does not have the expected three-part structure.
    #[error(
        "malformed token: expected 'header.payload.signature' structure, found {found} segment(s)"
    )]
    MalformedToken {
        /// Number of `.`-separated segments found.
        found: usize,
    },

    /// One of the three segments is empty.
    #[error("malformed token: {segment} segment is empty")]
    EmptySegment {
        /// The empty segment.
        segment: Segment,
    },

    /// A segment is not valid unpadded base64url.
    #[error("malformed token: failed to decode {segment}: invalid base64url encoding")]
    Base64DecodeError {
        /// The segment that failed to decode.
        segment: Segment,
    },

    /// A decoded segment could not be read as JSON.
    #[error("malformed token: failed to parse {segment} as JSON: {reason}")]
    JsonParseError {
        /// The segment that failed to parse.
        segment: Segment,
        /// Description of the parsing failure.
        reason: String,
    },

    /// Writing the requested representation failed.
    #[error("can't dump {part}: {reason}")]
    Render {
        /// What was being rendered ("token", "header", ...).
        part: String,
        /// Description of the failure.
        reason: String,
    },

    /// Saving the updated session failed.
    #[error("can't save session file '{path}': {reason}")]
    Persistence {
        /// Location of the session file.
        path: String,
        /// Description of the failure.
        reason: String,
    },
}

impl TokenError {
    /// Whether this error reports a structurally invalid token.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::MalformedToken { .. }
                | Self::EmptySegment { .. }
                | Self::Base64DecodeError { .. }
                | Self::JsonParseError { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutually_exclusive_display_names_all_flags() {
        let msg = TokenError::MutuallyExclusiveModes.to_string();
        assert!(msg.contains("--header"));
        assert!(msg.contains("--payload"));
        assert!(msg.contains("--signature"));
        assert!(msg.contains("mutually exclusive"));
    }

    #[test]
    fn test_not_logged_in_display() {
        assert_eq!(
            TokenError::NotLoggedIn.to_string(),
            "not logged in, run the 'login' command"
        );
    }

    #[test]
    fn test_session_expired_display_mentions_reauthentication() {
        let msg = TokenError::SessionExpired.to_string();
        assert!(msg.contains("tokens have expired"));
        assert!(msg.contains("re-authenticate"));
    }

    #[test]
    fn test_malformed_token_display_includes_count() {
        let err = TokenError::MalformedToken { found: 2 };
        assert_eq!(
            err.to_string(),
            "malformed token: expected 'header.payload.signature' structure, found 2 segment(s)"
        );
    }

    #[test]
    fn test_base64_decode_error_display_includes_segment() {
        let err = TokenError::Base64DecodeError {
            segment: Segment::Signature,
        };
        assert_eq!(
            err.to_string(),
            "malformed token: failed to decode signature: invalid base64url encoding"
        );
    }

    #[test]
    fn test_empty_segment_display_includes_segment() {
        let err = TokenError::EmptySegment {
            segment: Segment::Payload,
        };
        assert_eq!(err.to_string(), "malformed token: payload segment is empty");
    }

    #[test]
    fn test_render_display_names_part() {
        let err = TokenError::Render {
            part: "header".to_string(),
            reason: "broken pipe".to_string(),
        };
        assert_eq!(err.to_string(), "can't dump header: broken pipe");
    }

    #[test]
    fn test_persistence_display_includes_path_and_reason() {
        let err = TokenError::Persistence {
            path: "/tmp/session.json".to_string(),
            reason: "permission denied".to_string(),
        };
        assert!(err.to_string().contains("/tmp/session.json"));
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn test_token_endpoint_display_includes_url() {
        let err = TokenError::TokenEndpoint {
            url: "https://sso.example.com/token".to_string(),
            reason: "server returned HTTP 400: invalid_grant".to_string(),
        };
        assert!(err.to_string().contains("sso.example.com"));
        assert!(err.to_string().contains("invalid_grant"));
    }

    #[test]
    fn test_is_malformed_covers_decode_failures_only() {
        assert!(TokenError::MalformedToken { found: 1 }.is_malformed());
        assert!(
            TokenError::Base64DecodeError {
                segment: Segment::Header
            }
            .is_malformed()
        );
        assert!(!TokenError::NotLoggedIn.is_malformed());
        assert!(!TokenError::MutuallyExclusiveModes.is_malformed());
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TokenError>();
    }
}
