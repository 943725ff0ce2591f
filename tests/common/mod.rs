//! Shared test fixtures and helper utilities.
//!
//! Provides tokens with known contents and helpers for writing session
//! files that the `authctl` binary can pick up through `--config`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{Value, json};

/// Unsigned token with header `{"alg":"none"}`, payload `{"sub":"x"}` and
/// signature bytes `sig`.
pub const SIMPLE_TOKEN: &str = "eyJhbGciOiJub25lIn0.eyJzdWIiOiJ4In0.c2ln";

/// HMAC secret used to sign fixture tokens.
pub const HMAC_TEST_SECRET: &str = "token-test-secret";

/// Current Unix time in seconds.
pub fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// Create an HS256-signed token with the given claims.
pub fn create_hs256_token(claims: &Value) -> String {
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(HMAC_TEST_SECRET.as_bytes());
    encode(&header, claims, &key).unwrap()
}

/// A signed token whose `exp` is `offset_secs` from now.
pub fn token_expiring_in(subject: &str, offset_secs: i64) -> String {
    create_hs256_token(&json!({
        "sub": subject,
        "iat": now(),
        "exp": now() + offset_secs,
    }))
}

/// Write a session file inside `dir` and return its path.
pub fn write_session(dir: &Path, session: &Value) -> PathBuf {
    let path = dir.join("session.json");
    std::fs::write(&path, serde_json::to_string_pretty(session).unwrap()).unwrap();
    path
}

/// Read a session file back as JSON.
pub fn read_session(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}
