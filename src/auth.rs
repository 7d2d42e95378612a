//! Session token derivation and verification.
//!
//! There is exactly one account: a shared password configured by the
//! operator. A successful login receives a deterministic session token
//!
//! ```text
//! token = hex(SHA-256(password || "|" || sessionSecret))
//! ```
//!
//! where `sessionSecret` is either operator-supplied
//! (`GALLERY_SESSION_SECRET`) or derived as
//! `hex(SHA-256(password || applicationSalt))` from a fixed salt.
//!
//! Known weak default: with no custom secret, two deployments sharing a
//! password mint identical tokens. The password is the only real secret.
//! Token comparison is ordinary byte equality, not constant-time. Both are
//! accepted for this threat model and isolated here: the access gate only
//! ever talks to [`Authenticator`], so a per-user or constant-time scheme
//! can replace this type without touching the server.

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "foyer_session";

/// Session cookie lifetime: 8 hours.
const SESSION_MAX_AGE_SECS: u32 = 8 * 60 * 60;

/// Application salt for the derived default session secret.
const APPLICATION_SALT: &str = "foyer/v1/session-salt";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("password must not be empty")]
    EmptyPassword,
    #[error("incorrect password")]
    Mismatch,
}

/// Holds the expected session token, computed once at startup and immutable
/// afterwards, so handlers share it without locking.
pub struct Authenticator {
    secret: String,
    expected: String,
}

impl Authenticator {
    pub fn new(password: &str, secret_override: Option<&str>) -> Self {
        let secret = match secret_override {
            Some(s) => s.to_string(),
            None => default_secret(password),
        };
        let expected = derive_token(password, &secret);
        Self { secret, expected }
    }

    /// The token a successful login receives as its cookie value.
    pub fn expected_token(&self) -> &str {
        &self.expected
    }

    /// Validate a login submission. Empty submissions are rejected before
    /// any hashing; everything else is hashed and compared to the expected
    /// token. On success, returns the token to set as the cookie value.
    pub fn login(&self, submitted: &str) -> Result<&str, AuthError> {
        if submitted.is_empty() {
            return Err(AuthError::EmptyPassword);
        }
        let candidate = derive_token(submitted, &self.secret);
        if candidate == self.expected {
            Ok(&self.expected)
        } else {
            Err(AuthError::Mismatch)
        }
    }

    /// Whether a cookie value authorizes the request.
    pub fn token_matches(&self, candidate: &str) -> bool {
        candidate == self.expected
    }
}

fn derive_token(password: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(b"|");
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn default_secret(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(APPLICATION_SALT.as_bytes());
    format!("{:x}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Cookie plumbing
// ---------------------------------------------------------------------------

/// `Set-Cookie` value issuing the session.
pub fn session_cookie(token: &str) -> String {
    format!(
        "{SESSION_COOKIE}={token}; Max-Age={SESSION_MAX_AGE_SECS}; Path=/; HttpOnly; SameSite=Strict"
    )
}

/// `Set-Cookie` value clearing the session.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Max-Age=0; Path=/; HttpOnly; SameSite=Strict")
}

/// Extract the session token from a `Cookie` request header, if present.
pub fn session_cookie_value(header: &str) -> Option<&str> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_yields_expected_token() {
        let auth = Authenticator::new("hunter2", None);
        assert_eq!(auth.login("hunter2").unwrap(), auth.expected_token());
    }

    #[test]
    fn token_is_deterministic_across_instances() {
        let a = Authenticator::new("hunter2", None);
        let b = Authenticator::new("hunter2", None);
        assert_eq!(a.expected_token(), b.expected_token());
    }

    #[test]
    fn wrong_password_is_a_mismatch() {
        let auth = Authenticator::new("hunter2", None);
        assert_eq!(auth.login("hunter3"), Err(AuthError::Mismatch));
        assert_eq!(auth.login("Hunter2"), Err(AuthError::Mismatch));
    }

    #[test]
    fn empty_submission_rejected_before_hashing() {
        let auth = Authenticator::new("hunter2", None);
        assert_eq!(auth.login(""), Err(AuthError::EmptyPassword));
    }

    #[test]
    fn custom_secret_changes_the_token() {
        let default = Authenticator::new("hunter2", None);
        let custom = Authenticator::new("hunter2", Some("deployment-9"));
        assert_ne!(default.expected_token(), custom.expected_token());
        // The custom-secret deployment still authenticates the same password.
        assert!(custom.login("hunter2").is_ok());
    }

    #[test]
    fn token_is_hex_sha256() {
        let auth = Authenticator::new("hunter2", None);
        let token = auth.expected_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn token_matches_only_the_exact_value() {
        let auth = Authenticator::new("hunter2", None);
        let token = auth.expected_token().to_string();
        assert!(auth.token_matches(&token));
        assert!(!auth.token_matches(&token[..63]));
        assert!(!auth.token_matches(""));
    }

    // =========================================================================
    // Cookie plumbing
    // =========================================================================

    #[test]
    fn session_cookie_carries_required_attributes() {
        let cookie = session_cookie("abc123");
        assert!(cookie.starts_with("foyer_session=abc123;"));
        assert!(cookie.contains("Max-Age=28800"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        assert!(clear_session_cookie().contains("Max-Age=0"));
    }

    #[test]
    fn cookie_value_extracted_among_other_cookies() {
        let header = "theme=dark; foyer_session=tok123; lang=en";
        assert_eq!(session_cookie_value(header), Some("tok123"));
    }

    #[test]
    fn cookie_value_absent_when_not_set() {
        assert_eq!(session_cookie_value("theme=dark; lang=en"), None);
        assert_eq!(session_cookie_value(""), None);
    }

    #[test]
    fn cookie_name_must_match_exactly() {
        // A prefixed name must not satisfy the lookup.
        assert_eq!(session_cookie_value("xfoyer_session=evil"), None);
    }
}
