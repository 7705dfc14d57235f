//! Authentication: password hashing, session tokens and the session cookie
//!
//! - Passwords are stored as argon2id PHC strings
//! - A session is an HS256 JWT whose `sub` is the username
//! - The JWT travels in an HttpOnly `access_token` cookie

pub mod cookie;
pub mod password;
pub mod token;

use std::fmt;
use std::time::Duration;

pub use cookie::{clear_session_cookie, session_cookie, session_token_from_headers, SESSION_COOKIE};
pub use password::{hash_password, verify_password, verify_unknown_user};
pub use token::{Claims, TokenIssuer};

/// Default session lifetime
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

/// Authentication failures
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("missing session token")]
    MissingToken,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("token encoding failed: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
}

/// Session settings
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret for signing session tokens
    pub secret: String,
    pub token_ttl: Duration,
    /// Mark the session cookie `Secure` (disable only for plain-HTTP development)
    pub secure_cookie: bool,
}

impl AuthConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            token_ttl: DEFAULT_TOKEN_TTL,
            secure_cookie: true,
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"***")
            .field("token_ttl", &self.token_ttl)
            .field("secure_cookie", &self.secure_cookie)
            .finish()
    }
}
