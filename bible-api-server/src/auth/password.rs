//! Argon2id password hashing

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};

/// Hash of no real password, made with the default Argon2id parameters.
/// Checked when a login names nobody so that path costs a full verify.
const UNKNOWN_USER_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$DjCc1vz8sQC5KIKazBG7xw$GN8NXZM4v3dVYGPIgYJsxVjlTuBBsRo5kCmPt103Su8";

use super::AuthError;
use crate::models::Password;

/// Hash a password into a PHC string with a fresh random salt.
pub fn hash_password(password: &Password) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.expose().as_bytes(), &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?
        .to_string();
    Ok(hash)
}

/// Check a plaintext password against a stored PHC string.
///
/// A malformed stored hash is treated as a mismatch.
pub fn verify_password(hash: &str, password: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        tracing::warn!("stored password hash is unparseable: {}", e);
        AuthError::InvalidCredentials
    })?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Spend the same verify work as a real account, then reject.
pub fn verify_unknown_user(password: &str) -> Result<(), AuthError> {
    verify_password(UNKNOWN_USER_HASH, password)?;
    // A password matching the placeholder still names no account
    Err(AuthError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let pw = Password::new("in the beginning").unwrap();
        let hash = hash_password(&pw).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(&hash, "in the beginning").is_ok());
    }

    #[test]
    fn wrong_password_rejected() {
        let pw = Password::new("in the beginning").unwrap();
        let hash = hash_password(&pw).unwrap();
        assert!(matches!(
            verify_password(&hash, "in the end"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn salts_differ() {
        let pw = Password::new("same password").unwrap();
        assert_ne!(hash_password(&pw).unwrap(), hash_password(&pw).unwrap());
    }

    #[test]
    fn unknown_user_hash_uses_default_cost() {
        let parsed = PasswordHash::new(UNKNOWN_USER_HASH).unwrap();
        let params = argon2::Params::try_from(&parsed).unwrap();
        let defaults = argon2::Params::default();
        assert_eq!(parsed.algorithm, argon2::Algorithm::Argon2id.ident());
        assert_eq!(params.m_cost(), defaults.m_cost());
        assert_eq!(params.t_cost(), defaults.t_cost());
        assert_eq!(params.p_cost(), defaults.p_cost());
    }

    #[test]
    fn unknown_user_always_rejected() {
        for candidate in ["", "in the beginning", "password123"] {
            assert!(matches!(
                verify_unknown_user(candidate),
                Err(AuthError::InvalidCredentials)
            ));
        }
    }

    #[test]
    fn malformed_hash_is_mismatch() {
        assert!(matches!(
            verify_password("not-a-phc-string", "whatever1"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
