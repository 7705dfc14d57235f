//! Account field validation: usernames, emails, passwords and display names

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationError;

const MIN_USERNAME_LEN: usize = 3;
const MAX_USERNAME_LEN: usize = 50;
const MAX_EMAIL_LEN: usize = 100;
const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 128;
const MAX_PERSON_NAME_LEN: usize = 100;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("invalid username regex"));

/// Validated username
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Create a new username.
    ///
    /// # Rules
    /// - 3 to 50 characters (after trimming)
    /// - ASCII letters, digits, `_`, `.` and `-`
    ///
    /// # Example
    /// ```
    /// use bible_api_server::models::Username;
    ///
    /// assert!(Username::new("ruth_reads").is_ok());
    /// assert!(Username::new("no spaces").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "username" });
        }

        if trimmed.len() < MIN_USERNAME_LEN {
            return Err(ValidationError::TooShort {
                field: "username",
                min: MIN_USERNAME_LEN,
            });
        }

        if trimmed.len() > MAX_USERNAME_LEN {
            return Err(ValidationError::TooLong {
                field: "username",
                max: MAX_USERNAME_LEN,
            });
        }

        if !USERNAME_RE.is_match(trimmed) {
            return Err(ValidationError::InvalidFormat {
                field: "username",
                reason: "may only contain letters, digits, '_', '.' and '-'",
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validated email address (shape check only)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "email" });
        }

        if trimmed.len() > MAX_EMAIL_LEN {
            return Err(ValidationError::TooLong {
                field: "email",
                max: MAX_EMAIL_LEN,
            });
        }

        let well_formed = match trimmed.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.is_empty()
                    && !domain.contains('@')
                    && !trimmed.chars().any(char::is_whitespace)
            }
            None => false,
        };

        if !well_formed {
            return Err(ValidationError::InvalidFormat {
                field: "email",
                reason: "must look like name@domain",
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Plaintext password awaiting hashing. Never trimmed, never printed.
#[derive(Clone)]
pub struct Password(String);

impl Password {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "password" });
        }

        let len = s.chars().count();
        if len < MIN_PASSWORD_LEN {
            return Err(ValidationError::TooShort {
                field: "password",
                min: MIN_PASSWORD_LEN,
            });
        }

        if len > MAX_PASSWORD_LEN {
            return Err(ValidationError::TooLong {
                field: "password",
                max: MAX_PASSWORD_LEN,
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// First or last name. Optional, so empty is allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    pub fn new(field: &'static str, s: Option<&str>) -> Result<Self, ValidationError> {
        let trimmed = s.unwrap_or_default().trim();

        if trimmed.chars().count() > MAX_PERSON_NAME_LEN {
            return Err(ValidationError::TooLong {
                field,
                max: MAX_PERSON_NAME_LEN,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
