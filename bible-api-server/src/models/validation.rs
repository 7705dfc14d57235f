//! Validation error types

use std::fmt;

/// Validation error for domain models
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// Field is below minimum length
    TooShort { field: &'static str, min: usize },

    /// String doesn't match required format
    InvalidFormat { field: &'static str, reason: &'static str },

    /// Numeric value outside the accepted range
    OutOfRange { field: &'static str, value: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::TooShort { field, min } => {
                write!(f, "{} must be at least {} characters", field, min)
            }
            Self::InvalidFormat { field, reason } => {
                write!(f, "{}: {}", field, reason)
            }
            Self::OutOfRange { field, value } => {
                write!(f, "{} out of range: '{}'", field, value)
            }
        }
    }
}

impl std::error::Error for ValidationError {}
