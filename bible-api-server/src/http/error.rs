//! API error type with IntoResponse
//!
//! Errors become `{"error": code, "message": ...}` JSON bodies.
//! Database and internal failures are logged and answered generically.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::auth::AuthError;
use crate::db::DbError;
use crate::models::ValidationError;

/// Message used for every rejected session
pub const UNAUTHORIZED_MESSAGE: &str = "Could not validate credentials";

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation(ValidationError),

    /// Body or query string could not be decoded (400)
    BadRequest { message: String },

    /// Duplicate of a unique resource (400)
    Conflict { message: String },

    /// Referenced row doesn't exist (400)
    UnknownReference { message: String },

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Free-form 404 with a fixed message
    NotFoundMessage(&'static str),

    /// Missing or rejected session (401)
    Unauthorized { message: &'static str },

    /// Database error (500, logged)
    Database(DbError),

    /// Internal error (500, logged)
    Internal { message: String },
}

impl ApiError {
    pub fn unauthorized() -> Self {
        Self::Unauthorized {
            message: UNAUTHORIZED_MESSAGE,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::BadRequest { .. }
            | Self::Conflict { .. }
            | Self::UnknownReference { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } | Self::NotFoundMessage(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Database(_) | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Validation(e) => json!({
                "error": "validation_error",
                "message": e.to_string()
            }),
            Self::BadRequest { message } => json!({
                "error": "bad_request",
                "message": message
            }),
            Self::Conflict { message } => json!({
                "error": "conflict",
                "message": message
            }),
            Self::UnknownReference { message } => json!({
                "error": "unknown_reference",
                "message": message
            }),
            Self::NotFound { resource, id } => json!({
                "error": "not_found",
                "message": format!("{} '{}' not found", resource, id)
            }),
            Self::NotFoundMessage(message) => json!({
                "error": "not_found",
                "message": message
            }),
            Self::Unauthorized { message } => json!({
                "error": "unauthorized",
                "message": message
            }),
            Self::Database(e) => {
                tracing::error!("Database error: {}", e);
                json!({
                    "error": "internal_error",
                    "message": "an internal error occurred"
                })
            }
            Self::Internal { message } => {
                tracing::error!("Internal error: {}", message);
                json!({
                    "error": "internal_error",
                    "message": "an internal error occurred"
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            DbError::Conflict { message } => Self::Conflict { message },
            DbError::UnknownReference { message } => Self::UnknownReference { message },
            DbError::Sqlx(_) => Self::Database(e),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => Self::Unauthorized {
                message: "Invalid credentials",
            },
            AuthError::MissingToken | AuthError::InvalidToken => Self::unauthorized(),
            AuthError::Hash(_) | AuthError::Encoding(_) => Self::Internal {
                message: e.to_string(),
            },
        }
    }
}
