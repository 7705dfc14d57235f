//! Custom Axum extractors

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::server::AppState;
use crate::auth::{session_token_from_headers, AuthError};
use crate::db::{DbError, User, UserRepo};
use crate::models::ValidationError;

/// The authenticated user behind the session cookie (or bearer token).
///
/// Every failure (no token, bad signature, expired, user gone) is the
/// same 401 so the response doesn't reveal which check failed.
pub struct CurrentUser(pub User);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token_from_headers(&parts.headers).ok_or(AuthError::MissingToken)?;
        let claims = state.tokens.verify(&token)?;

        match UserRepo::new(&state.pool).get_by_username(&claims.sub).await {
            Ok(user) => Ok(Self(user)),
            Err(DbError::NotFound { .. }) => {
                tracing::debug!(username = %claims.sub, "token subject no longer exists");
                Err(ApiError::unauthorized())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Extract and validate a `YYYY-MM-DD` date from the path
pub struct ValidDate(pub NaiveDate);

impl ValidDate {
    pub fn parse(s: &str) -> Result<NaiveDate, ValidationError> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            ValidationError::InvalidFormat {
                field: "date",
                reason: "expected YYYY-MM-DD",
            }
        })
    }
}

impl<S> FromRequestParts<S> for ValidDate
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Validation(ValidationError::Empty { field: "date" }))?;

        Ok(Self(Self::parse(&raw)?))
    }
}

/// JSON body whose decode failures answer as API errors instead of
/// axum's plain-text rejections.
pub struct ValidJson<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(status = %rejection.status(), "rejected request body");
        Self::BadRequest {
            message: rejection.body_text(),
        }
    }
}

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Query string counterpart of [`ValidJson`]
pub struct ValidQuery<T>(pub T);

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest {
            message: rejection.body_text(),
        }
    }
}

impl<T, S> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates() {
        assert_eq!(
            ValidDate::parse("2025-12-25").unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 25).unwrap()
        );
    }

    #[test]
    fn rejects_bad_dates() {
        assert!(ValidDate::parse("2025-02-30").is_err());
        assert!(ValidDate::parse("12/25/2025").is_err());
        assert!(ValidDate::parse("today").is_err());
    }
}
