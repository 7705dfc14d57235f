//! Account endpoints: registration, cookie login, logout, profile

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::auth::{
    clear_session_cookie, hash_password, session_cookie, verify_password, verify_unknown_user,
    AuthError,
};
use crate::db::repos::{NewUser, User, UserRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{CurrentUser, ValidJson};
use crate::http::server::AppState;
use crate::models::{Email, Password, PersonName, Username, ValidationError};

/// Registration request
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Login request. `username` may also be the account email.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response; the token itself travels in the cookie
#[derive(Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub expires_in: u64,
}

/// Run a password hash or check off the async runtime.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, AuthError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal {
            message: format!("password task failed: {}", e),
        })?
        .map_err(ApiError::from)
}

/// POST /register
async fn register(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let username = Username::new(&req.username)?;
    let email = Email::new(&req.email)?;
    let password = Password::new(&req.password)?;
    let first_name = PersonName::new("first name", req.first_name.as_deref())?;
    let last_name = PersonName::new("last name", req.last_name.as_deref())?;

    let password_hash = blocking(move || hash_password(&password)).await?;

    let user = UserRepo::new(&state.pool)
        .create(&NewUser {
            username,
            email,
            first_name,
            last_name,
            password_hash,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /login - sets the `access_token` cookie
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidJson(req): ValidJson<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let identifier = req.username.trim();
    if identifier.is_empty() {
        return Err(ValidationError::Empty { field: "username" }.into());
    }
    if req.password.is_empty() {
        return Err(ValidationError::Empty { field: "password" }.into());
    }

    let password = req.password;
    let Some(record) = UserRepo::new(&state.pool).find_by_login(identifier).await? else {
        blocking(move || verify_unknown_user(&password)).await?;
        return Err(AuthError::InvalidCredentials.into());
    };

    let hash = record.password_hash.clone();
    blocking(move || verify_password(&hash, &password)).await?;

    let token = state.tokens.issue(&record.username)?;
    let ttl = state.tokens.ttl();
    tracing::info!(user_id = record.id, username = %record.username, "login succeeded");

    Ok((
        jar.add(session_cookie(token, ttl, state.secure_cookie)),
        Json(LoginResponse {
            message: "Login successful",
            expires_in: ttl.as_secs(),
        }),
    ))
}

/// POST /logout - expires the cookie; needs no valid session
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        jar.add(clear_session_cookie(state.secure_cookie)),
    )
}

/// GET /me
async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

/// Account routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

#[cfg(test)]
mod tests {
    use crate::http::server::tests::{json_body, test_app};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn register_rejects_short_password() {
        let response = test_app()
            .oneshot(post_json(
                "/register",
                json!({"username": "ruth", "email": "ruth@example.com", "password": "short"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "validation_error");
    }

    #[tokio::test]
    async fn register_with_mistyped_field_is_400_json() {
        let response = test_app()
            .oneshot(post_json("/register", json!({"password": 12345678})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        assert_eq!(json_body(response).await["error"], "bad_request");
    }

    #[tokio::test]
    async fn login_without_json_content_type_is_400_json() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/login")
                    .body(Body::from(r#"{"username":"ruth","password":"x"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "bad_request");
    }

    #[tokio::test]
    async fn register_rejects_bad_username() {
        let response = test_app()
            .oneshot(post_json(
                "/register",
                json!({"username": "no spaces", "email": "a@example.com", "password": "long enough pw"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_requires_username() {
        let response = test_app()
            .oneshot(post_json("/login", json!({"username": " ", "password": "x"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn logout_expires_cookie() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/logout")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(cookie.starts_with("access_token="));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn me_without_session_is_401() {
        let response = test_app()
            .oneshot(Request::builder().uri("/me").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            json_body(response).await["message"],
            "Could not validate credentials"
        );
    }
}
