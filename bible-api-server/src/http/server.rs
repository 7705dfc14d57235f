//! Axum server setup
//!
//! Server skeleton with:
//! - Credentialed CORS for the configured browser origins
//! - Tracing and timeout middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method, StatusCode,
};
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::routes;
use crate::auth::{AuthConfig, TokenIssuer};

/// Origins allowed by default (local frontend dev servers)
pub const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://127.0.0.1:3000",
    "http://localhost:5173",
    "http://127.0.0.1:5173",
];

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:8000)
    pub bind_addr: SocketAddr,

    /// Reflect any request origin (credentials stay enabled).
    ///
    /// WARNING: any site can then make authenticated calls with the
    /// user's cookie. Only for development.
    pub cors_permissive: bool,

    /// Allowed browser origins when not permissive
    pub cors_origins: Vec<String>,

    /// Per-request timeout
    pub request_timeout: Duration,

    pub auth: AuthConfig,
}

impl ServerConfig {
    pub fn new(auth: AuthConfig) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            cors_permissive: false,
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
            request_timeout: Duration::from_secs(30),
            auth,
        }
    }
}

/// Shared application state
pub struct AppState {
    pub pool: PgPool,
    pub tokens: TokenIssuer,
    pub secure_cookie: bool,
}

impl AppState {
    pub fn new(pool: PgPool, auth: &AuthConfig) -> Self {
        Self {
            pool,
            tokens: TokenIssuer::new(auth.secret.as_bytes(), auth.token_ttl),
            secure_cookie: auth.secure_cookie,
        }
    }
}

/// Build the router with all routes and middleware.
pub fn build_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .layer(cors_layer(config));

    Router::new()
        .merge(routes::health::router())
        .merge(routes::bible::router())
        .merge(routes::search::router())
        .merge(routes::auth::router())
        .merge(routes::devotionals::router())
        .layer(middleware)
        .with_state(state)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true);

    if config.cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins reflected");
        return cors.allow_origin(AllowOrigin::mirror_request());
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "CORS: ignoring invalid origin");
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
}

/// Run the HTTP server until a shutdown signal arrives.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&database_url).await?;
/// let config = ServerConfig::new(AuthConfig::new(secret));
/// run_server(pool, config).await?;
/// ```
pub async fn run_server(pool: PgPool, config: ServerConfig) -> Result<(), ServerError> {
    let state = Arc::new(AppState::new(pool, &config.auth));
    let app = build_router(state, &config);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
