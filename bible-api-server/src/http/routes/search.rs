//! Verse search endpoint

use std::sync::Arc;

use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::db::repos::{SearchHit, SearchRepo};
use crate::http::error::ApiError;
use crate::http::extractors::ValidQuery;
use crate::http::server::AppState;
use crate::models::{SearchLimit, SearchQuery};

/// Query parameters for search
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub limit: Option<i64>,
}

/// GET /search?q=...&limit=... - best matches first
async fn search(
    State(state): State<Arc<AppState>>,
    ValidQuery(params): ValidQuery<SearchParams>,
) -> Result<Json<Vec<SearchHit>>, ApiError> {
    let query = SearchQuery::new(&params.q)?;
    let limit = SearchLimit::new(params.limit);

    let hits = SearchRepo::new(&state.pool).search(&query, limit).await?;
    Ok(Json(hits))
}

/// Search routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/search", get(search))
}

#[cfg(test)]
mod tests {
    use crate::http::server::tests::{json_body, test_app};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn get(uri: &str) -> axum::response::Response {
        test_app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn blank_query_is_400() {
        let response = get("/search?q=%20%20").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "validation_error");
    }

    #[tokio::test]
    async fn missing_query_is_400() {
        let response = get("/search").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn non_numeric_limit_is_400_json() {
        let response = get("/search?q=love&limit=abc").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "bad_request");
    }

    #[tokio::test]
    async fn overlong_query_is_400() {
        let uri = format!("/search?q={}", "a".repeat(201));
        let response = get(&uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
