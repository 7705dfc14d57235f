//! Scripture browsing endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::db::repos::{BibleRepo, BibleStats, Book, ChapterVerse, Verse};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::{BookName, ChapterNumber, VerseNumber};

/// Chapter listing for one book
#[derive(Serialize)]
pub struct ChaptersResponse {
    pub book: String,
    pub chapters: Vec<i32>,
}

/// GET /books - all books in canonical order
async fn list_books(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Book>>, ApiError> {
    let books = BibleRepo::new(&state.pool).list_books().await?;
    Ok(Json(books))
}

/// GET /books/{book}/chapters
async fn list_chapters(
    State(state): State<Arc<AppState>>,
    Path(book): Path<String>,
) -> Result<Json<ChaptersResponse>, ApiError> {
    let book = BookName::new(&book)?;
    let (name, chapters) = BibleRepo::new(&state.pool).list_chapters(&book).await?;

    Ok(Json(ChaptersResponse {
        book: name,
        chapters,
    }))
}

/// GET /verses/{book}/{chapter} - every verse of a chapter
async fn chapter_verses(
    State(state): State<Arc<AppState>>,
    Path((book, chapter)): Path<(String, String)>,
) -> Result<Json<Vec<ChapterVerse>>, ApiError> {
    let book = BookName::new(&book)?;
    let chapter = ChapterNumber::parse(&chapter)?;

    let verses = BibleRepo::new(&state.pool)
        .verses_for_chapter(&book, chapter)
        .await?;
    if verses.is_empty() {
        return Err(ApiError::NotFoundMessage("Verses not found"));
    }

    Ok(Json(verses))
}

/// GET /verses/{book}/{chapter}/{verse}
async fn single_verse(
    State(state): State<Arc<AppState>>,
    Path((book, chapter, verse)): Path<(String, String, String)>,
) -> Result<Json<Verse>, ApiError> {
    let book = BookName::new(&book)?;
    let chapter = ChapterNumber::parse(&chapter)?;
    let verse = VerseNumber::parse(&verse)?;

    let verse = BibleRepo::new(&state.pool)
        .verse(&book, chapter, verse)
        .await?;
    Ok(Json(verse))
}

/// GET /stats
async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<BibleStats>, ApiError> {
    let stats = BibleRepo::new(&state.pool).stats().await?;
    Ok(Json(stats))
}

/// Scripture routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/books", get(list_books))
        .route("/books/{book}/chapters", get(list_chapters))
        .route("/verses/{book}/{chapter}", get(chapter_verses))
        .route("/verses/{book}/{chapter}/{verse}", get(single_verse))
        .route("/stats", get(stats))
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
    async fn non_numeric_chapter_is_400() {
        let response = get("/verses/Genesis/abc").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "validation_error");
    }

    #[tokio::test]
    async fn zero_verse_is_400() {
        let response = get("/verses/Genesis/1/0").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn overlong_book_name_is_400() {
        let uri = format!("/books/{}/chapters", "x".repeat(51));
        let response = get(&uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn database_failure_is_opaque_500() {
        let response = get("/books").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await["message"],
            "an internal error occurred"
        );
    }
}
