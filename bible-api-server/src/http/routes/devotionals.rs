//! Devotional endpoints
//!
//! All routes act on the authenticated user's own devotionals. "Today"
//! is the current UTC date.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::db::repos::{Devotional, DevotionalRepo, FavoriteVerse};
use crate::db::DbError;
use crate::http::error::ApiError;
use crate::http::extractors::{CurrentUser, ValidDate, ValidJson, ValidQuery};
use crate::http::server::AppState;
use crate::models::{Paginated, Pagination, PaginationParams, Reflection, VerseIds};

/// Save request: the full reflection and the full favorite set
#[derive(Debug, Deserialize)]
pub struct SaveDevotionalRequest {
    #[serde(default)]
    pub reflection: String,
    #[serde(default)]
    pub verse_ids: Vec<i64>,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

async fn load(
    state: &AppState,
    user_id: i32,
    date: NaiveDate,
) -> Result<Json<Option<Devotional>>, ApiError> {
    let devotional = DevotionalRepo::new(&state.pool)
        .get_for_date(user_id, date)
        .await?;
    Ok(Json(devotional))
}

async fn store(
    state: &AppState,
    user_id: i32,
    date: NaiveDate,
    req: SaveDevotionalRequest,
) -> Result<Json<Devotional>, ApiError> {
    // Validate both fields before opening a transaction
    let reflection = Reflection::new(&req.reflection)?;
    let verse_ids = VerseIds::new(&req.verse_ids)?;

    let devotional = DevotionalRepo::new(&state.pool)
        .save(user_id, date, &reflection, &verse_ids)
        .await?;
    Ok(Json(devotional))
}

/// GET /devotionals/today - `null` when nothing is saved yet
async fn get_today(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Option<Devotional>>, ApiError> {
    load(&state, user.id, today()).await
}

/// PUT /devotionals/today
async fn save_today(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ValidJson(req): ValidJson<SaveDevotionalRequest>,
) -> Result<Json<Devotional>, ApiError> {
    store(&state, user.id, today(), req).await
}

/// GET /devotionals - newest first
async fn list_devotionals(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ValidQuery(params): ValidQuery<PaginationParams>,
) -> Result<Json<Paginated<Devotional>>, ApiError> {
    let page = Pagination::from(params);
    let result = DevotionalRepo::new(&state.pool).list(user.id, page).await?;
    Ok(Json(result))
}

/// GET /devotionals/{date} - 404 when nothing was saved that day
async fn get_for_date(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ValidDate(date): ValidDate,
) -> Result<Json<Devotional>, ApiError> {
    let Json(devotional) = load(&state, user.id, date).await?;
    devotional
        .map(Json)
        .ok_or_else(|| DbError::not_found("devotional", date).into())
}

/// PUT /devotionals/{date}
async fn save_for_date(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ValidDate(date): ValidDate,
    ValidJson(req): ValidJson<SaveDevotionalRequest>,
) -> Result<Json<Devotional>, ApiError> {
    store(&state, user.id, date, req).await
}

/// DELETE /devotionals/{date}
async fn delete_for_date(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ValidDate(date): ValidDate,
) -> Result<StatusCode, ApiError> {
    DevotionalRepo::new(&state.pool).delete(user.id, date).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /devotionals/{date}/verses - favorites with reference and text
async fn favorite_verses(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ValidDate(date): ValidDate,
) -> Result<Json<Vec<FavoriteVerse>>, ApiError> {
    let verses = DevotionalRepo::new(&state.pool)
        .favorite_verses(user.id, date)
        .await?;
    Ok(Json(verses))
}

/// Devotional routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/devotionals", get(list_devotionals))
        .route("/devotionals/today", get(get_today).put(save_today))
        .route(
            "/devotionals/{date}",
            get(get_for_date).put(save_for_date).delete(delete_for_date),
        )
        .route("/devotionals/{date}/verses", get(favorite_verses))
}
