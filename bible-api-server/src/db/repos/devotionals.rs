//! Devotional repository
//!
//! A devotional is one reflection per user per day, plus a set of tagged
//! favorite verses. Saving reconciles the stored set against the incoming
//! one inside a single transaction.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::db::DbError;
use crate::models::{Pagination, Paginated, Reflection, VerseIds};

const UNKNOWN_VERSE_MESSAGE: &str = "one or more verse ids do not exist";

/// Shared projection: devotional row plus its favorites, aggregated in-query.
const SELECT_DEVOTIONAL: &str = r#"
    SELECT
        d.id AS devotional_id,
        d.user_id,
        d.devotional_date,
        d.reflection,
        d.created_at,
        d.updated_at,
        COALESCE(
            ARRAY_AGG(f.verse_id ORDER BY f.verse_id) FILTER (WHERE f.verse_id IS NOT NULL),
            ARRAY[]::integer[]
        ) AS favorite_verse_ids
"#;

/// Devotional entry with its favorite verse ids (ascending)
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Devotional {
    pub devotional_id: i32,
    pub user_id: i32,
    pub devotional_date: NaiveDate,
    pub reflection: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub favorite_verse_ids: Vec<i32>,
}

#[derive(FromRow)]
struct DevotionalPageRow {
    #[sqlx(flatten)]
    devotional: Devotional,
    total: i64,
}

/// A tagged verse with its reference and text
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct FavoriteVerse {
    pub verse_id: i32,
    pub book_name: String,
    pub chapter_number: i32,
    pub verse_number: i32,
    pub text: String,
}

/// Devotional repository
pub struct DevotionalRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> DevotionalRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's devotional for a date, if one was saved.
    pub async fn get_for_date(
        &self,
        user_id: i32,
        date: NaiveDate,
    ) -> Result<Option<Devotional>, DbError> {
        let query = format!(
            r#"
            {SELECT_DEVOTIONAL}
            FROM devotionals d
            LEFT JOIN devotional_favorite_verses f ON f.devotional_id = d.id
            WHERE d.user_id = $1 AND d.devotional_date = $2
            GROUP BY d.id
            "#
        );
        let devotional = sqlx::query_as::<_, Devotional>(&query)
            .bind(user_id)
            .bind(date)
            .fetch_optional(self.pool)
            .await?;

        Ok(devotional)
    }

    /// Save a devotional and reconcile its favorite verses (atomic).
    ///
    /// 1. Upsert the reflection keyed by (user, date)
    /// 2. Delete stored favorites missing from `verse_ids`
    /// 3. Insert incoming favorites not yet stored (idempotent)
    ///
    /// Any failure drops the transaction uncommitted, leaving the previous
    /// reflection and favorites untouched. An id with no matching verse is
    /// reported as `DbError::UnknownReference`.
    pub async fn save(
        &self,
        user_id: i32,
        date: NaiveDate,
        reflection: &Reflection,
        verse_ids: &VerseIds,
    ) -> Result<Devotional, DbError> {
        let mut tx = self.pool.begin().await?;

        let (devotional_id, created_at, updated_at): (i32, DateTime<Utc>, DateTime<Utc>) =
            sqlx::query_as(
                r#"
                INSERT INTO devotionals (user_id, devotional_date, reflection, created_at, updated_at)
                VALUES ($1, $2, $3, NOW(), NOW())
                ON CONFLICT (user_id, devotional_date)
                DO UPDATE SET reflection = EXCLUDED.reflection, updated_at = NOW()
                RETURNING id, created_at, updated_at
                "#,
            )
            .bind(user_id)
            .bind(date)
            .bind(reflection.as_str())
            .fetch_one(&mut *tx)
            .await?;

        let removed = sqlx::query(
            r#"
            DELETE FROM devotional_favorite_verses
            WHERE devotional_id = $1 AND NOT (verse_id = ANY($2))
            "#,
        )
        .bind(devotional_id)
        .bind(verse_ids.as_slice())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let added = sqlx::query(
            r#"
            INSERT INTO devotional_favorite_verses (devotional_id, verse_id)
            SELECT $1, UNNEST($2::integer[])
            ON CONFLICT (devotional_id, verse_id) DO NOTHING
            "#,
        )
        .bind(devotional_id)
        .bind(verse_ids.as_slice())
        .execute(&mut *tx)
        .await
        .map_err(unknown_verse)?
        .rows_affected();

        tx.commit().await?;

        tracing::info!(
            user_id,
            devotional_id,
            date = %date,
            favorites = verse_ids.len(),
            added,
            removed,
            "devotional saved"
        );

        // After reconciliation the stored set equals the incoming set.
        Ok(Devotional {
            devotional_id,
            user_id,
            devotional_date: date,
            reflection: reflection.as_str().to_owned(),
            created_at,
            updated_at,
            favorite_verse_ids: verse_ids.as_slice().to_vec(),
        })
    }

    /// The user's devotionals, newest date first.
    pub async fn list(
        &self,
        user_id: i32,
        page: Pagination,
    ) -> Result<Paginated<Devotional>, DbError> {
        let query = format!(
            r#"
            {SELECT_DEVOTIONAL},
                COUNT(*) OVER() AS total
            FROM devotionals d
            LEFT JOIN devotional_favorite_verses f ON f.devotional_id = d.id
            WHERE d.user_id = $1
            GROUP BY d.id
            ORDER BY d.devotional_date DESC
            LIMIT $2 OFFSET $3
            "#
        );
        let rows = sqlx::query_as::<_, DevotionalPageRow>(&query)
            .bind(user_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;

        let total = rows.first().map(|r| r.total).unwrap_or(0);
        let items = rows.into_iter().map(|r| r.devotional).collect();

        Ok(page.wrap(items, total))
    }

    /// Delete the user's devotional for a date. Favorites cascade.
    pub async fn delete(&self, user_id: i32, date: NaiveDate) -> Result<(), DbError> {
        let deleted = sqlx::query(
            r#"
            DELETE FROM devotionals
            WHERE user_id = $1 AND devotional_date = $2
            "#,
        )
        .bind(user_id)
        .bind(date)
        .execute(self.pool)
        .await?
        .rows_affected();

        if deleted == 0 {
            return Err(DbError::not_found("devotional", date));
        }

        tracing::info!(user_id, date = %date, "devotional deleted");
        Ok(())
    }

    /// Favorite verses of the user's devotional for a date, canonical order.
    pub async fn favorite_verses(
        &self,
        user_id: i32,
        date: NaiveDate,
    ) -> Result<Vec<FavoriteVerse>, DbError> {
        let verses = sqlx::query_as::<_, FavoriteVerse>(
            r#"
            SELECT
                v.id AS verse_id,
                b.name AS book_name,
                c.chapter_number,
                v.verse_number,
                v.text
            FROM devotionals d
            JOIN devotional_favorite_verses f ON f.devotional_id = d.id
            JOIN verses v ON v.id = f.verse_id
            JOIN chapters c ON v.chapter_id = c.id
            JOIN books b ON c.book_id = b.id
            WHERE d.user_id = $1 AND d.devotional_date = $2
            ORDER BY b.position, c.chapter_number, v.verse_number
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_all(self.pool)
        .await?;

        Ok(verses)
    }
}

fn unknown_verse(err: sqlx::Error) -> DbError {
    match DbError::from(err) {
        DbError::UnknownReference { .. } => DbError::UnknownReference {
            message: UNKNOWN_VERSE_MESSAGE.to_owned(),
        },
        other => other,
    }
}
