//! Bible text repository: books, chapters, verses
//!
//! Book lookups accept either the full name or the abbreviation,
//! case-insensitively ("genesis", "Gen").

use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::db::DbError;
use crate::models::{BookName, ChapterNumber, VerseNumber};

/// Matches a book row against `$1` by name or abbreviation.
const BOOK_MATCH: &str = "(LOWER(b.name) = LOWER($1) OR LOWER(b.abbreviation) = LOWER($1))";

/// Book record
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Book {
    pub id: i32,
    pub name: String,
    pub abbreviation: String,
    pub testament: String,
    pub position: i32,
}

/// Verse as listed within a chapter
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct ChapterVerse {
    pub verse_number: i32,
    pub text: String,
}

/// Fully-addressed verse
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Verse {
    pub id: i32,
    pub book_name: String,
    pub chapter_number: i32,
    pub verse_number: i32,
    pub text: String,
}

/// Row counts across the loaded text
#[derive(Debug, Clone, Copy, FromRow, Serialize)]
pub struct BibleStats {
    pub total_books: i64,
    pub total_chapters: i64,
    pub total_verses: i64,
}

/// Bible text repository
pub struct BibleRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> BibleRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All books in canonical order.
    pub async fn list_books(&self) -> Result<Vec<Book>, DbError> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, name, abbreviation, testament, position
            FROM books
            ORDER BY position
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(books)
    }

    /// Chapter numbers of a book, ascending.
    ///
    /// The LEFT JOIN keeps one row for a book without chapters, so an
    /// unknown book (no rows) is distinguishable from an empty one.
    pub async fn list_chapters(&self, book: &BookName) -> Result<(String, Vec<i32>), DbError> {
        let query = format!(
            r#"
            SELECT b.name, c.chapter_number
            FROM books b
            LEFT JOIN chapters c ON c.book_id = b.id
            WHERE {BOOK_MATCH}
            ORDER BY b.position, c.chapter_number
            "#
        );
        let rows: Vec<(String, Option<i32>)> = sqlx::query_as(&query)
            .bind(book.as_str())
            .fetch_all(self.pool)
            .await?;

        let name = rows
            .first()
            .map(|(name, _)| name.clone())
            .ok_or_else(|| DbError::not_found("book", book.as_str()))?;

        let chapters = rows
            .into_iter()
            .filter(|(row_name, _)| *row_name == name)
            .filter_map(|(_, chapter)| chapter)
            .collect();

        Ok((name, chapters))
    }

    /// Verses of one chapter ordered by verse number.
    ///
    /// An empty result means the book or chapter doesn't exist.
    pub async fn verses_for_chapter(
        &self,
        book: &BookName,
        chapter: ChapterNumber,
    ) -> Result<Vec<ChapterVerse>, DbError> {
        let query = format!(
            r#"
            SELECT v.verse_number, v.text
            FROM verses v
            JOIN chapters c ON v.chapter_id = c.id
            JOIN books b ON c.book_id = b.id
            WHERE {BOOK_MATCH} AND c.chapter_number = $2
            ORDER BY v.verse_number
            "#
        );
        let verses = sqlx::query_as::<_, ChapterVerse>(&query)
            .bind(book.as_str())
            .bind(chapter.get())
            .fetch_all(self.pool)
            .await?;

        Ok(verses)
    }

    /// A single verse with its id, for tagging favorites.
    pub async fn verse(
        &self,
        book: &BookName,
        chapter: ChapterNumber,
        verse: VerseNumber,
    ) -> Result<Verse, DbError> {
        let query = format!(
            r#"
            SELECT v.id, b.name AS book_name, c.chapter_number, v.verse_number, v.text
            FROM verses v
            JOIN chapters c ON v.chapter_id = c.id
            JOIN books b ON c.book_id = b.id
            WHERE {BOOK_MATCH} AND c.chapter_number = $2 AND v.verse_number = $3
            ORDER BY b.position
            LIMIT 1
            "#
        );
        sqlx::query_as::<_, Verse>(&query)
            .bind(book.as_str())
            .bind(chapter.get())
            .bind(verse.get())
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| {
                DbError::not_found(
                    "verse",
                    format!("{} {}:{}", book.as_str(), chapter.get(), verse.get()),
                )
            })
    }

    /// Totals over the loaded text.
    pub async fn stats(&self) -> Result<BibleStats, DbError> {
        let stats = sqlx::query_as::<_, BibleStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM books) AS total_books,
                (SELECT COUNT(*) FROM chapters) AS total_chapters,
                (SELECT COUNT(*) FROM verses) AS total_verses
            "#,
        )
        .fetch_one(self.pool)
        .await?;

        Ok(stats)
    }
}
