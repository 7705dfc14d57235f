//! Verse search with full-text / substring fallback
//!
//! Two strategies:
//! - full-text: `plainto_tsquery` over the English tsvector, ranked by `ts_rank`
//! - substring: `ILIKE` over the raw text, constant rank, canonical order
//!
//! Short queries (< 4 chars) start with a word-bounded substring match
//! because the English dictionary drops most of them as stopwords; longer
//! queries start with full-text. Whichever runs first, the other runs only
//! when the first returns nothing.

use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::db::DbError;
use crate::models::{SearchLimit, SearchQuery};

/// Indexed tsvector expression. The GIN index in migrations uses the same text.
pub(crate) const TSVECTOR_EXPR: &str = "to_tsvector('english', text)";

/// One search result
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct SearchHit {
    pub verse_id: i32,
    pub book_name: String,
    pub chapter_number: i32,
    pub verse_number: i32,
    pub text: String,
    pub rank: f64,
}

/// How a single search query is matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStrategy {
    FullText,
    /// `ILIKE` with an already-escaped pattern
    Substring { pattern: String },
}

impl SearchStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FullText => "full_text",
            Self::Substring { .. } => "substring",
        }
    }
}

/// Primary strategy plus the fallback used when it finds nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPlan {
    pub primary: SearchStrategy,
    pub fallback: SearchStrategy,
}

impl SearchPlan {
    pub fn for_query(query: &SearchQuery) -> Self {
        let escaped = escape_like(query.as_str());
        if query.is_short() {
            Self {
                primary: SearchStrategy::Substring {
                    pattern: format!("% {escaped} %"),
                },
                fallback: SearchStrategy::FullText,
            }
        } else {
            Self {
                primary: SearchStrategy::FullText,
                fallback: SearchStrategy::Substring {
                    pattern: format!("%{escaped}%"),
                },
            }
        }
    }
}

/// Escape LIKE metacharacters so user input matches literally.
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Verse search repository
pub struct SearchRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> SearchRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Search verse text, falling back to the alternate strategy when the
    /// primary one returns no rows. Issues at most two queries.
    pub async fn search(
        &self,
        query: &SearchQuery,
        limit: SearchLimit,
    ) -> Result<Vec<SearchHit>, DbError> {
        let plan = SearchPlan::for_query(query);

        let hits = self.run(&plan.primary, query, limit).await?;
        if !hits.is_empty() {
            tracing::debug!(strategy = plan.primary.name(), hits = hits.len(), "verse search");
            return Ok(hits);
        }

        let hits = self.run(&plan.fallback, query, limit).await?;
        tracing::debug!(
            strategy = plan.fallback.name(),
            hits = hits.len(),
            "verse search (fallback)"
        );
        Ok(hits)
    }

    async fn run(
        &self,
        strategy: &SearchStrategy,
        query: &SearchQuery,
        limit: SearchLimit,
    ) -> Result<Vec<SearchHit>, DbError> {
        let limit = i64::from(limit.get());

        let hits = match strategy {
            SearchStrategy::FullText => {
                let sql = format!(
                    r#"
                    SELECT
                        v.id AS verse_id,
                        b.name AS book_name,
                        c.chapter_number,
                        v.verse_number,
                        v.text,
                        ts_rank({TSVECTOR_EXPR}, plainto_tsquery('english', $1))::double precision AS rank
                    FROM verses v
                    JOIN chapters c ON v.chapter_id = c.id
                    JOIN books b ON c.book_id = b.id
                    WHERE {TSVECTOR_EXPR} @@ plainto_tsquery('english', $1)
                    ORDER BY rank DESC, b.position, c.chapter_number, v.verse_number
                    LIMIT $2
                    "#
                );
                sqlx::query_as::<_, SearchHit>(&sql)
                    .bind(query.as_str())
                    .bind(limit)
                    .fetch_all(self.pool)
                    .await?
            }
            SearchStrategy::Substring { pattern } => {
                sqlx::query_as::<_, SearchHit>(
                    r#"
                    SELECT
                        v.id AS verse_id,
                        b.name AS book_name,
                        c.chapter_number,
                        v.verse_number,
                        v.text,
                        1.0::double precision AS rank
                    FROM verses v
                    JOIN chapters c ON v.chapter_id = c.id
                    JOIN books b ON c.book_id = b.id
                    WHERE v.text ILIKE $1 ESCAPE '\'
                    ORDER BY b.name, c.chapter_number, v.verse_number
                    LIMIT $2
                    "#,
                )
                .bind(pattern.as_str())
                .bind(limit)
                .fetch_all(self.pool)
                .await?
            }
        };

        Ok(hits)
    }
}
