//! Schema migrations
//!
//! Every statement is idempotent so `run` is safe on every startup. Bible
//! content tables are created empty; loading text into them is done out of
//! band. The text loader also recreates `users` in an older shape, so the
//! account columns are reconciled after the tables exist.

use sqlx::PgPool;

/// Ordered DDL statements. Applied in one transaction.
const STATEMENTS: &[&str] = &[
    // Bible content
    r#"
    CREATE TABLE IF NOT EXISTS books (
        id SERIAL PRIMARY KEY,
        name VARCHAR(50) NOT NULL,
        abbreviation VARCHAR(10) NOT NULL,
        testament VARCHAR(10) NOT NULL,
        position INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS chapters (
        id SERIAL PRIMARY KEY,
        book_id INTEGER NOT NULL REFERENCES books(id),
        chapter_number INTEGER NOT NULL,
        UNIQUE (book_id, chapter_number)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS verses (
        id SERIAL PRIMARY KEY,
        chapter_id INTEGER NOT NULL REFERENCES chapters(id),
        verse_number INTEGER NOT NULL,
        text TEXT NOT NULL,
        UNIQUE (chapter_id, verse_number)
    )
    "#,
    // Accounts
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        username VARCHAR(50) UNIQUE NOT NULL,
        email VARCHAR(100) UNIQUE NOT NULL,
        first_name VARCHAR(100) NOT NULL DEFAULT '',
        last_name VARCHAR(100) NOT NULL DEFAULT '',
        password_hash VARCHAR(255) NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    // Devotionals: one per user per day
    r#"
    CREATE TABLE IF NOT EXISTS devotionals (
        id SERIAL PRIMARY KEY,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        devotional_date DATE NOT NULL,
        reflection TEXT NOT NULL DEFAULT '',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        UNIQUE (user_id, devotional_date)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS devotional_favorite_verses (
        devotional_id INTEGER NOT NULL REFERENCES devotionals(id) ON DELETE CASCADE,
        verse_id INTEGER NOT NULL REFERENCES verses(id),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        PRIMARY KEY (devotional_id, verse_id)
    )
    "#,
    // Indexes
    "CREATE INDEX IF NOT EXISTS idx_chapters_book_id ON chapters(book_id)",
    "CREATE INDEX IF NOT EXISTS idx_verses_chapter_id ON verses(chapter_id)",
    "CREATE INDEX IF NOT EXISTS idx_books_name_lower ON books(LOWER(name))",
    "CREATE INDEX IF NOT EXISTS idx_devotionals_user_date ON devotionals(user_id, devotional_date DESC)",
    "CREATE INDEX IF NOT EXISTS idx_favorite_verses_verse_id ON devotional_favorite_verses(verse_id)",
    // Full-text search index; must match the expression used by verse search
    "CREATE INDEX IF NOT EXISTS idx_verses_text_search ON verses USING GIN (to_tsvector('english', text))",
];

/// Bring a loader-created `users` table up to the shape the account code
/// reads: profile columns present, `created_at` zoned and never null.
const USER_UPGRADES: &[&str] = &[
    "ALTER TABLE users ADD COLUMN IF NOT EXISTS first_name VARCHAR(100) NOT NULL DEFAULT ''",
    "ALTER TABLE users ADD COLUMN IF NOT EXISTS last_name VARCHAR(100) NOT NULL DEFAULT ''",
    "ALTER TABLE users ALTER COLUMN created_at TYPE TIMESTAMPTZ",
    "UPDATE users SET created_at = NOW() WHERE created_at IS NULL",
    "ALTER TABLE users ALTER COLUMN created_at SET DEFAULT NOW()",
    "ALTER TABLE users ALTER COLUMN created_at SET NOT NULL",
];

/// Advisory lock key held while migrating; concurrent starts queue on it.
const MIGRATION_LOCK_KEY: i64 = 0x6269_626c_6561_7069;

/// Apply all migrations.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running schema migrations...");

    let mut tx = pool.begin().await?;
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(MIGRATION_LOCK_KEY)
        .execute(&mut *tx)
        .await?;
    for statement in STATEMENTS.iter().chain(USER_UPGRADES) {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;

    tracing::info!(
        statements = STATEMENTS.len() + USER_UPGRADES.len(),
        "Schema migrations complete"
    );
    Ok(())
}
