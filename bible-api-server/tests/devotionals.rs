//! Database-backed tests for devotional saves and verse search.
//!
//! Run with: DATABASE_URL=postgres://... cargo test -p bible-api-server -- --ignored

use std::time::{SystemTime, UNIX_EPOCH};

use bible_api_server::db::{
    create_pool, migrations, DbError, DevotionalRepo, NewUser, SearchRepo, UserRepo,
};
use bible_api_server::models::{
    Email, Pagination, PersonName, Reflection, SearchLimit, SearchQuery, Username, VerseIds,
};
use chrono::NaiveDate;
use sqlx::PgPool;

struct Fixture {
    pool: PgPool,
    user_id: i32,
    verse_ids: [i32; 3],
    marker: String,
}

fn unique_suffix() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos() as u64;
    (nanos ^ u64::from(std::process::id())) % 1_000_000_000
}

/// Fresh book/chapter/verses and user, unique per call.
async fn fixture() -> Fixture {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let pool = create_pool(&url).await.unwrap();
    migrations::run(&pool).await.unwrap();

    let suffix = unique_suffix();
    let marker = format!("zorblax{suffix}ing");

    let book_id: i32 = sqlx::query_scalar(
        "INSERT INTO books (name, abbreviation, testament, position) VALUES ($1, $2, 'OT', 9000) RETURNING id",
    )
    .bind(format!("Testbook {suffix}"))
    .bind(format!("T{}", suffix % 1_000_000))
    .fetch_one(&pool)
    .await
    .unwrap();

    let chapter_id: i32 = sqlx::query_scalar(
        "INSERT INTO chapters (book_id, chapter_number) VALUES ($1, 1) RETURNING id",
    )
    .bind(book_id)
    .fetch_one(&pool)
    .await
    .unwrap();

    let mut verse_ids = [0; 3];
    for (i, slot) in verse_ids.iter_mut().enumerate() {
        *slot = sqlx::query_scalar(
            "INSERT INTO verses (chapter_id, verse_number, text) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(chapter_id)
        .bind(i as i32 + 1)
        .bind(format!("In the beginning was the {marker} number {}", i + 1))
        .fetch_one(&pool)
        .await
        .unwrap();
    }

    let user = UserRepo::new(&pool)
        .create(&NewUser {
            username: Username::new(&format!("tester_{suffix}")).unwrap(),
            email: Email::new(&format!("tester_{suffix}@example.com")).unwrap(),
            first_name: PersonName::new("first name", Some("Test")).unwrap(),
            last_name: PersonName::default(),
            password_hash: "not-a-real-hash".into(),
        })
        .await
        .unwrap();

    Fixture {
        pool,
        user_id: user.id,
        verse_ids,
        marker,
    }
}

fn ids(raw: &[i32]) -> VerseIds {
    let wide: Vec<i64> = raw.iter().map(|&id| i64::from(id)).collect();
    VerseIds::new(&wide).unwrap()
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
}

#[tokio::test]
#[ignore = "requires database"]
async fn save_replaces_favorite_set() {
    let fx = fixture().await;
    let repo = DevotionalRepo::new(&fx.pool);
    let [v1, v2, v3] = fx.verse_ids;

    let first = repo
        .save(fx.user_id, date(1), &Reflection::new("first").unwrap(), &ids(&[v1, v2]))
        .await
        .unwrap();
    assert_eq!(first.favorite_verse_ids, vec![v1, v2]);

    let second = repo
        .save(fx.user_id, date(1), &Reflection::new("second").unwrap(), &ids(&[v3, v2]))
        .await
        .unwrap();
    assert_eq!(second.devotional_id, first.devotional_id);
    assert_eq!(second.reflection, "second");
    assert_eq!(second.favorite_verse_ids, vec![v2, v3]);

    let verses = repo.favorite_verses(fx.user_id, date(1)).await.unwrap();
    let listed: Vec<i32> = verses.iter().map(|v| v.verse_id).collect();
    assert_eq!(listed, vec![v2, v3]);
}

#[tokio::test]
#[ignore = "requires database"]
async fn unknown_verse_leaves_previous_state() {
    let fx = fixture().await;
    let repo = DevotionalRepo::new(&fx.pool);
    let [v1, ..] = fx.verse_ids;

    repo.save(fx.user_id, date(2), &Reflection::new("kept").unwrap(), &ids(&[v1]))
        .await
        .unwrap();

    let err = repo
        .save(
            fx.user_id,
            date(2),
            &Reflection::new("lost").unwrap(),
            &VerseIds::new(&[i64::from(v1), 2_000_000_000]).unwrap(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::UnknownReference { .. }));

    let stored = repo.get_for_date(fx.user_id, date(2)).await.unwrap().unwrap();
    assert_eq!(stored.reflection, "kept");
    assert_eq!(stored.favorite_verse_ids, vec![v1]);
}

#[tokio::test]
#[ignore = "requires database"]
async fn list_newest_first_and_delete() {
    let fx = fixture().await;
    let repo = DevotionalRepo::new(&fx.pool);
    let empty = VerseIds::default();

    for day in [3, 5, 4] {
        repo.save(fx.user_id, date(day), &Reflection::new("").unwrap(), &empty)
            .await
            .unwrap();
    }

    let page = repo.list(fx.user_id, Pagination::new(1, 2)).await.unwrap();
    assert_eq!(page.total, 3);
    let dates: Vec<NaiveDate> = page.items.iter().map(|d| d.devotional_date).collect();
    assert_eq!(dates, vec![date(5), date(4)]);
    assert!(page.has_next());

    repo.delete(fx.user_id, date(4)).await.unwrap();
    assert!(repo.get_for_date(fx.user_id, date(4)).await.unwrap().is_none());
    assert!(matches!(
        repo.delete(fx.user_id, date(4)).await,
        Err(DbError::NotFound { .. })
    ));
}

#[tokio::test]
#[ignore = "requires database"]
async fn search_finds_whole_words_and_falls_back_to_fragments() {
    let fx = fixture().await;
    let repo = SearchRepo::new(&fx.pool);

    let query = SearchQuery::new(&fx.marker).unwrap();
    let hits = repo.search(&query, SearchLimit::default()).await.unwrap();
    assert_eq!(hits.len(), 3);

    // Full-text misses a word fragment, so the substring fallback answers
    let fragment = &fx.marker[1..fx.marker.len() - 3];
    let query = SearchQuery::new(fragment).unwrap();
    let hits = repo.search(&query, SearchLimit::new(Some(2))).await.unwrap();
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|h| h.text.contains(fragment)));
}

#[tokio::test]
#[ignore = "requires database"]
async fn duplicate_username_is_conflict() {
    let fx = fixture().await;
    let user = sqlx::query_scalar::<_, String>("SELECT username FROM users WHERE id = $1")
        .bind(fx.user_id)
        .fetch_one(&fx.pool)
        .await
        .unwrap();

    let err = UserRepo::new(&fx.pool)
        .create(&NewUser {
            username: Username::new(&user).unwrap(),
            email: Email::new("another@example.com").unwrap(),
            first_name: PersonName::default(),
            last_name: PersonName::default(),
            password_hash: "x".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Conflict { .. }));
}
