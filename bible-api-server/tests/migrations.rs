//! Schema upgrade over tables created by the Bible text loader.
//!
//! Each test works in its own Postgres schema so it can recreate tables
//! without disturbing the shared ones.
//!
//! Run with: DATABASE_URL=postgres://... cargo test -p bible-api-server -- --ignored

use std::time::{SystemTime, UNIX_EPOCH};

use bible_api_server::db::{create_pool, migrations, NewUser, UserRepo};
use bible_api_server::models::{Email, PersonName, Username};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};

/// Users table exactly as the loader leaves it.
const LOADER_USERS: &str = r#"
CREATE TABLE users (
    id SERIAL PRIMARY KEY,
    username VARCHAR(50) UNIQUE NOT NULL,
    email VARCHAR(100) UNIQUE NOT NULL,
    password_hash VARCHAR(255) NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)
"#;

struct Scratch {
    admin: PgPool,
    pool: PgPool,
    schema: String,
}

impl Scratch {
    async fn cleanup(self) {
        self.pool.close().await;
        sqlx::query(&format!("DROP SCHEMA {} CASCADE", self.schema))
            .execute(&self.admin)
            .await
            .unwrap();
    }
}

/// A pool whose connections only see a fresh, empty schema.
async fn scratch_schema() -> Scratch {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let admin = create_pool(&url).await.unwrap();

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let schema = format!("upgrade_{}_{}", std::process::id(), nanos % 1_000_000_000);
    sqlx::query(&format!("CREATE SCHEMA {schema}"))
        .execute(&admin)
        .await
        .unwrap();

    let search_path = format!("SET search_path TO {schema}");
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .after_connect(move |conn, _meta| {
            let search_path = search_path.clone();
            Box::pin(async move {
                conn.execute(search_path.as_str()).await?;
                Ok(())
            })
        })
        .connect(&url)
        .await
        .unwrap();

    Scratch {
        admin,
        pool,
        schema,
    }
}

fn new_user(name: &str) -> NewUser {
    NewUser {
        username: Username::new(name).unwrap(),
        email: Email::new(&format!("{name}@example.com")).unwrap(),
        first_name: PersonName::new("first name", Some("Naomi")).unwrap(),
        last_name: PersonName::default(),
        password_hash: "not-a-real-hash".into(),
    }
}

#[tokio::test]
#[ignore = "requires database"]
async fn migrate_upgrades_loader_users_table() {
    let scratch = scratch_schema().await;
    let pool = &scratch.pool;

    sqlx::query(LOADER_USERS).execute(pool).await.unwrap();
    sqlx::query("INSERT INTO users (username, email, password_hash) VALUES ('boaz', 'boaz@example.com', 'x')")
        .execute(pool)
        .await
        .unwrap();

    migrations::run(pool).await.unwrap();

    let repo = UserRepo::new(pool);
    let created = repo.create(&new_user("naomi")).await.unwrap();
    assert_eq!(created.first_name, "Naomi");
    assert_eq!(created.last_name, "");

    // Rows written before the upgrade read back with empty names
    let existing = repo.get_by_username("boaz").await.unwrap();
    assert_eq!(existing.first_name, "");
    assert_eq!(existing.last_name, "");

    let data_type: String = sqlx::query_scalar(
        "SELECT data_type::text FROM information_schema.columns \
         WHERE table_schema = current_schema() AND table_name = 'users' AND column_name = 'created_at'",
    )
    .fetch_one(pool)
    .await
    .unwrap();
    assert_eq!(data_type, "timestamp with time zone");

    // A second start over the upgraded table changes nothing
    migrations::run(pool).await.unwrap();
    assert!(repo.get_by_username("naomi").await.is_ok());

    scratch.cleanup().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn migrate_creates_schema_from_nothing() {
    let scratch = scratch_schema().await;
    let pool = &scratch.pool;

    migrations::run(pool).await.unwrap();

    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT table_name::text FROM information_schema.tables \
         WHERE table_schema = current_schema() ORDER BY table_name",
    )
    .fetch_all(pool)
    .await
    .unwrap();
    assert_eq!(
        tables,
        [
            "books",
            "chapters",
            "devotional_favorite_verses",
            "devotionals",
            "users",
            "verses"
        ]
    );

    let created = UserRepo::new(pool).create(&new_user("ruth")).await.unwrap();
    assert_eq!(created.username, "ruth");

    scratch.cleanup().await;
}
