//! User repository
//!
//! Uniqueness of username and email is enforced by the table constraints;
//! a duplicate insert comes back as `DbError::Conflict`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::db::DbError;
use crate::models::{Email, PersonName, Username};

/// Message returned for duplicate registrations
pub const DUPLICATE_USER_MESSAGE: &str = "Username or email already registered";

/// Public user profile
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

/// User row including the password hash (never serialized)
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for User {
    fn from(r: UserRecord) -> Self {
        Self {
            id: r.id,
            username: r.username,
            email: r.email,
            first_name: r.first_name,
            last_name: r.last_name,
            created_at: r.created_at,
        }
    }
}

/// Validated registration, password already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: Username,
    pub email: Email,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub password_hash: String,
}

/// User repository
pub struct UserRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new user.
    pub async fn create(&self, user: &NewUser) -> Result<User, DbError> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, first_name, last_name, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING id, username, email, first_name, last_name, created_at
            "#,
        )
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(user.first_name.as_str())
        .bind(user.last_name.as_str())
        .bind(&user.password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::Conflict { .. } => DbError::Conflict {
                message: DUPLICATE_USER_MESSAGE.to_owned(),
            },
            other => other,
        })?;

        tracing::info!(user_id = created.id, username = %created.username, "user registered");
        Ok(created)
    }

    /// Look up a user by username or email, for login.
    pub async fn find_by_login(&self, identifier: &str) -> Result<Option<UserRecord>, DbError> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, username, email, first_name, last_name, password_hash, created_at
            FROM users
            WHERE username = $1 OR email = $1
            ORDER BY (username = $1) DESC
            LIMIT 1
            "#,
        )
        .bind(identifier.trim())
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }

    /// Load the public profile for a token subject.
    pub async fn get_by_username(&self, username: &str) -> Result<User, DbError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, first_name, last_name, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("user", username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_to_public_user_drops_hash() {
        let record = UserRecord {
            id: 7,
            username: "ruth".into(),
            email: "ruth@example.com".into(),
            first_name: "Ruth".into(),
            last_name: "".into(),
            password_hash: "$argon2id$...".into(),
            created_at: Utc::now(),
        };
        let user = User::from(record);
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["username"], "ruth");
        assert!(json.get("password_hash").is_none());
    }
}
