//! SQLite-backed user storage

use super::{jwt::AuthError, users::UserData};
use chrono::{DateTime, Utc};
use quill_core::UserId;
use sqlx::SqlitePool;
use tracing::{debug, info};

/// Database user record
#[derive(Debug, sqlx::FromRow)]
struct UserRecord {
    id: String,
    username: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<UserRecord> for UserData {
    fn from(record: UserRecord) -> Self {
        Self {
            id: UserId::new(record.id),
            username: record.username,
            password_hash: record.password_hash,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseUserStore {
    pool: SqlitePool,
}

impl DatabaseUserStore {
    /// Wrap `pool`, creating the users table if needed
    pub async fn new(pool: SqlitePool) -> Result<Self, AuthError> {
        let store = Self { pool };
        store.create_tables().await?;
        Ok(store)
    }

    async fn create_tables(&self) -> Result<(), AuthError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at DATETIME NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Storage(format!("Failed to create users table: {}", e)))?;

        info!("Users table ready");
        Ok(())
    }

    pub async fn insert_user(&self, user: &UserData) -> Result<(), AuthError> {
        sqlx::query("INSERT INTO users (id, username, password_hash, created_at) VALUES (?, ?, ?, ?)")
            .bind(user.id.as_str())
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                    AuthError::UsernameTaken
                }
                _ => AuthError::Storage(format!("Failed to insert user: {}", e)),
            })?;

        debug!("Saved user {} to database", user.username);
        Ok(())
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<UserData>, AuthError> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Storage(format!("Failed to load user: {}", e)))?;

        Ok(record.map(UserData::from))
    }

    pub async fn get_user_by_id(&self, user_id: &UserId) -> Result<Option<UserData>, AuthError> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, password_hash, created_at FROM users WHERE id = ?",
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Storage(format!("Failed to load user: {}", e)))?;

        Ok(record.map(UserData::from))
    }
}
