//! News and comment storage backends

use crate::storage::{StorageError, StorageResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use quill_core::{Comment, NewComment, NewsItem, UserId};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// News and comment persistence
#[async_trait]
pub trait NewsStorage: Send + Sync {
    async fn insert_news(&self, title: &str, text: &str, date: NaiveDate) -> StorageResult<NewsItem>;

    async fn get_news(&self, id: i64) -> StorageResult<Option<NewsItem>>;

    /// Newest first by date, ties broken by id descending
    async fn list_news(&self, limit: usize) -> StorageResult<Vec<NewsItem>>;

    async fn count_news(&self) -> StorageResult<u64>;

    async fn insert_comment(&self, comment: NewComment) -> StorageResult<Comment>;

    async fn get_comment(&self, id: i64) -> StorageResult<Option<Comment>>;

    /// Comments on one news item, oldest first
    async fn list_comments(&self, news_id: i64) -> StorageResult<Vec<Comment>>;

    /// Replace the text only; author, news item and creation time are kept
    async fn update_comment_text(&self, id: i64, text: &str) -> StorageResult<()>;

    async fn delete_comment(&self, id: i64) -> StorageResult<()>;

    async fn count_comments(&self) -> StorageResult<u64>;

    /// Health check for the storage backend
    async fn health_check(&self) -> StorageResult<()>;
}

#[derive(Default)]
struct MemoryNews {
    next_news_id: i64,
    next_comment_id: i64,
    news: BTreeMap<i64, NewsItem>,
    comments: BTreeMap<i64, Comment>,
}

/// In-memory news storage (default implementation)
pub struct MemoryNewsStorage {
    inner: Arc<RwLock<MemoryNews>>,
}

impl MemoryNewsStorage {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryNews::default())),
        }
    }
}

impl Default for MemoryNewsStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NewsStorage for MemoryNewsStorage {
    async fn insert_news(&self, title: &str, text: &str, date: NaiveDate) -> StorageResult<NewsItem> {
        let mut inner = self.inner.write().await;
        inner.next_news_id += 1;
        let item = NewsItem {
            id: inner.next_news_id,
            title: title.to_string(),
            text: text.to_string(),
            date,
        };
        inner.news.insert(item.id, item.clone());
        debug!("Saved news {} to memory storage", item.id);
        Ok(item)
    }

    async fn get_news(&self, id: i64) -> StorageResult<Option<NewsItem>> {
        let inner = self.inner.read().await;
        Ok(inner.news.get(&id).cloned())
    }

    async fn list_news(&self, limit: usize) -> StorageResult<Vec<NewsItem>> {
        let inner = self.inner.read().await;
        let mut items: Vec<NewsItem> = inner.news.values().cloned().collect();
        items.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        items.truncate(limit);
        Ok(items)
    }

    async fn count_news(&self) -> StorageResult<u64> {
        let inner = self.inner.read().await;
        Ok(inner.news.len() as u64)
    }

    async fn insert_comment(&self, comment: NewComment) -> StorageResult<Comment> {
        let mut inner = self.inner.write().await;
        if !inner.news.contains_key(&comment.news) {
            return Err(StorageError::not_found(format!("news {}", comment.news)));
        }

        inner.next_comment_id += 1;
        let stored = Comment {
            id: inner.next_comment_id,
            news: comment.news,
            author: comment.author,
            text: comment.text,
            created: comment.created,
        };
        inner.comments.insert(stored.id, stored.clone());
        debug!("Saved comment {} to memory storage", stored.id);
        Ok(stored)
    }

    async fn get_comment(&self, id: i64) -> StorageResult<Option<Comment>> {
        let inner = self.inner.read().await;
        Ok(inner.comments.get(&id).cloned())
    }

    async fn list_comments(&self, news_id: i64) -> StorageResult<Vec<Comment>> {
        let inner = self.inner.read().await;
        let mut comments: Vec<Comment> = inner
            .comments
            .values()
            .filter(|comment| comment.news == news_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created.cmp(&b.created).then(a.id.cmp(&b.id)));
        Ok(comments)
    }

    async fn update_comment_text(&self, id: i64, text: &str) -> StorageResult<()> {
        let mut inner = self.inner.write().await;
        match inner.comments.get_mut(&id) {
            Some(comment) => {
                comment.text = text.to_string();
                debug!("Updated comment {} in memory storage", id);
                Ok(())
            }
            None => Err(StorageError::not_found(format!("comment {}", id))),
        }
    }

    async fn delete_comment(&self, id: i64) -> StorageResult<()> {
        let mut inner = self.inner.write().await;
        if inner.comments.remove(&id).is_some() {
            debug!("Deleted comment {} from memory storage", id);
            Ok(())
        } else {
            Err(StorageError::not_found(format!("comment {}", id)))
        }
    }

    async fn count_comments(&self) -> StorageResult<u64> {
        let inner = self.inner.read().await;
        Ok(inner.comments.len() as u64)
    }

    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}

/// SQLite news storage implementation
#[cfg(feature = "sqlite")]
pub struct SqliteNewsStorage {
    pool: sqlx::SqlitePool,
}

#[cfg(feature = "sqlite")]
#[derive(sqlx::FromRow)]
struct NewsRow {
    id: i64,
    title: String,
    text: String,
    date: NaiveDate,
}

#[cfg(feature = "sqlite")]
impl From<NewsRow> for NewsItem {
    fn from(row: NewsRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            text: row.text,
            date: row.date,
        }
    }
}

#[cfg(feature = "sqlite")]
#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    news_id: i64,
    author: String,
    text: String,
    created: DateTime<Utc>,
}

#[cfg(feature = "sqlite")]
impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            news: row.news_id,
            author: UserId::new(row.author),
            text: row.text,
            created: row.created,
        }
    }
}

#[cfg(feature = "sqlite")]
fn query_error(action: &str) -> impl FnOnce(sqlx::Error) -> StorageError + '_ {
    move |e| StorageError::backend("sqlite_storage", format!("Failed to {}: {}", action, e))
}

#[cfg(feature = "sqlite")]
impl SqliteNewsStorage {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }

    /// Create from database URL, creating the schema if needed
    pub async fn from_url(database_url: &str) -> StorageResult<Self> {
        let pool = crate::storage::connect_sqlite(database_url).await?;
        let storage = Self::new(pool);
        storage.create_tables().await?;
        Ok(storage)
    }

    pub async fn create_tables(&self) -> StorageResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS news (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                text TEXT NOT NULL,
                date DATE NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(query_error("create news table"))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS comments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                news_id INTEGER NOT NULL REFERENCES news(id) ON DELETE CASCADE,
                author TEXT NOT NULL,
                text TEXT NOT NULL,
                created DATETIME NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(query_error("create comments table"))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_comments_news ON comments(news_id, created)")
            .execute(&self.pool)
            .await
            .map_err(query_error("create comments index"))?;

        debug!("News tables ready");
        Ok(())
    }
}

#[cfg(feature = "sqlite")]
#[async_trait]
impl NewsStorage for SqliteNewsStorage {
    async fn insert_news(&self, title: &str, text: &str, date: NaiveDate) -> StorageResult<NewsItem> {
        let result = sqlx::query("INSERT INTO news (title, text, date) VALUES (?, ?, ?)")
            .bind(title)
            .bind(text)
            .bind(date)
            .execute(&self.pool)
            .await
            .map_err(query_error("insert news"))?;

        let id = result.last_insert_rowid();
        debug!("Saved news {} to SQLite storage", id);
        Ok(NewsItem {
            id,
            title: title.to_string(),
            text: text.to_string(),
            date,
        })
    }

    async fn get_news(&self, id: i64) -> StorageResult<Option<NewsItem>> {
        let row = sqlx::query_as::<_, NewsRow>("SELECT id, title, text, date FROM news WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error("load news"))?;

        Ok(row.map(NewsItem::from))
    }

    async fn list_news(&self, limit: usize) -> StorageResult<Vec<NewsItem>> {
        let rows = sqlx::query_as::<_, NewsRow>(
            "SELECT id, title, text, date FROM news ORDER BY date DESC, id DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error("list news"))?;

        Ok(rows.into_iter().map(NewsItem::from).collect())
    }

    async fn count_news(&self) -> StorageResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM news")
            .fetch_one(&self.pool)
            .await
            .map_err(query_error("count news"))?;
        Ok(count as u64)
    }

    async fn insert_comment(&self, comment: NewComment) -> StorageResult<Comment> {
        let result = sqlx::query(
            "INSERT INTO comments (news_id, author, text, created) VALUES (?, ?, ?, ?)",
        )
        .bind(comment.news)
        .bind(comment.author.as_str())
        .bind(&comment.text)
        .bind(comment.created)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                StorageError::not_found(format!("news {}", comment.news))
            }
            _ => query_error("insert comment")(e),
        })?;

        let id = result.last_insert_rowid();
        debug!("Saved comment {} to SQLite storage", id);
        Ok(Comment {
            id,
            news: comment.news,
            author: comment.author,
            text: comment.text,
            created: comment.created,
        })
    }

    async fn get_comment(&self, id: i64) -> StorageResult<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>(
            "SELECT id, news_id, author, text, created FROM comments WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error("load comment"))?;

        Ok(row.map(Comment::from))
    }

    async fn list_comments(&self, news_id: i64) -> StorageResult<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            "SELECT id, news_id, author, text, created FROM comments WHERE news_id = ? ORDER BY created, id",
        )
        .bind(news_id)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error("list comments"))?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn update_comment_text(&self, id: i64, text: &str) -> StorageResult<()> {
        let result = sqlx::query("UPDATE comments SET text = ? WHERE id = ?")
            .bind(text)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(query_error("update comment"))?;

        if result.rows_affected() > 0 {
            debug!("Updated comment {} in SQLite storage", id);
            Ok(())
        } else {
            Err(StorageError::not_found(format!("comment {}", id)))
        }
    }

    async fn delete_comment(&self, id: i64) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(query_error("delete comment"))?;

        if result.rows_affected() > 0 {
            debug!("Deleted comment {} from SQLite storage", id);
            Ok(())
        } else {
            Err(StorageError::not_found(format!("comment {}", id)))
        }
    }

    async fn count_comments(&self) -> StorageResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments")
            .fetch_one(&self.pool)
            .await
            .map_err(query_error("count comments"))?;
        Ok(count as u64)
    }

    async fn health_check(&self) -> StorageResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(query_error("run health check"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    async fn exercise_backend(storage: &dyn NewsStorage) {
        let older = storage.insert_news("Старая", "Текст", date(1)).await.unwrap();
        let newer = storage.insert_news("Новая", "Текст", date(3)).await.unwrap();
        let same_day = storage.insert_news("Тоже новая", "Текст", date(3)).await.unwrap();

        let listed = storage.list_news(10).await.unwrap();
        let ids: Vec<i64> = listed.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![same_day.id, newer.id, older.id]);
        assert_eq!(storage.list_news(2).await.unwrap().len(), 2);
        assert_eq!(storage.get_news(older.id).await.unwrap(), Some(older.clone()));

        let now = Utc::now();
        let later = storage
            .insert_comment(NewComment {
                news: older.id,
                author: UserId::new("alice"),
                text: "Второй".to_string(),
                created: now + Duration::minutes(5),
            })
            .await
            .unwrap();
        let earlier = storage
            .insert_comment(NewComment {
                news: older.id,
                author: UserId::new("bob"),
                text: "Первый".to_string(),
                created: now,
            })
            .await
            .unwrap();

        let thread = storage.list_comments(older.id).await.unwrap();
        let ids: Vec<i64> = thread.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![earlier.id, later.id]);
        assert!(storage.list_comments(newer.id).await.unwrap().is_empty());

        let orphan = storage
            .insert_comment(NewComment {
                news: 9999,
                author: UserId::new("alice"),
                text: "Никуда".to_string(),
                created: now,
            })
            .await;
        assert!(matches!(orphan, Err(StorageError::NotFound { .. })));

        storage.update_comment_text(later.id, "Исправлено").await.unwrap();
        let edited = storage.get_comment(later.id).await.unwrap().unwrap();
        assert_eq!(edited.text, "Исправлено");
        assert_eq!(edited.author, later.author);
        assert_eq!(edited.news, later.news);

        storage.delete_comment(earlier.id).await.unwrap();
        assert_eq!(storage.count_comments().await.unwrap(), 1);
        assert!(matches!(
            storage.delete_comment(earlier.id).await,
            Err(StorageError::NotFound { .. })
        ));
        assert_eq!(storage.count_news().await.unwrap(), 3);
        storage.health_check().await.unwrap();
    }

    #[tokio::test]
    async fn memory_backend_behaves() {
        exercise_backend(&MemoryNewsStorage::new()).await;
    }

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn sqlite_backend_behaves() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("news.db").display());
        let storage = SqliteNewsStorage::from_url(&url).await.unwrap();
        exercise_backend(&storage).await;
    }
}
