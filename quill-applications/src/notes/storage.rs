//! Note storage backends
//!
//! In-memory and SQLite persistence for notes. Both backends enforce slug
//! uniqueness at write time and report collisions as [`StorageError::SlugTaken`].

use crate::storage::{StorageError, StorageResult};
use async_trait::async_trait;
use quill_core::{NewNote, Note, UserId};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Note persistence
#[async_trait]
pub trait NoteStorage: Send + Sync {
    /// Store a new note and assign its id
    async fn insert_note(&self, note: NewNote) -> StorageResult<Note>;

    async fn get_note(&self, id: i64) -> StorageResult<Option<Note>>;

    async fn get_note_by_slug(&self, slug: &str) -> StorageResult<Option<Note>>;

    /// Notes written by `author`, oldest first
    async fn list_notes_by_author(&self, author: &UserId) -> StorageResult<Vec<Note>>;

    /// Whether any note other than `exclude_id` uses `slug`
    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> StorageResult<bool>;

    /// Overwrite title, text and slug; the author never changes
    async fn update_note(&self, note: &Note) -> StorageResult<()>;

    async fn delete_note(&self, id: i64) -> StorageResult<()>;

    async fn count_notes(&self) -> StorageResult<u64>;

    /// Health check for the storage backend
    async fn health_check(&self) -> StorageResult<()>;
}

#[derive(Default)]
struct MemoryNotes {
    next_id: i64,
    notes: BTreeMap<i64, Note>,
}

impl MemoryNotes {
    fn slug_in_use(&self, slug: &str, exclude_id: Option<i64>) -> bool {
        self.notes
            .values()
            .any(|note| note.slug == slug && Some(note.id) != exclude_id)
    }
}

/// In-memory note storage (default implementation)
pub struct MemoryNoteStorage {
    inner: Arc<RwLock<MemoryNotes>>,
}

impl MemoryNoteStorage {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryNotes::default())),
        }
    }
}

impl Default for MemoryNoteStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NoteStorage for MemoryNoteStorage {
    async fn insert_note(&self, note: NewNote) -> StorageResult<Note> {
        let mut inner = self.inner.write().await;
        if inner.slug_in_use(&note.slug, None) {
            return Err(StorageError::SlugTaken { slug: note.slug });
        }

        inner.next_id += 1;
        let stored = Note {
            id: inner.next_id,
            title: note.title,
            text: note.text,
            slug: note.slug,
            author: note.author,
        };
        inner.notes.insert(stored.id, stored.clone());
        debug!("Saved note {} to memory storage", stored.id);
        Ok(stored)
    }

    async fn get_note(&self, id: i64) -> StorageResult<Option<Note>> {
        let inner = self.inner.read().await;
        Ok(inner.notes.get(&id).cloned())
    }

    async fn get_note_by_slug(&self, slug: &str) -> StorageResult<Option<Note>> {
        let inner = self.inner.read().await;
        Ok(inner.notes.values().find(|note| note.slug == slug).cloned())
    }

    async fn list_notes_by_author(&self, author: &UserId) -> StorageResult<Vec<Note>> {
        let inner = self.inner.read().await;
        Ok(inner
            .notes
            .values()
            .filter(|note| &note.author == author)
            .cloned()
            .collect())
    }

    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> StorageResult<bool> {
        let inner = self.inner.read().await;
        Ok(inner.slug_in_use(slug, exclude_id))
    }

    async fn update_note(&self, note: &Note) -> StorageResult<()> {
        let mut inner = self.inner.write().await;
        if inner.slug_in_use(&note.slug, Some(note.id)) {
            return Err(StorageError::SlugTaken {
                slug: note.slug.clone(),
            });
        }

        match inner.notes.get_mut(&note.id) {
            Some(stored) => {
                stored.title = note.title.clone();
                stored.text = note.text.clone();
                stored.slug = note.slug.clone();
                debug!("Updated note {} in memory storage", note.id);
                Ok(())
            }
            None => Err(StorageError::not_found(format!("note {}", note.id))),
        }
    }

    async fn delete_note(&self, id: i64) -> StorageResult<()> {
        let mut inner = self.inner.write().await;
        if inner.notes.remove(&id).is_some() {
            debug!("Deleted note {} from memory storage", id);
            Ok(())
        } else {
            Err(StorageError::not_found(format!("note {}", id)))
        }
    }

    async fn count_notes(&self) -> StorageResult<u64> {
        let inner = self.inner.read().await;
        Ok(inner.notes.len() as u64)
    }

    async fn health_check(&self) -> StorageResult<()> {
        // Memory storage is always healthy
        Ok(())
    }
}

/// SQLite note storage implementation
#[cfg(feature = "sqlite")]
pub struct SqliteNoteStorage {
    pool: sqlx::SqlitePool,
}

#[cfg(feature = "sqlite")]
#[derive(sqlx::FromRow)]
struct NoteRow {
    id: i64,
    title: String,
    text: String,
    slug: String,
    author: String,
}

#[cfg(feature = "sqlite")]
impl From<NoteRow> for Note {
    fn from(row: NoteRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            text: row.text,
            slug: row.slug,
            author: UserId::new(row.author),
        }
    }
}

#[cfg(feature = "sqlite")]
impl SqliteNoteStorage {
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
            CREATE TABLE IF NOT EXISTS notes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                text TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                author TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            StorageError::backend("sqlite_storage", format!("Failed to create notes table: {}", e))
        })?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_notes_author ON notes(author)")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                StorageError::backend(
                    "sqlite_storage",
                    format!("Failed to create notes index: {}", e),
                )
            })?;

        debug!("Notes table ready");
        Ok(())
    }
}

#[cfg(feature = "sqlite")]
#[async_trait]
impl NoteStorage for SqliteNoteStorage {
    async fn insert_note(&self, note: NewNote) -> StorageResult<Note> {
        let result =
            sqlx::query("INSERT INTO notes (title, text, slug, author) VALUES (?, ?, ?, ?)")
                .bind(&note.title)
                .bind(&note.text)
                .bind(&note.slug)
                .bind(note.author.as_str())
                .execute(&self.pool)
                .await
                .map_err(|e| crate::storage::map_write_error(e, &note.slug, "insert note"))?;

        let id = result.last_insert_rowid();
        debug!("Saved note {} to SQLite storage", id);
        Ok(Note {
            id,
            title: note.title,
            text: note.text,
            slug: note.slug,
            author: note.author,
        })
    }

    async fn get_note(&self, id: i64) -> StorageResult<Option<Note>> {
        let row = sqlx::query_as::<_, NoteRow>(
            "SELECT id, title, text, slug, author FROM notes WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            StorageError::backend("sqlite_storage", format!("Failed to load note: {}", e))
        })?;

        Ok(row.map(Note::from))
    }

    async fn get_note_by_slug(&self, slug: &str) -> StorageResult<Option<Note>> {
        let row = sqlx::query_as::<_, NoteRow>(
            "SELECT id, title, text, slug, author FROM notes WHERE slug = ?",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            StorageError::backend("sqlite_storage", format!("Failed to load note: {}", e))
        })?;

        Ok(row.map(Note::from))
    }

    async fn list_notes_by_author(&self, author: &UserId) -> StorageResult<Vec<Note>> {
        let rows = sqlx::query_as::<_, NoteRow>(
            "SELECT id, title, text, slug, author FROM notes WHERE author = ? ORDER BY id",
        )
        .bind(author.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            StorageError::backend("sqlite_storage", format!("Failed to list notes: {}", e))
        })?;

        debug!("Listed {} notes for {} from SQLite storage", rows.len(), author);
        Ok(rows.into_iter().map(Note::from).collect())
    }

    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> StorageResult<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM notes WHERE slug = ? AND id IS NOT ?")
                .bind(slug)
                .bind(exclude_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    StorageError::backend(
                        "sqlite_storage",
                        format!("Failed to check slug: {}", e),
                    )
                })?;

        Ok(count > 0)
    }

    async fn update_note(&self, note: &Note) -> StorageResult<()> {
        let result = sqlx::query("UPDATE notes SET title = ?, text = ?, slug = ? WHERE id = ?")
            .bind(&note.title)
            .bind(&note.text)
            .bind(&note.slug)
            .bind(note.id)
            .execute(&self.pool)
            .await
            .map_err(|e| crate::storage::map_write_error(e, &note.slug, "update note"))?;

        if result.rows_affected() > 0 {
            debug!("Updated note {} in SQLite storage", note.id);
            Ok(())
        } else {
            Err(StorageError::not_found(format!("note {}", note.id)))
        }
    }

    async fn delete_note(&self, id: i64) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                StorageError::backend("sqlite_storage", format!("Failed to delete note: {}", e))
            })?;

        if result.rows_affected() > 0 {
            debug!("Deleted note {} from SQLite storage", id);
            Ok(())
        } else {
            Err(StorageError::not_found(format!("note {}", id)))
        }
    }

    async fn count_notes(&self) -> StorageResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notes")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                StorageError::backend("sqlite_storage", format!("Failed to count notes: {}", e))
            })?;

        Ok(count as u64)
    }

    async fn health_check(&self) -> StorageResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                StorageError::backend("sqlite_storage", format!("Health check failed: {}", e))
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_note(slug: &str, author: &str) -> NewNote {
        NewNote {
            title: "Заголовок".to_string(),
            text: "Текст".to_string(),
            slug: slug.to_string(),
            author: UserId::new(author),
        }
    }

    async fn exercise_backend(storage: &dyn NoteStorage) {
        let first = storage.insert_note(new_note("first", "alice")).await.unwrap();
        let second = storage.insert_note(new_note("second", "bob")).await.unwrap();
        assert!(second.id > first.id);
        assert_eq!(storage.count_notes().await.unwrap(), 2);

        let taken = storage.insert_note(new_note("first", "bob")).await;
        assert!(matches!(taken, Err(StorageError::SlugTaken { slug }) if slug == "first"));
        assert_eq!(storage.count_notes().await.unwrap(), 2);

        assert!(storage.slug_exists("first", None).await.unwrap());
        assert!(!storage.slug_exists("first", Some(first.id)).await.unwrap());

        let alice = storage
            .list_notes_by_author(&UserId::new("alice"))
            .await
            .unwrap();
        assert_eq!(alice, vec![first.clone()]);

        let mut renamed = first.clone();
        renamed.slug = "second".to_string();
        assert!(matches!(
            storage.update_note(&renamed).await,
            Err(StorageError::SlugTaken { .. })
        ));

        renamed.slug = "renamed".to_string();
        renamed.text = "Новый текст".to_string();
        storage.update_note(&renamed).await.unwrap();
        let loaded = storage.get_note_by_slug("renamed").await.unwrap().unwrap();
        assert_eq!(loaded.text, "Новый текст");
        assert_eq!(loaded.author, UserId::new("alice"));
        assert!(storage.get_note_by_slug("first").await.unwrap().is_none());

        storage.delete_note(first.id).await.unwrap();
        assert!(storage.get_note(first.id).await.unwrap().is_none());
        assert!(matches!(
            storage.delete_note(first.id).await,
            Err(StorageError::NotFound { .. })
        ));
        assert_eq!(storage.count_notes().await.unwrap(), 1);
        storage.health_check().await.unwrap();
    }

    #[tokio::test]
    async fn memory_backend_behaves() {
        exercise_backend(&MemoryNoteStorage::new()).await;
    }

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn sqlite_backend_behaves() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("notes.db").display());
        let storage = SqliteNoteStorage::from_url(&url).await.unwrap();
        exercise_backend(&storage).await;
    }
}
