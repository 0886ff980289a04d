//! Note access control
//!
//! Every read and write goes through the ownership gate: a note owned by
//! someone else behaves exactly like a note that does not exist.

use super::form::{slug_taken_message, CleanedNote, NoteForm};
use super::storage::NoteStorage;
use crate::auth::{self, IdentityContext};
use crate::storage::StorageError;
use crate::{ApplicationError, ApplicationResult};
use quill_core::{log_operation_start, log_operation_success, NewNote, Note};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct NoteService {
    storage: Arc<dyn NoteStorage>,
}

impl NoteService {
    pub fn new(storage: Arc<dyn NoteStorage>) -> Self {
        Self { storage }
    }

    /// The caller's own notes in creation order; empty for anonymous callers
    pub async fn list_visible_notes(&self, identity: &IdentityContext) -> ApplicationResult<Vec<Note>> {
        let Some(user) = identity.user_id() else {
            return Ok(Vec::new());
        };

        let notes = self.storage.list_notes_by_author(user).await?;
        debug!("Listed {} notes for {}", notes.len(), user);
        Ok(notes)
    }

    pub fn can_edit(&self, identity: &IdentityContext, note: &Note) -> bool {
        auth::can_edit(identity, note)
    }

    pub fn can_delete(&self, identity: &IdentityContext, note: &Note) -> bool {
        auth::can_delete(identity, note)
    }

    /// Look up a note for detail, edit or delete.
    ///
    /// Missing slugs and notes owned by others both yield [`ApplicationError::NotFound`].
    pub async fn note_for(&self, identity: &IdentityContext, slug: &str) -> ApplicationResult<Note> {
        identity.require_authenticated("note_for")?;

        let note = self
            .storage
            .get_note_by_slug(slug)
            .await?
            .ok_or_else(|| ApplicationError::not_found(format!("note '{}'", slug)))?;

        auth::ensure_owner(identity, note, "note_for")
    }

    pub async fn create_note(&self, identity: &IdentityContext, form: &NoteForm) -> ApplicationResult<Note> {
        let author = identity.require_authenticated("create_note")?.clone();
        log_operation_start!("create_note", author = %author);

        let cleaned = form.clean()?;
        self.ensure_slug_free(&cleaned, None).await?;

        let note = self
            .storage
            .insert_note(NewNote {
                title: cleaned.title,
                text: cleaned.text,
                slug: cleaned.slug,
                author,
            })
            .await
            .map_err(slug_conflict)?;

        log_operation_success!("create_note", note_id = note.id, slug = %note.slug);
        Ok(note)
    }

    /// Replace title, text and slug of the caller's note
    pub async fn update_note(
        &self,
        identity: &IdentityContext,
        slug: &str,
        form: &NoteForm,
    ) -> ApplicationResult<Note> {
        let existing = self.note_for(identity, slug).await?;
        let cleaned = form.clean()?;
        self.ensure_slug_free(&cleaned, Some(existing.id)).await?;

        let updated = Note {
            title: cleaned.title,
            text: cleaned.text,
            slug: cleaned.slug,
            ..existing
        };
        self.storage
            .update_note(&updated)
            .await
            .map_err(slug_conflict)?;

        info!("Updated note {} ({} -> {})", updated.id, slug, updated.slug);
        Ok(updated)
    }

    /// Delete the caller's note, returning what was removed
    pub async fn delete_note(&self, identity: &IdentityContext, slug: &str) -> ApplicationResult<Note> {
        let note = self.note_for(identity, slug).await?;
        self.storage.delete_note(note.id).await?;

        info!("Deleted note {} ({})", note.id, note.slug);
        Ok(note)
    }

    pub async fn count_notes(&self) -> ApplicationResult<u64> {
        Ok(self.storage.count_notes().await?)
    }

    pub async fn health_check(&self) -> ApplicationResult<()> {
        Ok(self.storage.health_check().await?)
    }

    async fn ensure_slug_free(&self, cleaned: &CleanedNote, exclude_id: Option<i64>) -> ApplicationResult<()> {
        if self.storage.slug_exists(&cleaned.slug, exclude_id).await? {
            debug!("Rejecting duplicate slug {}", cleaned.slug);
            return Err(ApplicationError::validation(
                "slug",
                slug_taken_message(&cleaned.slug),
            ));
        }
        Ok(())
    }
}

/// A concurrent writer may claim the slug between the check and the write
fn slug_conflict(err: StorageError) -> ApplicationError {
    match err {
        StorageError::SlugTaken { slug } => {
            ApplicationError::validation("slug", slug_taken_message(&slug))
        }
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::MemoryNoteStorage;
    use crate::notes::SLUG_WARNING;

    fn service() -> NoteService {
        NoteService::new(Arc::new(MemoryNoteStorage::new()))
    }

    fn author() -> IdentityContext {
        IdentityContext::authenticated("author")
    }

    fn reader() -> IdentityContext {
        IdentityContext::authenticated("reader")
    }

    fn form() -> NoteForm {
        NoteForm::new("Заголовок", "Текст заметки").with_slug("note-slug")
    }

    #[tokio::test]
    async fn author_creates_and_lists_own_notes() {
        let service = service();
        let note = service.create_note(&author(), &form()).await.unwrap();
        assert_eq!(note.author.as_str(), "author");

        service
            .create_note(&reader(), &NoteForm::new("Чужая", "Текст"))
            .await
            .unwrap();

        let visible = service.list_visible_notes(&author()).await.unwrap();
        assert_eq!(visible, vec![note]);
        assert!(service
            .list_visible_notes(&IdentityContext::anonymous())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn anonymous_cannot_create() {
        let service = service();
        let err = service
            .create_note(&IdentityContext::anonymous(), &form())
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::AuthenticationRequired { .. }));
        assert_eq!(service.count_notes().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn duplicate_slug_is_a_field_error() {
        let service = service();
        service.create_note(&author(), &form()).await.unwrap();

        let err = service.create_note(&reader(), &form()).await.unwrap_err();
        match err {
            ApplicationError::Validation { field, message } => {
                assert_eq!(field, "slug");
                assert_eq!(message, format!("note-slug{}", SLUG_WARNING));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(service.count_notes().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn non_owner_gets_not_found_everywhere() {
        let service = service();
        let note = service.create_note(&author(), &form()).await.unwrap();

        assert!(matches!(
            service.note_for(&reader(), &note.slug).await,
            Err(ApplicationError::NotFound { .. })
        ));
        assert!(matches!(
            service
                .update_note(&reader(), &note.slug, &NoteForm::new("Другой", "Другой"))
                .await,
            Err(ApplicationError::NotFound { .. })
        ));
        assert!(matches!(
            service.delete_note(&reader(), &note.slug).await,
            Err(ApplicationError::NotFound { .. })
        ));

        assert_eq!(service.note_for(&author(), &note.slug).await.unwrap(), note);
        assert_eq!(service.count_notes().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn update_keeps_author_and_may_keep_slug() {
        let service = service();
        let note = service.create_note(&author(), &form()).await.unwrap();

        let edited = NoteForm::new("Новый заголовок", "Новый текст").with_slug("note-slug");
        let updated = service
            .update_note(&author(), &note.slug, &edited)
            .await
            .unwrap();
        assert_eq!(updated.id, note.id);
        assert_eq!(updated.author, note.author);
        assert_eq!(updated.title, "Новый заголовок");
        assert_eq!(service.count_notes().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn rejected_update_changes_nothing() {
        let service = service();
        let note = service.create_note(&author(), &form()).await.unwrap();
        service
            .create_note(&author(), &NoteForm::new("Второй", "Текст").with_slug("taken"))
            .await
            .unwrap();

        let clash = NoteForm::new("Новый", "Новый").with_slug("taken");
        let err = service
            .update_note(&author(), &note.slug, &clash)
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("slug"));
        assert_eq!(service.note_for(&author(), "note-slug").await.unwrap(), note);
    }

    #[tokio::test]
    async fn owner_deletes_exactly_one() {
        let service = service();
        let note = service.create_note(&author(), &form()).await.unwrap();
        service
            .create_note(&author(), &NoteForm::new("Второй", "Текст"))
            .await
            .unwrap();

        let deleted = service.delete_note(&author(), &note.slug).await.unwrap();
        assert_eq!(deleted.id, note.id);
        assert_eq!(service.count_notes().await.unwrap(), 1);
        assert!(service.note_for(&author(), &note.slug).await.is_err());
    }

    #[test]
    fn slug_conflict_maps_to_field_error() {
        let err = slug_conflict(StorageError::SlugTaken {
            slug: "dup".to_string(),
        });
        assert_eq!(err.field(), Some("slug"));

        let err = slug_conflict(StorageError::backend("test", "boom"));
        assert!(matches!(err, ApplicationError::Storage(_)));
    }
}
