//! Ownership gate for notes and comments
//!
//! A resource owned by someone else is reported as not found, so its
//! existence is never revealed.

use super::IdentityContext;
use crate::{ApplicationError, ApplicationResult};
use quill_core::{Comment, Note, UserId};
use tracing::warn;

/// A record with a single author
pub trait Owned {
    fn owner(&self) -> &UserId;

    /// Label used in logs and not-found errors
    fn resource_label(&self) -> String;
}

impl Owned for Note {
    fn owner(&self) -> &UserId {
        &self.author
    }

    fn resource_label(&self) -> String {
        format!("note '{}'", self.slug)
    }
}

impl Owned for Comment {
    fn owner(&self) -> &UserId {
        &self.author
    }

    fn resource_label(&self) -> String {
        format!("comment {}", self.id)
    }
}

pub fn is_owner<T: Owned + ?Sized>(identity: &IdentityContext, resource: &T) -> bool {
    identity
        .user_id()
        .map_or(false, |user| user == resource.owner())
}

/// Only the author may edit
pub fn can_edit<T: Owned + ?Sized>(identity: &IdentityContext, resource: &T) -> bool {
    is_owner(identity, resource)
}

/// Only the author may delete
pub fn can_delete<T: Owned + ?Sized>(identity: &IdentityContext, resource: &T) -> bool {
    is_owner(identity, resource)
}

/// Pass `resource` through if `identity` owns it, otherwise report it as not found
pub fn ensure_owner<T: Owned>(
    identity: &IdentityContext,
    resource: T,
    operation: &str,
) -> ApplicationResult<T> {
    if is_owner(identity, &resource) {
        return Ok(resource);
    }

    warn!(
        operation = operation,
        identity = %identity,
        "Hiding {} from non-owner",
        resource.resource_label()
    );
    Err(ApplicationError::not_found(resource.resource_label()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn note(author: &str) -> Note {
        Note {
            id: 1,
            title: "Заголовок".to_string(),
            text: "Текст".to_string(),
            slug: "zagolovok".to_string(),
            author: UserId::new(author),
        }
    }

    fn comment(author: &str) -> Comment {
        Comment {
            id: 7,
            news: 1,
            author: UserId::new(author),
            text: "Текст комментария".to_string(),
            created: Utc::now(),
        }
    }

    #[test]
    fn only_author_can_edit_or_delete() {
        let author = IdentityContext::authenticated("author");
        let reader = IdentityContext::authenticated("reader");
        let anonymous = IdentityContext::anonymous();

        for resource in [&note("author") as &dyn Owned, &comment("author")] {
            assert!(can_edit(&author, resource));
            assert!(can_delete(&author, resource));
            assert!(!can_edit(&reader, resource));
            assert!(!can_delete(&reader, resource));
            assert!(!can_edit(&anonymous, resource));
            assert!(!can_delete(&anonymous, resource));
        }
    }

    #[test]
    fn non_owner_sees_not_found() {
        let reader = IdentityContext::authenticated("reader");
        let err = ensure_owner(&reader, note("author"), "note_detail").unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound { .. }));

        let owner = IdentityContext::authenticated("author");
        let kept = ensure_owner(&owner, comment("author"), "edit_comment").unwrap();
        assert_eq!(kept.id, 7);
    }
}
