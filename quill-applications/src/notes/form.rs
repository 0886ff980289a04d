//! Note form validation

use crate::{ApplicationError, ApplicationResult};
use quill_core::{slugify, SLUG_MAX_LENGTH, TITLE_MAX_LENGTH};
use serde::{Deserialize, Serialize};

/// Appended to a slug that another note already uses
pub const SLUG_WARNING: &str = " - такой slug уже существует, придумайте уникальное значение!";

pub const REQUIRED_FIELD: &str = "This field is required.";

const INVALID_SLUG: &str =
    "Enter a valid \u{201c}slug\u{201d} consisting of letters, numbers, underscores or hyphens.";

pub fn slug_taken_message(slug: &str) -> String {
    format!("{}{}", slug, SLUG_WARNING)
}

/// Submitted note fields. `slug` may be blank, in which case it is derived from the title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NoteForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub slug: Option<String>,
}

/// Note fields after validation, with the slug resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedNote {
    pub title: String,
    pub text: String,
    pub slug: String,
}

impl NoteForm {
    pub fn new<T: Into<String>, X: Into<String>>(title: T, text: X) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            slug: None,
        }
    }

    pub fn with_slug<S: Into<String>>(mut self, slug: S) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// Check field constraints and resolve the slug.
    ///
    /// Slug uniqueness needs the store and is checked by [`crate::NoteService`].
    pub fn clean(&self) -> ApplicationResult<CleanedNote> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ApplicationError::validation("title", REQUIRED_FIELD));
        }
        let title_len = title.chars().count();
        if title_len > TITLE_MAX_LENGTH {
            return Err(ApplicationError::validation(
                "title",
                format!(
                    "Ensure this value has at most {} characters (it has {}).",
                    TITLE_MAX_LENGTH, title_len
                ),
            ));
        }

        let text = self.text.trim();
        if text.is_empty() {
            return Err(ApplicationError::validation("text", REQUIRED_FIELD));
        }

        let slug = match self.slug.as_deref().map(str::trim) {
            Some(supplied) if !supplied.is_empty() => {
                if !supplied
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
                {
                    return Err(ApplicationError::validation("slug", INVALID_SLUG));
                }
                if supplied.len() > SLUG_MAX_LENGTH {
                    return Err(ApplicationError::validation(
                        "slug",
                        format!(
                            "Ensure this value has at most {} characters (it has {}).",
                            SLUG_MAX_LENGTH,
                            supplied.len()
                        ),
                    ));
                }
                supplied.to_string()
            }
            _ => slugify(title),
        };

        if slug.is_empty() {
            return Err(ApplicationError::validation("slug", REQUIRED_FIELD));
        }

        Ok(CleanedNote {
            title: title.to_string(),
            text: text.to_string(),
            slug,
        })
    }
}
