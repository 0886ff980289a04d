//! Notes site page contexts

use super::{field_errors, FieldErrors};
use quill_applications::{ApplicationError, NoteForm};
use quill_core::Note;
use serde::Serialize;
use utoipa::ToSchema;

/// Notes home page
#[derive(Debug, Serialize, ToSchema)]
pub struct HomePage {
    pub authenticated: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NoteListPage {
    #[schema(value_type = Vec<Object>)]
    pub object_list: Vec<Note>,
}

/// Detail page and delete confirmation
#[derive(Debug, Serialize, ToSchema)]
pub struct NotePage {
    #[schema(value_type = Object)]
    pub note: Note,
}

/// Note form with its current values and any field errors
#[derive(Debug, Serialize, ToSchema)]
pub struct NoteFormContext {
    pub data: NoteForm,
    pub errors: FieldErrors,
}

/// Add and edit pages
#[derive(Debug, Serialize, ToSchema)]
pub struct NoteFormPage {
    pub form: NoteFormContext,
}

impl NoteFormPage {
    pub fn blank() -> Self {
        Self::with_data(NoteForm::default())
    }

    pub fn with_data(data: NoteForm) -> Self {
        Self {
            form: NoteFormContext {
                data,
                errors: FieldErrors::new(),
            },
        }
    }

    /// Prefilled with a stored note
    pub fn for_note(note: &Note) -> Self {
        Self::with_data(NoteForm {
            title: note.title.clone(),
            text: note.text.clone(),
            slug: Some(note.slug.clone()),
        })
    }

    /// Re-rendered after a rejected submission
    pub fn rejected(data: NoteForm, err: &ApplicationError) -> Self {
        Self {
            form: NoteFormContext {
                data,
                errors: field_errors(err),
            },
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DonePage {
    #[schema(example = "Успешно!")]
    pub message: String,
}
