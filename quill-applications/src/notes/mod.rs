//! Notes site: personal notes visible only to their authors

pub mod form;
pub mod service;
pub mod storage;

pub use form::{slug_taken_message, CleanedNote, NoteForm, REQUIRED_FIELD, SLUG_WARNING};
pub use service::NoteService;
pub use storage::{MemoryNoteStorage, NoteStorage};

#[cfg(feature = "sqlite")]
pub use storage::SqliteNoteStorage;
