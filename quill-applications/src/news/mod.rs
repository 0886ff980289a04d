//! News site: public news items with a moderated comment thread

pub mod moderation;
pub mod service;
pub mod storage;

pub use moderation::{find_bad_word, CommentForm, BAD_WORDS, WARNING};
pub use service::NewsService;
pub use storage::{MemoryNewsStorage, NewsStorage};

#[cfg(feature = "sqlite")]
pub use storage::SqliteNewsStorage;
