//! Comment moderation

use crate::notes::REQUIRED_FIELD;
use crate::{ApplicationError, ApplicationResult};
use serde::{Deserialize, Serialize};

/// Words that may not appear anywhere in a comment, case-insensitively
pub const BAD_WORDS: &[&str] = &["редиска", "негодяй"];

/// Error shown on the text field when a comment contains a bad word
pub const WARNING: &str = "Не ругайтесь!";

/// First denylisted word found in `text`, matched as a substring of the lowercased text
pub fn find_bad_word(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    BAD_WORDS.iter().copied().find(|word| lowered.contains(word))
}

/// Submitted comment fields, used for both new comments and edits
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

impl CommentForm {
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self { text: text.into() }
    }

    /// Validated comment text
    pub fn clean(&self) -> ApplicationResult<String> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(ApplicationError::validation("text", REQUIRED_FIELD));
        }

        if let Some(word) = find_bad_word(text) {
            tracing::debug!("Comment rejected for containing '{}'", word);
            return Err(ApplicationError::validation("text", WARNING));
        }

        Ok(text.to_string())
    }
}
