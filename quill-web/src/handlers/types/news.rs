//! News site page contexts

use super::{field_errors, FieldErrors};
use quill_applications::{ApplicationError, CommentForm};
use quill_core::{Comment, NewsItem};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct NewsListPage {
    #[schema(value_type = Vec<Object>)]
    pub object_list: Vec<NewsItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentFormContext {
    pub data: CommentForm,
    pub errors: FieldErrors,
}

impl CommentFormContext {
    pub fn blank() -> Self {
        Self::with_data(CommentForm::default())
    }

    pub fn with_data(data: CommentForm) -> Self {
        Self {
            data,
            errors: FieldErrors::new(),
        }
    }

    pub fn rejected(data: CommentForm, err: &ApplicationError) -> Self {
        Self {
            data,
            errors: field_errors(err),
        }
    }
}

/// News item with its comment thread. `form` is only present for logged-in users.
#[derive(Debug, Serialize, ToSchema)]
pub struct NewsDetailPage {
    #[schema(value_type = Object)]
    pub news: NewsItem,
    #[schema(value_type = Vec<Object>)]
    pub comments: Vec<Comment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<CommentFormContext>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentEditPage {
    #[schema(value_type = Object)]
    pub comment: Comment,
    pub form: CommentFormContext,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentDeletePage {
    #[schema(value_type = Object)]
    pub comment: Comment,
}
