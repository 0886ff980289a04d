//! Comment moderation and access control

use super::moderation::CommentForm;
use super::storage::NewsStorage;
use crate::auth::{self, IdentityContext};
use crate::storage::StorageError;
use crate::{ApplicationError, ApplicationResult};
use chrono::{NaiveDate, Utc};
use quill_core::{log_operation_start, log_operation_success, Comment, NewComment, NewsItem};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct NewsService {
    storage: Arc<dyn NewsStorage>,
    home_page_count: usize,
}

impl NewsService {
    pub fn new(storage: Arc<dyn NewsStorage>, home_page_count: usize) -> Self {
        Self {
            storage,
            home_page_count,
        }
    }

    pub fn home_page_count(&self) -> usize {
        self.home_page_count
    }

    /// At most `home_page_count` news items, newest first
    pub async fn home_page(&self) -> ApplicationResult<Vec<NewsItem>> {
        let items = self.storage.list_news(self.home_page_count).await?;
        debug!("Home page lists {} news items", items.len());
        Ok(items)
    }

    pub async fn news_detail(&self, news_id: i64) -> ApplicationResult<NewsItem> {
        self.storage
            .get_news(news_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found(format!("news {}", news_id)))
    }

    /// Comments in the order they were written
    pub async fn list_comments_for_news(&self, news_id: i64) -> ApplicationResult<Vec<Comment>> {
        Ok(self.storage.list_comments(news_id).await?)
    }

    pub async fn submit_comment(
        &self,
        identity: &IdentityContext,
        news_id: i64,
        form: &CommentForm,
    ) -> ApplicationResult<Comment> {
        let author = identity.require_authenticated("submit_comment")?.clone();
        log_operation_start!("submit_comment", news_id = news_id, author = %author);

        self.news_detail(news_id).await?;
        let text = form.clean()?;

        let comment = self
            .storage
            .insert_comment(NewComment {
                news: news_id,
                author,
                text,
                created: Utc::now(),
            })
            .await
            .map_err(|e| match e {
                StorageError::NotFound { resource } => ApplicationError::NotFound { resource },
                other => other.into(),
            })?;

        log_operation_success!("submit_comment", comment_id = comment.id, news_id = news_id);
        Ok(comment)
    }

    pub fn can_edit(&self, identity: &IdentityContext, comment: &Comment) -> bool {
        auth::can_edit(identity, comment)
    }

    pub fn can_delete(&self, identity: &IdentityContext, comment: &Comment) -> bool {
        auth::can_delete(identity, comment)
    }

    /// Look up a comment for edit or delete; non-owners get [`ApplicationError::NotFound`]
    pub async fn comment_for(&self, identity: &IdentityContext, comment_id: i64) -> ApplicationResult<Comment> {
        identity.require_authenticated("comment_for")?;

        let comment = self
            .storage
            .get_comment(comment_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found(format!("comment {}", comment_id)))?;

        auth::ensure_owner(identity, comment, "comment_for")
    }

    /// Replace the text of the caller's comment
    pub async fn update_comment(
        &self,
        identity: &IdentityContext,
        comment_id: i64,
        form: &CommentForm,
    ) -> ApplicationResult<Comment> {
        let comment = self.comment_for(identity, comment_id).await?;
        let text = form.clean()?;

        self.storage.update_comment_text(comment.id, &text).await?;
        info!("Updated comment {} on news {}", comment.id, comment.news);
        Ok(Comment { text, ..comment })
    }

    /// Delete the caller's comment, returning what was removed
    pub async fn delete_comment(&self, identity: &IdentityContext, comment_id: i64) -> ApplicationResult<Comment> {
        let comment = self.comment_for(identity, comment_id).await?;
        self.storage.delete_comment(comment.id).await?;

        info!("Deleted comment {} on news {}", comment.id, comment.news);
        Ok(comment)
    }

    /// Add a news item; there is no end-user path for this
    pub async fn publish(&self, title: &str, text: &str, date: NaiveDate) -> ApplicationResult<NewsItem> {
        let item = self.storage.insert_news(title, text, date).await?;
        info!("Published news {} dated {}", item.id, item.date);
        Ok(item)
    }

    pub async fn count_news(&self) -> ApplicationResult<u64> {
        Ok(self.storage.count_news().await?)
    }

    pub async fn count_comments(&self) -> ApplicationResult<u64> {
        Ok(self.storage.count_comments().await?)
    }

    pub async fn health_check(&self) -> ApplicationResult<()> {
        Ok(self.storage.health_check().await?)
    }
}
