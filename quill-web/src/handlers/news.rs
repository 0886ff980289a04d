//! News site handlers

use super::types::{
    CommentDeletePage, CommentEditPage, CommentFormContext, NewsDetailPage, NewsListPage,
};
use super::{found, parse_id};
use crate::auth::{CurrentIdentity, LoginRequired};
use crate::{AppState, WebResult};
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json, Response},
    Form,
};
use quill_applications::{ApplicationError, CommentForm, IdentityContext};

fn comments_anchor(news_id: i64) -> String {
    format!("/news/{}/#comments", news_id)
}

async fn detail_page(
    state: &AppState,
    identity: &IdentityContext,
    news_id: i64,
    form: Option<CommentFormContext>,
) -> WebResult<NewsDetailPage> {
    let news = state.application.news.news_detail(news_id).await?;
    let comments = state.application.news.list_comments_for_news(news_id).await?;
    let form = match identity {
        IdentityContext::Anonymous => None,
        IdentityContext::Authenticated(_) => Some(form.unwrap_or_else(CommentFormContext::blank)),
    };

    Ok(NewsDetailPage {
        news,
        comments,
        form,
    })
}

#[utoipa::path(get, path = "/news/", tag = "News",
    responses((status = 200, description = "Newest news items", body = NewsListPage)))]
pub async fn news_home(State(state): State<AppState>) -> WebResult<Json<NewsListPage>> {
    let object_list = state.application.news.home_page().await?;
    Ok(Json(NewsListPage { object_list }))
}

#[utoipa::path(get, path = "/news/{id}/", tag = "News",
    params(("id" = i64, Path, description = "News item id")),
    responses(
        (status = 200, description = "News item with its comments", body = NewsDetailPage),
        (status = 404, description = "No such news item")
    ))]
pub async fn news_detail(
    CurrentIdentity(identity): CurrentIdentity,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> WebResult<Json<NewsDetailPage>> {
    let news_id = parse_id(&id)?;
    Ok(Json(detail_page(&state, &identity, news_id, None).await?))
}

#[utoipa::path(post, path = "/news/{id}/", tag = "News",
    params(("id" = i64, Path, description = "News item id")),
    request_body(content = CommentForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Comment posted, redirected to the thread"),
        (status = 200, description = "Detail page re-rendered with field errors", body = NewsDetailPage),
        (status = 404, description = "No such news item")
    ))]
pub async fn post_comment(
    LoginRequired(identity): LoginRequired,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<CommentForm>,
) -> WebResult<Response> {
    let news_id = parse_id(&id)?;
    match state
        .application
        .news
        .submit_comment(&identity, news_id, &form)
        .await
    {
        Ok(_) => Ok(found(&comments_anchor(news_id))),
        Err(err @ ApplicationError::Validation { .. }) => {
            let rejected = CommentFormContext::rejected(form, &err);
            let page = detail_page(&state, &identity, news_id, Some(rejected)).await?;
            Ok(Json(page).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

#[utoipa::path(get, path = "/news/edit_comment/{id}/", tag = "News",
    params(("id" = i64, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Comment edit form", body = CommentEditPage),
        (status = 404, description = "No such comment, or not the caller's")
    ))]
pub async fn edit_comment_page(
    LoginRequired(identity): LoginRequired,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> WebResult<Json<CommentEditPage>> {
    let comment = state
        .application
        .news
        .comment_for(&identity, parse_id(&id)?)
        .await?;
    let form = CommentFormContext::with_data(CommentForm::new(comment.text.clone()));
    Ok(Json(CommentEditPage { comment, form }))
}

#[utoipa::path(post, path = "/news/edit_comment/{id}/", tag = "News",
    params(("id" = i64, Path, description = "Comment id")),
    request_body(content = CommentForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Comment updated, redirected to the thread"),
        (status = 200, description = "Form re-rendered with field errors", body = CommentEditPage),
        (status = 404, description = "No such comment, or not the caller's")
    ))]
pub async fn edit_comment(
    LoginRequired(identity): LoginRequired,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<CommentForm>,
) -> WebResult<Response> {
    let comment_id = parse_id(&id)?;
    match state
        .application
        .news
        .update_comment(&identity, comment_id, &form)
        .await
    {
        Ok(comment) => Ok(found(&comments_anchor(comment.news))),
        Err(err @ ApplicationError::Validation { .. }) => {
            let comment = state.application.news.comment_for(&identity, comment_id).await?;
            let form = CommentFormContext::rejected(form, &err);
            Ok(Json(CommentEditPage { comment, form }).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

#[utoipa::path(get, path = "/news/delete_comment/{id}/", tag = "News",
    params(("id" = i64, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Delete confirmation", body = CommentDeletePage),
        (status = 404, description = "No such comment, or not the caller's")
    ))]
pub async fn delete_comment_page(
    LoginRequired(identity): LoginRequired,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> WebResult<Json<CommentDeletePage>> {
    let comment = state
        .application
        .news
        .comment_for(&identity, parse_id(&id)?)
        .await?;
    Ok(Json(CommentDeletePage { comment }))
}

/// Accepts both POST and DELETE
#[utoipa::path(post, path = "/news/delete_comment/{id}/", tag = "News",
    params(("id" = i64, Path, description = "Comment id")),
    responses(
        (status = 302, description = "Comment deleted, redirected to the thread"),
        (status = 404, description = "No such comment, or not the caller's")
    ))]
pub async fn delete_comment(
    LoginRequired(identity): LoginRequired,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> WebResult<Response> {
    let comment = state
        .application
        .news
        .delete_comment(&identity, parse_id(&id)?)
        .await?;
    Ok(found(&comments_anchor(comment.news)))
}
