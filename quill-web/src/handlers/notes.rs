//! Notes site handlers

use super::found;
use super::types::{DonePage, HomePage, NoteFormPage, NoteListPage, NotePage};
use crate::auth::{CurrentIdentity, LoginRequired};
use crate::{AppState, WebResult};
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json, Response},
    Form,
};
use quill_applications::{ApplicationError, NoteForm};

pub const DONE_URL: &str = "/done/";

#[utoipa::path(get, path = "/", tag = "Notes",
    responses((status = 200, description = "Notes home page", body = HomePage)))]
pub async fn home(CurrentIdentity(identity): CurrentIdentity) -> Json<HomePage> {
    Json(HomePage {
        authenticated: !identity.is_anonymous(),
    })
}

#[utoipa::path(get, path = "/notes/", tag = "Notes",
    responses(
        (status = 200, description = "The caller's own notes", body = NoteListPage),
        (status = 302, description = "Login required")
    ))]
pub async fn list_notes(
    LoginRequired(identity): LoginRequired,
    State(state): State<AppState>,
) -> WebResult<Json<NoteListPage>> {
    let object_list = state.application.notes.list_visible_notes(&identity).await?;
    Ok(Json(NoteListPage { object_list }))
}

#[utoipa::path(get, path = "/add/", tag = "Notes",
    responses((status = 200, description = "Empty note form", body = NoteFormPage)))]
pub async fn add_note_page(_user: LoginRequired) -> Json<NoteFormPage> {
    Json(NoteFormPage::blank())
}

#[utoipa::path(post, path = "/add/", tag = "Notes",
    request_body(content = NoteForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Note created, redirected to /done/"),
        (status = 200, description = "Form re-rendered with field errors", body = NoteFormPage)
    ))]
pub async fn add_note(
    LoginRequired(identity): LoginRequired,
    State(state): State<AppState>,
    Form(form): Form<NoteForm>,
) -> WebResult<Response> {
    match state.application.notes.create_note(&identity, &form).await {
        Ok(_) => Ok(found(DONE_URL)),
        Err(err @ ApplicationError::Validation { .. }) => {
            Ok(Json(NoteFormPage::rejected(form, &err)).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

#[utoipa::path(get, path = "/done/", tag = "Notes",
    responses((status = 200, description = "Success page", body = DonePage)))]
pub async fn done(_user: LoginRequired) -> Json<DonePage> {
    Json(DonePage {
        message: "Успешно!".to_string(),
    })
}

#[utoipa::path(get, path = "/note/{slug}/", tag = "Notes",
    params(("slug" = String, Path, description = "Note slug")),
    responses(
        (status = 200, description = "The note", body = NotePage),
        (status = 404, description = "No such note, or not the caller's")
    ))]
pub async fn note_detail(
    LoginRequired(identity): LoginRequired,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> WebResult<Json<NotePage>> {
    let note = state.application.notes.note_for(&identity, &slug).await?;
    Ok(Json(NotePage { note }))
}

#[utoipa::path(get, path = "/edit/{slug}/", tag = "Notes",
    params(("slug" = String, Path, description = "Note slug")),
    responses(
        (status = 200, description = "Form prefilled with the note", body = NoteFormPage),
        (status = 404, description = "No such note, or not the caller's")
    ))]
pub async fn edit_note_page(
    LoginRequired(identity): LoginRequired,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> WebResult<Json<NoteFormPage>> {
    let note = state.application.notes.note_for(&identity, &slug).await?;
    Ok(Json(NoteFormPage::for_note(&note)))
}

#[utoipa::path(post, path = "/edit/{slug}/", tag = "Notes",
    params(("slug" = String, Path, description = "Note slug")),
    request_body(content = NoteForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Note updated, redirected to /done/"),
        (status = 200, description = "Form re-rendered with field errors", body = NoteFormPage),
        (status = 404, description = "No such note, or not the caller's")
    ))]
pub async fn edit_note(
    LoginRequired(identity): LoginRequired,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Form(form): Form<NoteForm>,
) -> WebResult<Response> {
    match state
        .application
        .notes
        .update_note(&identity, &slug, &form)
        .await
    {
        Ok(_) => Ok(found(DONE_URL)),
        Err(err @ ApplicationError::Validation { .. }) => {
            Ok(Json(NoteFormPage::rejected(form, &err)).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

#[utoipa::path(get, path = "/delete/{slug}/", tag = "Notes",
    params(("slug" = String, Path, description = "Note slug")),
    responses(
        (status = 200, description = "Delete confirmation", body = NotePage),
        (status = 404, description = "No such note, or not the caller's")
    ))]
pub async fn delete_note_page(
    LoginRequired(identity): LoginRequired,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> WebResult<Json<NotePage>> {
    let note = state.application.notes.note_for(&identity, &slug).await?;
    Ok(Json(NotePage { note }))
}

/// Accepts both POST and DELETE
#[utoipa::path(post, path = "/delete/{slug}/", tag = "Notes",
    params(("slug" = String, Path, description = "Note slug")),
    responses(
        (status = 302, description = "Note deleted, redirected to /done/"),
        (status = 404, description = "No such note, or not the caller's")
    ))]
pub async fn delete_note(
    LoginRequired(identity): LoginRequired,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> WebResult<Response> {
    state.application.notes.delete_note(&identity, &slug).await?;
    Ok(found(DONE_URL))
}
