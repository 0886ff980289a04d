//! OpenAPI description of the notes, news and account endpoints

use axum::Json;
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};

use crate::auth::handlers::{LoggedOutPage, LoginForm, SignupForm};
use crate::auth::SESSION_COOKIE;
use crate::handlers::{
    CommentDeletePage, CommentEditPage, CommentFormContext, DonePage, ErrorResponse,
    HealthResponse, HomePage, NewsDetailPage, NewsListPage, NoteFormContext, NoteFormPage,
    NoteListPage, NotePage,
};
use quill_applications::{CommentForm, NoteForm};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Quill Web API",
        version = "0.1.0",
        description = "Personal notes and a commented news feed",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server")
    ),
    paths(
        crate::handlers::health_check,
        openapi_json,

        crate::handlers::notes::home,
        crate::handlers::notes::list_notes,
        crate::handlers::notes::add_note_page,
        crate::handlers::notes::add_note,
        crate::handlers::notes::done,
        crate::handlers::notes::note_detail,
        crate::handlers::notes::edit_note_page,
        crate::handlers::notes::edit_note,
        crate::handlers::notes::delete_note_page,
        crate::handlers::notes::delete_note,

        crate::handlers::news::news_home,
        crate::handlers::news::news_detail,
        crate::handlers::news::post_comment,
        crate::handlers::news::edit_comment_page,
        crate::handlers::news::edit_comment,
        crate::handlers::news::delete_comment_page,
        crate::handlers::news::delete_comment,

        crate::auth::handlers::signup_page,
        crate::auth::handlers::signup,
        crate::auth::handlers::login_page,
        crate::auth::handlers::login,
        crate::auth::handlers::logout,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            HomePage,
            NoteListPage,
            NotePage,
            NoteFormContext,
            NoteFormPage,
            DonePage,
            NewsListPage,
            NewsDetailPage,
            CommentFormContext,
            CommentEditPage,
            CommentDeletePage,
            NoteForm,
            CommentForm,
            SignupForm,
            LoginForm,
            LoggedOutPage,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Notes", description = "Private notes, visible only to their author"),
        (name = "News", description = "Public news with moderated comments"),
        (name = "Accounts", description = "Signup, login and logout"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Session cookie security scheme
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
            );
        }
    }
}

#[utoipa::path(get, path = "/api/openapi.json", tag = "Health",
    responses((status = 200, description = "This document")))]
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Get the OpenAPI specification as JSON
pub fn get_openapi_json() -> Result<String, serde_json::Error> {
    ApiDoc::openapi().to_pretty_json()
}
