//! Route definitions for the Quill web server

use crate::{auth, handlers, openapi, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use handlers::{news, notes};

/// Notes site
pub fn notes_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(notes::home))
        .route("/notes/", get(notes::list_notes))
        .route("/add/", get(notes::add_note_page).post(notes::add_note))
        .route("/done/", get(notes::done))
        .route("/note/{slug}/", get(notes::note_detail))
        .route("/edit/{slug}/", get(notes::edit_note_page).post(notes::edit_note))
        .route(
            "/delete/{slug}/",
            get(notes::delete_note_page)
                .post(notes::delete_note)
                .delete(notes::delete_note),
        )
}

/// News site, mounted under `/news/`
pub fn news_routes() -> Router<AppState> {
    Router::new()
        .route("/news/", get(news::news_home))
        .route("/news/{id}/", get(news::news_detail).post(news::post_comment))
        .route(
            "/news/edit_comment/{id}/",
            get(news::edit_comment_page).post(news::edit_comment),
        )
        .route(
            "/news/delete_comment/{id}/",
            get(news::delete_comment_page)
                .post(news::delete_comment)
                .delete(news::delete_comment),
        )
}

/// Signup, login and logout
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/auth/signup/",
            get(auth::handlers::signup_page).post(auth::handlers::signup),
        )
        .route(
            "/auth/login/",
            get(auth::handlers::login_page).post(auth::handlers::login),
        )
        .route(
            "/auth/logout/",
            get(auth::handlers::logout).post(auth::handlers::logout),
        )
}

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/openapi.json", get(openapi::openapi_json))
}

/// Every route with shared state still unbound
pub fn all_routes() -> Router<AppState> {
    Router::new()
        .merge(notes_routes())
        .merge(news_routes())
        .merge(auth_routes())
        .nest("/api", api_routes())
        .fallback(handlers::not_found)
}
