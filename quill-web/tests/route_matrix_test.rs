//! Who may open which page
//!
//! One table of (path, role, expected status) and one runner.

mod helpers;

use axum::http::StatusCode;
use chrono::NaiveDate;
use helpers::{spawn_app, TestApp, TestUser};
use quill_applications::{CommentForm, NoteForm};

#[derive(Debug, Clone, Copy)]
enum Role {
    Anonymous,
    Author,
    Reader,
}

struct Fixture {
    app: TestApp,
    author: TestUser,
    reader: TestUser,
    slug: String,
    news_id: i64,
    comment_id: i64,
}

async fn fixture() -> Fixture {
    let app = spawn_app();
    let author = app.signup("author").await;
    let reader = app.signup("reader").await;

    let note = app
        .state
        .application
        .notes
        .create_note(
            &author.identity(),
            &NoteForm::new("Заголовок", "Текст заметки").with_slug("note-slug"),
        )
        .await
        .unwrap();
    let news = app
        .state
        .application
        .news
        .publish("Заголовок", "Текст", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        .await
        .unwrap();
    let comment = app
        .state
        .application
        .news
        .submit_comment(&author.identity(), news.id, &CommentForm::new("Текст комментария"))
        .await
        .unwrap();

    Fixture {
        app,
        author,
        reader,
        slug: note.slug,
        news_id: news.id,
        comment_id: comment.id,
    }
}

#[tokio::test]
async fn route_matrix() {
    let f = fixture().await;
    let note = |prefix: &str| format!("/{}/{}/", prefix, f.slug);
    let news_detail = format!("/news/{}/", f.news_id);
    let edit_comment = format!("/news/edit_comment/{}/", f.comment_id);
    let delete_comment = format!("/news/delete_comment/{}/", f.comment_id);

    let mut cases: Vec<(String, Role, StatusCode)> = Vec::new();

    for path in ["/", "/news/", "/auth/login/", "/auth/signup/", "/auth/logout/"] {
        cases.push((path.to_string(), Role::Anonymous, StatusCode::OK));
    }
    cases.push((news_detail.clone(), Role::Anonymous, StatusCode::OK));
    cases.push((news_detail, Role::Reader, StatusCode::OK));

    for path in ["/notes/", "/add/", "/done/"] {
        cases.push((path.to_string(), Role::Reader, StatusCode::OK));
        cases.push((path.to_string(), Role::Anonymous, StatusCode::FOUND));
    }

    for path in [
        note("note"),
        note("edit"),
        note("delete"),
        edit_comment,
        delete_comment,
    ] {
        cases.push((path.clone(), Role::Author, StatusCode::OK));
        cases.push((path.clone(), Role::Reader, StatusCode::NOT_FOUND));
        cases.push((path, Role::Anonymous, StatusCode::FOUND));
    }

    for (path, role, expected) in cases {
        let user = match role {
            Role::Anonymous => None,
            Role::Author => Some(&f.author),
            Role::Reader => Some(&f.reader),
        };
        let response = f.app.get(&path, user).await;
        assert_eq!(response.status, expected, "GET {} as {:?}", path, role);

        if expected == StatusCode::FOUND {
            assert_eq!(
                response.location.as_deref(),
                Some(format!("/auth/login/?next={}", path).as_str()),
                "login redirect for {}",
                path
            );
        }
    }
}

#[tokio::test]
async fn missing_objects_are_not_found() {
    let f = fixture().await;
    for path in [
        "/note/no-such-note/".to_string(),
        "/edit/no-such-note/".to_string(),
        "/news/999/".to_string(),
        "/news/not-a-number/".to_string(),
        "/news/edit_comment/999/".to_string(),
        format!("/news/delete_comment/{}0/", f.comment_id),
    ] {
        let response = f.app.get(&path, Some(&f.author)).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "GET {}", path);
        assert_eq!(response.body["error"], "not_found");
    }
}

#[tokio::test]
async fn anonymous_posts_redirect_to_login() {
    let f = fixture().await;
    let comments_before = f.app.state.application.news.count_comments().await.unwrap();
    let notes_before = f.app.state.application.notes.count_notes().await.unwrap();

    let path = format!("/news/{}/", f.news_id);
    let response = f.app.post_form(&path, None, &[("text", "Текст")]).await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(
        response.location.as_deref(),
        Some(format!("/auth/login/?next={}", path).as_str())
    );

    let response = f
        .app
        .post_form("/add/", None, &[("title", "Заголовок"), ("text", "Текст")])
        .await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location.as_deref(), Some("/auth/login/?next=/add/"));

    assert_eq!(
        f.app.state.application.news.count_comments().await.unwrap(),
        comments_before
    );
    assert_eq!(
        f.app.state.application.notes.count_notes().await.unwrap(),
        notes_before
    );
}
