//! Comment posting, moderation and ownership over HTTP

mod helpers;

use axum::http::StatusCode;
use chrono::NaiveDate;
use helpers::{spawn_app, TestApp, TestUser};
use quill_applications::news::{BAD_WORDS, WARNING};
use quill_applications::CommentForm;
use quill_core::{Comment, NewsItem};

const COMMENT_TEXT: &str = "Текст комментария";
const NEW_TEXT: &str = "Обновлённый комментарий";

struct Thread {
    app: TestApp,
    author: TestUser,
    reader: TestUser,
    news: NewsItem,
    comment: Comment,
}

async fn thread() -> Thread {
    let app = spawn_app();
    let author = app.signup("author").await;
    let reader = app.signup("reader").await;

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
        .submit_comment(&author.identity(), news.id, &CommentForm::new(COMMENT_TEXT))
        .await
        .unwrap();

    Thread {
        app,
        author,
        reader,
        news,
        comment,
    }
}

impl Thread {
    fn thread_url(&self) -> String {
        format!("/news/{}/#comments", self.news.id)
    }

    async fn comment_count(&self) -> u64 {
        self.app.state.application.news.count_comments().await.unwrap()
    }

    async fn stored_text(&self) -> String {
        self.app
            .state
            .application
            .news
            .comment_for(&self.author.identity(), self.comment.id)
            .await
            .unwrap()
            .text
    }
}

#[tokio::test]
async fn user_can_post_comment() {
    let t = thread().await;
    let response = t
        .app
        .post_form(&format!("/news/{}/", t.news.id), Some(&t.reader), &[("text", "Хорошая новость")])
        .await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location, Some(t.thread_url()));
    assert_eq!(t.comment_count().await, 2);

    let comments = t
        .app
        .state
        .application
        .news
        .list_comments_for_news(t.news.id)
        .await
        .unwrap();
    let posted = comments.last().unwrap();
    assert_eq!(posted.text, "Хорошая новость");
    assert_eq!(posted.author, t.reader.id);
    assert_eq!(posted.news, t.news.id);
}

#[tokio::test]
async fn bad_words_are_rejected() {
    let t = thread().await;
    let path = format!("/news/{}/", t.news.id);

    for word in BAD_WORDS {
        let text = format!("Какой-то текст, {}, еще текст", word);
        let response = t.app.post_form(&path, Some(&t.reader), &[("text", text.as_str())]).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["form"]["errors"]["text"][0], WARNING);
        assert_eq!(response.body["news"]["id"], t.news.id);
    }
    assert_eq!(t.comment_count().await, 1);
}

#[tokio::test]
async fn detail_page_form_only_for_users() {
    let t = thread().await;
    let path = format!("/news/{}/", t.news.id);

    let anonymous = t.app.get(&path, None).await;
    assert_eq!(anonymous.status, StatusCode::OK);
    assert!(anonymous.body.get("form").is_none());
    assert_eq!(anonymous.body["comments"][0]["text"], COMMENT_TEXT);

    let reader = t.app.get(&path, Some(&t.reader)).await;
    assert!(reader.body["form"].is_object());
}

#[tokio::test]
async fn comments_are_sorted_oldest_first() {
    let t = thread().await;
    let path = format!("/news/{}/", t.news.id);
    for n in 0..5 {
        let text = format!("Tекст {}", n);
        t.app.post_form(&path, Some(&t.author), &[("text", text.as_str())]).await;
    }

    let response = t.app.get(&path, None).await;
    let created: Vec<String> = response.body["comments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["created"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(created.len(), 6);

    let parsed: Vec<chrono::DateTime<chrono::Utc>> =
        created.iter().map(|c| c.parse().unwrap()).collect();
    assert!(parsed.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[tokio::test]
async fn author_can_edit_comment() {
    let t = thread().await;
    let response = t
        .app
        .post_form(
            &format!("/news/edit_comment/{}/", t.comment.id),
            Some(&t.author),
            &[("text", NEW_TEXT)],
        )
        .await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location, Some(t.thread_url()));
    assert_eq!(t.stored_text().await, NEW_TEXT);
}

#[tokio::test]
async fn moderated_edit_is_rerendered() {
    let t = thread().await;
    let response = t
        .app
        .post_form(
            &format!("/news/edit_comment/{}/", t.comment.id),
            Some(&t.author),
            &[("text", "Ты негодяй")],
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["form"]["errors"]["text"][0], WARNING);
    assert_eq!(response.body["comment"]["text"], COMMENT_TEXT);
    assert_eq!(t.stored_text().await, COMMENT_TEXT);
}

#[tokio::test]
async fn user_cannot_edit_comment_of_another_user() {
    let t = thread().await;
    let response = t
        .app
        .post_form(
            &format!("/news/edit_comment/{}/", t.comment.id),
            Some(&t.reader),
            &[("text", NEW_TEXT)],
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(t.stored_text().await, COMMENT_TEXT);
}

#[tokio::test]
async fn author_can_delete_comment() {
    let t = thread().await;
    let response = t
        .app
        .delete(&format!("/news/delete_comment/{}/", t.comment.id), Some(&t.author))
        .await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location, Some(t.thread_url()));
    assert_eq!(t.comment_count().await, 0);
}

#[tokio::test]
async fn user_cannot_delete_comment_of_another_user() {
    let t = thread().await;
    let path = format!("/news/delete_comment/{}/", t.comment.id);

    let response = t.app.delete(&path, Some(&t.reader)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    let response = t.app.post_form(&path, Some(&t.reader), &[]).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(t.comment_count().await, 1);
}

#[tokio::test]
async fn home_page_shows_newest_ten() {
    let app = spawn_app();
    let today = chrono::Utc::now().date_naive();
    for offset in 0..11 {
        app.state
            .application
            .news
            .publish(
                &format!("Новость {}", offset),
                "Просто текст.",
                today - chrono::Duration::days(offset),
            )
            .await
            .unwrap();
    }

    let response = app.get("/news/", None).await;
    let items = response.body["object_list"].as_array().unwrap();
    assert_eq!(items.len(), 10);
    let dates: Vec<&str> = items.iter().map(|i| i["date"].as_str().unwrap()).collect();
    assert!(dates.windows(2).all(|pair| pair[0] >= pair[1]));
    assert_eq!(dates[0], today.to_string());
}
