// SPDX-FileCopyrightText: 2026 Mailtrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end gateway tests: real router, real SQLite storage, stubbed
//! mailer and summarizer.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use mailtrace_config::model::StorageConfig;
use mailtrace_core::types::{EmailSummary, SummaryInput, SummaryPriority};
use mailtrace_core::{Mailer, MailtraceError, StorageAdapter, Summarizer};
use mailtrace_gateway::{GatewayState, build_router};
use mailtrace_storage::SqliteStorage;
use mailtrace_tracking::TRACKING_PIXEL_PNG;

struct StubMailer {
    fail: AtomicBool,
}

#[async_trait]
impl Mailer for StubMailer {
    async fn send_html(
        &self,
        _recipient: &str,
        _subject: &str,
        _html: &str,
    ) -> Result<String, MailtraceError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MailtraceError::Mailer {
                message: "relay refused".into(),
                source: None,
            });
        }
        Ok("stub-message-id@example.com".to_string())
    }
}

struct StubSummarizer;

#[async_trait]
impl Summarizer for StubSummarizer {
    async fn summarize_emails(
        &self,
        _inputs: &[SummaryInput],
    ) -> Result<EmailSummary, MailtraceError> {
        Ok(EmailSummary {
            title: "Stub Digest".to_string(),
            content: "Nothing notable.".to_string(),
            priority: SummaryPriority::Normal,
            key_points: vec!["point one".to_string()],
        })
    }
}

struct TestApp {
    router: Router,
    storage: Arc<dyn StorageAdapter>,
    mailer_fail: Arc<StubMailer>,
    _dir: tempfile::TempDir,
}

async fn test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("gateway.db");
    let storage = Arc::new(SqliteStorage::new(StorageConfig {
        database_path: db_path.to_str().unwrap().to_string(),
    }));
    storage.initialize().await.unwrap();

    let mailer = Arc::new(StubMailer {
        fail: AtomicBool::new(false),
    });

    let state = GatewayState {
        storage: storage.clone(),
        mailer: mailer.clone(),
        summarizer: Arc::new(StubSummarizer),
        base_url: "http://testserver".to_string(),
        start_time: std::time::Instant::now(),
    };

    TestApp {
        router: build_router(state),
        storage,
        mailer_fail: mailer,
        _dir: dir,
    }
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send_test_email(app: &TestApp) -> serde_json::Value {
    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/api/emails",
            serde_json::json!({
                "recipient": "alice@example.com",
                "subject": "Quarterly update",
                "content": "<html><body><p>numbers inside</p></body></html>"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

#[tokio::test]
async fn health_reports_ok() {
    let app = test_app().await;
    let response = app
        .router
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn pixel_endpoint_always_serves_the_png() {
    let app = test_app().await;
    let response = app
        .router
        .clone()
        .oneshot(
            Request::get("/api/track/px-unknown")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-cache, no-store, must-revalidate"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], TRACKING_PIXEL_PNG);
}

#[tokio::test]
async fn send_embeds_pixel_and_persists_pending_email() {
    let app = test_app().await;
    let sent = send_test_email(&app).await;

    assert_eq!(sent["message_id"], "stub-message-id@example.com");
    assert_eq!(sent["read_status"], "pending");
    assert_eq!(sent["open_count"], 0);

    let pixel_id = sent["tracking_pixel_id"].as_str().unwrap();
    let content = sent["content"].as_str().unwrap();
    assert!(content.contains(&format!("http://testserver/api/track/{pixel_id}")));
    assert!(content.contains("</body>"));

    let stored = app
        .storage
        .get_email(sent["id"].as_str().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.tracking_pixel_id, pixel_id);
}

#[tokio::test]
async fn send_failure_marks_email_failed() {
    let app = test_app().await;
    app.mailer_fail.fail.store(true, Ordering::SeqCst);

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/api/emails",
            serde_json::json!({
                "recipient": "alice@example.com",
                "subject": "Will not send",
                "content": "<p>hi</p>"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let emails = app.storage.list_emails().await.unwrap();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].read_status.to_string(), "failed");
}

#[tokio::test]
async fn send_rejects_invalid_payload() {
    let app = test_app().await;
    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/api/emails",
            serde_json::json!({
                "recipient": "not-an-address",
                "subject": "x",
                "content": "y"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn pixel_fetch_eventually_records_a_receipt() {
    let app = test_app().await;
    let sent = send_test_email(&app).await;
    let email_id = sent["id"].as_str().unwrap().to_string();
    let pixel_id = sent["tracking_pixel_id"].as_str().unwrap().to_string();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::get(format!("/api/track/{pixel_id}"))
                .header(header::USER_AGENT, "Mozilla/5.0")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The pipeline runs detached from the response; poll briefly.
    let mut receipts = Vec::new();
    for _ in 0..50 {
        receipts = app.storage.receipts_for_email(&email_id).await.unwrap();
        if !receipts.is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(receipts.len(), 1);
    assert_eq!(receipts[0].user_agent, "Mozilla/5.0");

    // Freshly sent, so the elapsed-time gate keeps it pending.
    let stored = app.storage.get_email(&email_id).await.unwrap().unwrap();
    assert_eq!(stored.read_status.to_string(), "pending");
    assert_eq!(stored.open_count, 1);
}

#[tokio::test]
async fn missing_email_is_a_404() {
    let app = test_app().await;
    let response = app
        .router
        .clone()
        .oneshot(Request::get("/api/emails/em-404").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stats_start_at_zero() {
    let app = test_app().await;
    let response = app
        .router
        .clone()
        .oneshot(Request::get("/api/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["sent_today"], 0);
    assert_eq!(json["emails_read"], 0);
    assert_eq!(json["read_rate"], "0%");
    assert_eq!(json["avg_read_time"], "0m");
}

#[tokio::test]
async fn stats_count_todays_sends() {
    let app = test_app().await;
    send_test_email(&app).await;

    let response = app
        .router
        .clone()
        .oneshot(Request::get("/api/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["sent_today"], 1);
    assert_eq!(json["read_rate"], "0%");
}

#[tokio::test]
async fn generate_summary_requires_emails() {
    let app = test_app().await;
    let response = app
        .router
        .clone()
        .oneshot(post_json("/api/summaries/generate", serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn generate_summary_persists_and_notifies() {
    let app = test_app().await;
    send_test_email(&app).await;

    let response = app
        .router
        .clone()
        .oneshot(post_json("/api/summaries/generate", serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["title"], "Stub Digest");
    assert_eq!(json["priority"], "normal");

    let summaries = app.storage.list_summaries().await.unwrap();
    assert_eq!(summaries.len(), 1);

    let notifications = app.storage.list_notifications().await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind.to_string(), "ai_summary");
    assert!(notifications[0].content.contains("Stub Digest"));
}

#[tokio::test]
async fn notifications_can_be_marked_read() {
    let app = test_app().await;
    send_test_email(&app).await;
    app.router
        .clone()
        .oneshot(post_json("/api/summaries/generate", serde_json::json!({})))
        .await
        .unwrap();

    let notifications = app.storage.list_notifications().await.unwrap();
    let id = notifications[0].id.clone();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/notifications/{id}/read"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let notifications = app.storage.list_notifications().await.unwrap();
    assert!(notifications[0].is_read);
}
