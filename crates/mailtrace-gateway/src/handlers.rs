// SPDX-FileCopyrightText: 2026 Mailtrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the tracking pixel and dashboard REST API.

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use mailtrace_core::types::{
    AiSummary, Email, Notification, NotificationKind, ReadStatus, SummaryInput, SummarySource,
};
use mailtrace_core::MailtraceError;
use mailtrace_tracking::{TRACKING_PIXEL_PNG, embed_pixel, issue_pixel, process_pixel_fetch};

use crate::server::GatewayState;

/// Request body for POST /api/emails.
#[derive(Debug, Deserialize)]
pub struct SendEmailRequest {
    /// Recipient address.
    pub recipient: String,
    /// Subject line.
    pub subject: String,
    /// HTML body; the tracking pixel is embedded server-side.
    pub content: String,
}

/// Response body for POST /api/emails.
#[derive(Debug, Serialize)]
pub struct SendEmailResponse {
    /// The stored email, pixel already embedded.
    #[serde(flatten)]
    pub email: Email,
    /// Message-Id the mail was dispatched with.
    pub message_id: String,
}

/// Response body for GET /api/stats.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    /// Emails sent since UTC midnight.
    pub sent_today: usize,
    /// Emails in status read.
    pub emails_read: usize,
    /// Integer percentage, e.g. "67%".
    pub read_rate: String,
    /// Stored AI summaries.
    pub ai_summaries: usize,
    /// Mean synthetic read time of read emails, whole minutes, e.g. "2m".
    pub avg_read_time: String,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status string.
    pub status: String,
    /// Binary version.
    pub version: String,
    /// Seconds since process start.
    pub uptime_secs: u64,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Log a storage failure and answer with an opaque 500.
fn storage_error(e: MailtraceError, what: &str) -> Response {
    error!(error = %e, "storage failure");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: format!("failed to {what}"),
        }),
    )
        .into_response()
}

/// GET /api/track/{pixel_id}
///
/// Always answers 200 with the fixed 1x1 PNG, before any tracking work
/// happens. Receipt recording, classification, and the read transition run
/// in a spawned task after this handler returns; their latency or failure
/// never reaches the pixel requester.
pub async fn get_tracking_pixel(
    State(state): State<GatewayState>,
    Path(pixel_id): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let remote_addr = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    tokio::spawn(process_pixel_fetch(
        state.storage.clone(),
        pixel_id,
        remote_addr,
        user_agent,
    ));

    (
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
        ],
        TRACKING_PIXEL_PNG,
    )
}

/// POST /api/emails
///
/// Mints a pixel, embeds it, persists the email as pending, then dispatches
/// via SMTP. A dispatch failure transitions the stored email to failed.
pub async fn send_email(
    State(state): State<GatewayState>,
    Json(body): Json<SendEmailRequest>,
) -> Response {
    if let Err(message) = validate_send_request(&body) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse { error: message }),
        )
            .into_response();
    }

    let pixel = issue_pixel(&state.base_url);
    let tracked_content = embed_pixel(&body.content, &pixel.html);

    let email = Email {
        id: Uuid::new_v4().to_string(),
        recipient: body.recipient,
        subject: body.subject,
        content: tracked_content,
        sent_at: Some(now_timestamp()),
        tracking_pixel_id: pixel.id,
        read_status: ReadStatus::Pending,
        read_at: None,
        read_seconds: None,
        open_count: 0,
    };

    if let Err(e) = state.storage.create_email(&email).await {
        return storage_error(e, "store email");
    }

    match state
        .mailer
        .send_html(&email.recipient, &email.subject, &email.content)
        .await
    {
        Ok(message_id) => {
            (StatusCode::OK, Json(SendEmailResponse { email, message_id })).into_response()
        }
        Err(e) => {
            error!(error = %e, email_id = %email.id, "SMTP dispatch failed");
            if let Err(update_err) = state.storage.mark_email_failed(&email.id).await {
                error!(error = %update_err, email_id = %email.id, "could not record dispatch failure");
            }
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: format!("failed to send email: {e}"),
                }),
            )
                .into_response()
        }
    }
}

fn validate_send_request(body: &SendEmailRequest) -> Result<(), String> {
    if body.recipient.trim().is_empty() || !body.recipient.contains('@') {
        return Err("recipient must be an email address".to_string());
    }
    if body.subject.trim().is_empty() {
        return Err("subject must not be empty".to_string());
    }
    if body.content.trim().is_empty() {
        return Err("content must not be empty".to_string());
    }
    Ok(())
}

/// GET /api/emails
pub async fn list_emails(State(state): State<GatewayState>) -> Response {
    match state.storage.list_emails().await {
        Ok(emails) => Json(emails).into_response(),
        Err(e) => storage_error(e, "fetch emails"),
    }
}

/// GET /api/emails/{id}
pub async fn get_email(State(state): State<GatewayState>, Path(id): Path<String>) -> Response {
    match state.storage.get_email(&id).await {
        Ok(Some(email)) => Json(email).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "email not found".to_string(),
            }),
        )
            .into_response(),
        Err(e) => storage_error(e, "fetch email"),
    }
}

/// GET /api/stats
pub async fn get_stats(State(state): State<GatewayState>) -> Response {
    let emails = match state.storage.list_emails().await {
        Ok(emails) => emails,
        Err(e) => return storage_error(e, "fetch stats"),
    };
    let summaries = match state.storage.list_summaries().await {
        Ok(summaries) => summaries,
        Err(e) => return storage_error(e, "fetch stats"),
    };

    // Timestamps share one zero-padded ISO format, so lexicographic
    // comparison against UTC midnight is ordering-correct.
    let today_start = format!("{}T00:00:00.000Z", Utc::now().format("%Y-%m-%d"));
    let sent_today = emails
        .iter()
        .filter(|e| e.sent_at.as_deref().is_some_and(|s| s >= today_start.as_str()))
        .count();

    let read_emails: Vec<&Email> = emails
        .iter()
        .filter(|e| e.read_status == ReadStatus::Read)
        .collect();
    let read_rate = if emails.is_empty() {
        0
    } else {
        (read_emails.len() as f64 / emails.len() as f64 * 100.0).round() as i64
    };
    let avg_read_secs = if read_emails.is_empty() {
        0
    } else {
        read_emails
            .iter()
            .map(|e| e.read_seconds.unwrap_or(0))
            .sum::<i64>()
            / read_emails.len() as i64
    };

    Json(StatsResponse {
        sent_today,
        emails_read: read_emails.len(),
        read_rate: format!("{read_rate}%"),
        ai_summaries: summaries.len(),
        avg_read_time: format!("{}m", avg_read_secs / 60),
    })
    .into_response()
}

/// GET /api/summaries
pub async fn list_summaries(State(state): State<GatewayState>) -> Response {
    match state.storage.list_summaries().await {
        Ok(summaries) => Json(summaries).into_response(),
        Err(e) => storage_error(e, "fetch summaries"),
    }
}

/// POST /api/summaries/generate
///
/// Digest the five most recent emails, persist the summary, and raise an
/// `ai_summary` notification.
pub async fn generate_summary(State(state): State<GatewayState>) -> Response {
    let emails = match state.storage.list_emails().await {
        Ok(emails) => emails,
        Err(e) => return storage_error(e, "fetch emails"),
    };

    let inputs: Vec<SummaryInput> = emails
        .iter()
        .take(5)
        .map(|e| SummaryInput {
            subject: e.subject.clone(),
            content: e.content.clone(),
            // Outbound tracker: "sender" for the digest is who we sent to.
            sender: e.recipient.clone(),
            timestamp: e.sent_at.clone().unwrap_or_else(now_timestamp),
        })
        .collect();

    if inputs.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "no emails to summarize".to_string(),
            }),
        )
            .into_response();
    }

    let result = match state.summarizer.summarize_emails(&inputs).await {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, "summary generation failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "failed to generate summary".to_string(),
                }),
            )
                .into_response();
        }
    };

    let summary = AiSummary {
        id: Uuid::new_v4().to_string(),
        title: result.title.clone(),
        content: result.content,
        source: SummarySource::Email,
        source_data: serde_json::to_string(&inputs).ok(),
        priority: result.priority,
        key_points: serde_json::to_string(&result.key_points).ok(),
        created_at: now_timestamp(),
    };
    if let Err(e) = state.storage.create_summary(&summary).await {
        return storage_error(e, "store summary");
    }

    let notification = Notification {
        id: Uuid::new_v4().to_string(),
        kind: NotificationKind::AiSummary,
        title: "New AI Summary Available".to_string(),
        content: format!("Generated summary: {}", result.title),
        data: Some(serde_json::json!({ "summary_id": summary.id }).to_string()),
        is_read: false,
        created_at: now_timestamp(),
    };
    if let Err(e) = state.storage.create_notification(&notification).await {
        return storage_error(e, "store notification");
    }

    Json(summary).into_response()
}

/// GET /api/notifications
pub async fn list_notifications(State(state): State<GatewayState>) -> Response {
    match state.storage.list_notifications().await {
        Ok(notifications) => Json(notifications).into_response(),
        Err(e) => storage_error(e, "fetch notifications"),
    }
}

/// PUT /api/notifications/{id}/read
pub async fn mark_notification_read(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Response {
    match state.storage.mark_notification_read(&id).await {
        Ok(()) => Json(serde_json::json!({ "success": true })).into_response(),
        Err(e) => storage_error(e, "mark notification as read"),
    }
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(recipient: &str, subject: &str, content: &str) -> SendEmailRequest {
        SendEmailRequest {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn send_request_deserializes() {
        let json = r#"{
            "recipient": "alice@example.com",
            "subject": "Hello",
            "content": "<p>hi</p>"
        }"#;
        let req: SendEmailRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.recipient, "alice@example.com");
        assert_eq!(req.subject, "Hello");
    }

    #[test]
    fn validation_rejects_bad_requests() {
        assert!(validate_send_request(&request("alice@example.com", "Hi", "<p>x</p>")).is_ok());
        assert!(validate_send_request(&request("", "Hi", "<p>x</p>")).is_err());
        assert!(validate_send_request(&request("not-an-address", "Hi", "<p>x</p>")).is_err());
        assert!(validate_send_request(&request("alice@example.com", " ", "<p>x</p>")).is_err());
        assert!(validate_send_request(&request("alice@example.com", "Hi", "")).is_err());
    }

    #[test]
    fn send_response_flattens_email_fields() {
        let email = Email {
            id: "em-1".to_string(),
            recipient: "alice@example.com".to_string(),
            subject: "Hello".to_string(),
            content: "<p>hi</p>".to_string(),
            sent_at: Some("2026-01-01T00:00:00.000Z".to_string()),
            tracking_pixel_id: "px-1".to_string(),
            read_status: ReadStatus::Pending,
            read_at: None,
            read_seconds: None,
            open_count: 0,
        };
        let json = serde_json::to_string(&SendEmailResponse {
            email,
            message_id: "mid@example.com".to_string(),
        })
        .unwrap();
        assert!(json.contains("\"id\":\"em-1\""));
        assert!(json.contains("\"message_id\":\"mid@example.com\""));
    }

    #[test]
    fn stats_response_serializes() {
        let json = serde_json::to_string(&StatsResponse {
            sent_today: 3,
            emails_read: 2,
            read_rate: "67%".to_string(),
            ai_summaries: 1,
            avg_read_time: "2m".to_string(),
        })
        .unwrap();
        assert!(json.contains("\"read_rate\":\"67%\""));
        assert!(json.contains("\"avg_read_time\":\"2m\""));
    }
}
