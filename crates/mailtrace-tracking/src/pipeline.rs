// SPDX-FileCopyrightText: 2026 Mailtrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deferred tracking pipeline for pixel fetches.
//!
//! The delivery endpoint returns the pixel bytes immediately and schedules
//! this pipeline to run afterwards; nothing awaits its outcome. Every fetch
//! records a receipt and bumps the open counter; only fetches the classifier
//! accepts can transition a pending email to read and raise a notification.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use rand::Rng;
use tracing::{debug, error};
use uuid::Uuid;

use mailtrace_core::{
    MailtraceError, Notification, NotificationKind, ReadReceipt, ReadStatus, StorageAdapter,
};

use crate::classifier::is_genuine_open;

/// Run the deferred tracking work for one pixel fetch.
///
/// Entry point for `tokio::spawn`: the pixel response has already been
/// produced, so failures here are logged and swallowed, never surfaced.
pub async fn process_pixel_fetch(
    storage: Arc<dyn StorageAdapter>,
    pixel_id: String,
    remote_addr: String,
    user_agent: String,
) {
    if let Err(e) = track_fetch(storage.as_ref(), &pixel_id, &remote_addr, &user_agent).await {
        error!(error = %e, pixel_id = %pixel_id, "tracking pipeline failed");
    }
}

async fn track_fetch(
    storage: &dyn StorageAdapter,
    pixel_id: &str,
    remote_addr: &str,
    user_agent: &str,
) -> Result<(), MailtraceError> {
    let Some(email) = storage.get_email_by_pixel(pixel_id).await? else {
        debug!(pixel_id, "fetch for unknown pixel id, dropping");
        return Ok(());
    };

    let now = Utc::now();
    let fetched_at = now.to_rfc3339_opts(SecondsFormat::Millis, true);

    // Receipt and counter record every fetch, qualifying or not.
    let receipt = ReadReceipt {
        id: Uuid::new_v4().to_string(),
        email_id: email.id.clone(),
        tracking_pixel_id: email.tracking_pixel_id.clone(),
        remote_addr: remote_addr.to_string(),
        user_agent: user_agent.to_string(),
        fetched_at: fetched_at.clone(),
        session_seconds: None,
    };
    storage.create_receipt(&receipt).await?;
    storage.increment_open_count(&email.id).await?;

    // A failed lookup here must not veto the open; the classifier handles
    // the error arm itself.
    let history = storage.receipts_for_email(&email.id).await;
    if !is_genuine_open(&email, user_agent, now, history) {
        return Ok(());
    }
    if email.read_status != ReadStatus::Pending {
        return Ok(());
    }

    let read_seconds = synthetic_read_seconds();
    let transitioned = storage
        .mark_email_read(&email.id, &fetched_at, read_seconds)
        .await?;
    if !transitioned {
        // Lost the race to a concurrent qualifying fetch.
        return Ok(());
    }

    let notification = Notification {
        id: Uuid::new_v4().to_string(),
        kind: NotificationKind::ReadReceipt,
        title: "Email Read".to_string(),
        content: read_notification_content(&email.recipient, &email.subject, read_seconds),
        data: Some(
            serde_json::json!({ "email_id": email.id, "read_seconds": read_seconds }).to_string(),
        ),
        is_read: false,
        created_at: fetched_at,
    };
    storage.create_notification(&notification).await?;
    debug!(email_id = %email.id, "email transitioned to read");
    Ok(())
}

/// Placeholder dwell time in seconds, uniform in [60, 360).
///
/// A single pixel fetch cannot observe how long the reader kept the message
/// open; the value is synthetic and the analytics built on it are
/// non-authoritative.
fn synthetic_read_seconds() -> i64 {
    rand::thread_rng().gen_range(60..360)
}

/// Notification body for a read event, e.g.
/// `alice@example.com just read your "Q3 report" email. Reading time: 2m 30s`.
fn read_notification_content(recipient: &str, subject: &str, read_seconds: i64) -> String {
    format!(
        "{recipient} just read your \"{subject}\" email. Reading time: {}m {}s",
        read_seconds / 60,
        read_seconds % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use mailtrace_config::model::StorageConfig;
    use mailtrace_core::Email;
    use mailtrace_storage::SqliteStorage;
    use tempfile::tempdir;

    async fn setup_storage() -> (Arc<dyn StorageAdapter>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("pipeline.db");
        let storage = SqliteStorage::new(StorageConfig {
            database_path: db_path.to_str().unwrap().to_string(),
        });
        storage.initialize().await.unwrap();
        (Arc::new(storage), dir)
    }

    fn fmt(t: chrono::DateTime<Utc>) -> String {
        t.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    async fn insert_email_sent_secs_ago(storage: &dyn StorageAdapter, secs: i64) -> Email {
        let email = Email {
            id: Uuid::new_v4().to_string(),
            recipient: "someone@example.com".to_string(),
            subject: "Quarterly update".to_string(),
            content: "<p>numbers inside</p>".to_string(),
            sent_at: Some(fmt(Utc::now() - Duration::seconds(secs))),
            tracking_pixel_id: Uuid::new_v4().to_string(),
            read_status: ReadStatus::Pending,
            read_at: None,
            read_seconds: None,
            open_count: 0,
        };
        storage.create_email(&email).await.unwrap();
        email
    }

    #[tokio::test]
    async fn unknown_pixel_id_is_dropped_silently() {
        let (storage, _dir) = setup_storage().await;
        process_pixel_fetch(
            storage.clone(),
            "px-unknown".to_string(),
            "203.0.113.9".to_string(),
            "Mozilla/5.0".to_string(),
        )
        .await;
        // Nothing was created.
        assert!(storage.list_notifications().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn early_fetch_records_receipt_but_stays_pending() {
        let (storage, _dir) = setup_storage().await;
        let email = insert_email_sent_secs_ago(storage.as_ref(), 5).await;

        process_pixel_fetch(
            storage.clone(),
            email.tracking_pixel_id.clone(),
            "203.0.113.9".to_string(),
            "Mozilla/5.0".to_string(),
        )
        .await;

        let stored = storage.get_email(&email.id).await.unwrap().unwrap();
        assert_eq!(stored.read_status, ReadStatus::Pending);
        assert_eq!(stored.open_count, 1);
        assert!(stored.read_at.is_none());
        assert_eq!(storage.receipts_for_email(&email.id).await.unwrap().len(), 1);
        assert!(storage.list_notifications().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn automated_agent_records_receipt_but_stays_pending() {
        let (storage, _dir) = setup_storage().await;
        let email = insert_email_sent_secs_ago(storage.as_ref(), 60).await;

        process_pixel_fetch(
            storage.clone(),
            email.tracking_pixel_id.clone(),
            "203.0.113.9".to_string(),
            "GoogleImageProxy (via ggpht.com)".to_string(),
        )
        .await;

        let stored = storage.get_email(&email.id).await.unwrap().unwrap();
        assert_eq!(stored.read_status, ReadStatus::Pending);
        assert_eq!(stored.open_count, 1);
        assert_eq!(storage.receipts_for_email(&email.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn qualifying_fetch_transitions_and_notifies_once() {
        let (storage, _dir) = setup_storage().await;
        let email = insert_email_sent_secs_ago(storage.as_ref(), 60).await;

        process_pixel_fetch(
            storage.clone(),
            email.tracking_pixel_id.clone(),
            "203.0.113.9".to_string(),
            "Mozilla/5.0".to_string(),
        )
        .await;

        let stored = storage.get_email(&email.id).await.unwrap().unwrap();
        assert_eq!(stored.read_status, ReadStatus::Read);
        assert_eq!(stored.open_count, 1);
        assert!(stored.read_at.is_some());
        let read_seconds = stored.read_seconds.unwrap();
        assert!((60..360).contains(&read_seconds));

        let notifications = storage.list_notifications().await.unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::ReadReceipt);
        assert!(notifications[0].content.contains("someone@example.com"));
        assert!(notifications[0].content.contains("Quarterly update"));
        assert!(notifications[0].content.contains("Reading time:"));
    }

    #[tokio::test]
    async fn later_fetches_keep_counting_without_new_notifications() {
        let (storage, _dir) = setup_storage().await;
        let email = insert_email_sent_secs_ago(storage.as_ref(), 60).await;

        process_pixel_fetch(
            storage.clone(),
            email.tracking_pixel_id.clone(),
            "203.0.113.9".to_string(),
            "Mozilla/5.0".to_string(),
        )
        .await;
        let after_first = storage.get_email(&email.id).await.unwrap().unwrap();
        assert_eq!(after_first.read_status, ReadStatus::Read);
        let first_read_at = after_first.read_at.clone();
        let first_read_seconds = after_first.read_seconds;

        // Second fetch: receipt and counter move, read fields do not.
        process_pixel_fetch(
            storage.clone(),
            email.tracking_pixel_id.clone(),
            "203.0.113.9".to_string(),
            "Mozilla/5.0".to_string(),
        )
        .await;

        let after_second = storage.get_email(&email.id).await.unwrap().unwrap();
        assert_eq!(after_second.read_status, ReadStatus::Read);
        assert_eq!(after_second.open_count, 2);
        assert_eq!(after_second.read_at, first_read_at);
        assert_eq!(after_second.read_seconds, first_read_seconds);
        assert_eq!(storage.receipts_for_email(&email.id).await.unwrap().len(), 2);
        assert_eq!(storage.list_notifications().await.unwrap().len(), 1);
    }

    #[test]
    fn notification_content_formats_duration() {
        let content = read_notification_content("alice@example.com", "Q3 report", 150);
        assert_eq!(
            content,
            "alice@example.com just read your \"Q3 report\" email. Reading time: 2m 30s"
        );
    }

    #[test]
    fn synthetic_read_seconds_stays_in_range() {
        for _ in 0..100 {
            let secs = synthetic_read_seconds();
            assert!((60..360).contains(&secs), "got {secs}");
        }
    }
}
