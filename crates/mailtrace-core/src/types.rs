// SPDX-FileCopyrightText: 2026 Mailtrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Mailtrace workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Read lifecycle of a tracked email.
///
/// Transitions are one-way: `pending -> read` on the first qualifying pixel
/// fetch, or `pending -> failed` when SMTP dispatch errors. Both targets are
/// terminal for this pipeline.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReadStatus {
    Pending,
    Read,
    Unread,
    Failed,
}

/// Category of a dashboard notification.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ReadReceipt,
    AiSummary,
    System,
}

/// Priority assigned by the summary generator.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SummaryPriority {
    Urgent,
    Normal,
    Low,
}

/// Origin of the material a summary was generated from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SummarySource {
    Email,
    Notification,
    Mixed,
}

/// A tracked outbound email.
///
/// `sent_at` is set once when the send request is accepted and never changes.
/// `open_count` increments on every pixel fetch regardless of how the open
/// classifier judges the fetch; `read_at` and `read_seconds` are written only
/// by the first qualifying open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Email {
    pub id: String,
    pub recipient: String,
    pub subject: String,
    /// HTML body with the tracking pixel already embedded.
    pub content: String,
    /// ISO 8601 UTC timestamp, immutable after creation.
    pub sent_at: Option<String>,
    /// Opaque pixel identifier, unique and 1:1 with the email.
    pub tracking_pixel_id: String,
    pub read_status: ReadStatus,
    pub read_at: Option<String>,
    /// Synthetic dwell time in seconds; not a measured value.
    pub read_seconds: Option<i64>,
    pub open_count: i64,
}

/// One pixel fetch, persisted for every access whether or not it counted
/// as a genuine open. Append-only; ordering by `fetched_at` feeds the
/// classifier's burst detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadReceipt {
    pub id: String,
    pub email_id: String,
    /// Denormalized copy of the owning email's pixel id.
    pub tracking_pixel_id: String,
    pub remote_addr: String,
    pub user_agent: String,
    /// ISO 8601 UTC timestamp of the fetch.
    pub fetched_at: String,
    pub session_seconds: Option<i64>,
}

/// A stored AI-generated summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiSummary {
    pub id: String,
    pub title: String,
    pub content: String,
    pub source: SummarySource,
    /// JSON snapshot of the inputs the summary was generated from.
    pub source_data: Option<String>,
    pub priority: SummaryPriority,
    /// JSON array of key-point strings.
    pub key_points: Option<String>,
    pub created_at: String,
}

/// A dashboard notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub content: String,
    /// JSON payload with kind-specific details.
    pub data: Option<String>,
    pub is_read: bool,
    pub created_at: String,
}

/// One email handed to the summary generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryInput {
    pub subject: String,
    pub content: String,
    pub sender: String,
    pub timestamp: String,
}

/// The summary generator's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailSummary {
    pub title: String,
    pub content: String,
    pub priority: SummaryPriority,
    pub key_points: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn read_status_round_trips_through_strings() {
        for status in [
            ReadStatus::Pending,
            ReadStatus::Read,
            ReadStatus::Unread,
            ReadStatus::Failed,
        ] {
            let s = status.to_string();
            assert_eq!(ReadStatus::from_str(&s).unwrap(), status);
        }
        assert_eq!(ReadStatus::Pending.to_string(), "pending");
    }

    #[test]
    fn notification_kind_uses_snake_case() {
        assert_eq!(NotificationKind::ReadReceipt.to_string(), "read_receipt");
        assert_eq!(
            NotificationKind::from_str("ai_summary").unwrap(),
            NotificationKind::AiSummary
        );
    }

    #[test]
    fn summary_priority_serializes_lowercase() {
        let json = serde_json::to_string(&SummaryPriority::Urgent).unwrap();
        assert_eq!(json, "\"urgent\"");
        let parsed: SummaryPriority = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(parsed, SummaryPriority::Low);
    }

    #[test]
    fn email_serializes_with_nullable_read_fields() {
        let email = Email {
            id: "em-1".into(),
            recipient: "someone@example.com".into(),
            subject: "Hello".into(),
            content: "<p>hi</p>".into(),
            sent_at: Some("2026-01-01T00:00:00.000Z".into()),
            tracking_pixel_id: "px-1".into(),
            read_status: ReadStatus::Pending,
            read_at: None,
            read_seconds: None,
            open_count: 0,
        };
        let json = serde_json::to_string(&email).unwrap();
        assert!(json.contains("\"read_status\":\"pending\""));
        assert!(json.contains("\"read_at\":null"));
        let back: Email = serde_json::from_str(&json).unwrap();
        assert_eq!(back, email);
    }
}
