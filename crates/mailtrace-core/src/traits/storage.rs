// SPDX-FileCopyrightText: 2026 Mailtrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for persistence backends (SQLite, etc.).

use async_trait::async_trait;

use crate::error::MailtraceError;
use crate::types::{AiSummary, Email, Notification, ReadReceipt};

/// Adapter for the persistence backend.
///
/// Emails and read receipts are the tracking core's state; summaries and
/// notifications are dashboard material. Receipts are append-only and no
/// entity is ever deleted through this interface.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Initializes the backend (migrations, connection setup).
    async fn initialize(&self) -> Result<(), MailtraceError>;

    /// Closes the backend, flushing pending writes.
    async fn close(&self) -> Result<(), MailtraceError>;

    /// Verifies the backend answers a trivial query.
    async fn health_check(&self) -> Result<(), MailtraceError>;

    // --- Email operations ---

    async fn create_email(&self, email: &Email) -> Result<(), MailtraceError>;

    async fn get_email(&self, id: &str) -> Result<Option<Email>, MailtraceError>;

    /// Resolves the email owning a tracking pixel, if any.
    async fn get_email_by_pixel(&self, pixel_id: &str) -> Result<Option<Email>, MailtraceError>;

    /// All emails, newest first.
    async fn list_emails(&self) -> Result<Vec<Email>, MailtraceError>;

    /// Bumps the open counter. Runs on every pixel fetch, qualifying or not.
    async fn increment_open_count(&self, email_id: &str) -> Result<(), MailtraceError>;

    /// Transitions `pending -> read`, stamping `read_at` and `read_seconds`.
    ///
    /// Returns `true` only when this call performed the transition; a status
    /// other than `pending` leaves the row untouched and returns `false`.
    async fn mark_email_read(
        &self,
        email_id: &str,
        read_at: &str,
        read_seconds: i64,
    ) -> Result<bool, MailtraceError>;

    /// Transitions `pending -> failed` after an SMTP dispatch error.
    async fn mark_email_failed(&self, email_id: &str) -> Result<(), MailtraceError>;

    // --- Read receipt operations ---

    async fn create_receipt(&self, receipt: &ReadReceipt) -> Result<(), MailtraceError>;

    /// Every receipt recorded for the email. The classifier imposes its own
    /// ordering; callers must not rely on any here.
    async fn receipts_for_email(&self, email_id: &str)
        -> Result<Vec<ReadReceipt>, MailtraceError>;

    // --- Summary operations ---

    async fn create_summary(&self, summary: &AiSummary) -> Result<(), MailtraceError>;

    /// All summaries, newest first.
    async fn list_summaries(&self) -> Result<Vec<AiSummary>, MailtraceError>;

    // --- Notification operations ---

    async fn create_notification(&self, notification: &Notification)
        -> Result<(), MailtraceError>;

    /// All notifications, newest first.
    async fn list_notifications(&self) -> Result<Vec<Notification>, MailtraceError>;

    async fn mark_notification_read(&self, id: &str) -> Result<(), MailtraceError>;
}
