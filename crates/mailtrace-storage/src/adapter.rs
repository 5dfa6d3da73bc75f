// SPDX-FileCopyrightText: 2026 Mailtrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use mailtrace_config::model::StorageConfig;
use mailtrace_core::types::{AiSummary, Email, Notification, ReadReceipt};
use mailtrace_core::{MailtraceError, StorageAdapter};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`StorageAdapter::initialize`]
    /// is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, MailtraceError> {
        self.db.get().ok_or_else(|| MailtraceError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), MailtraceError> {
        let db = Database::open(&self.config.database_path).await?;
        self.db.set(db).map_err(|_| MailtraceError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), MailtraceError> {
        self.db()?.close().await
    }

    async fn health_check(&self) -> Result<(), MailtraceError> {
        self.db()?
            .connection()
            .call(|conn| {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)
    }

    // --- Email operations ---

    async fn create_email(&self, email: &Email) -> Result<(), MailtraceError> {
        queries::emails::insert_email(self.db()?, email).await
    }

    async fn get_email(&self, id: &str) -> Result<Option<Email>, MailtraceError> {
        queries::emails::get_email(self.db()?, id).await
    }

    async fn get_email_by_pixel(&self, pixel_id: &str) -> Result<Option<Email>, MailtraceError> {
        queries::emails::get_email_by_pixel(self.db()?, pixel_id).await
    }

    async fn list_emails(&self) -> Result<Vec<Email>, MailtraceError> {
        queries::emails::list_emails(self.db()?).await
    }

    async fn increment_open_count(&self, email_id: &str) -> Result<(), MailtraceError> {
        queries::emails::increment_open_count(self.db()?, email_id).await
    }

    async fn mark_email_read(
        &self,
        email_id: &str,
        read_at: &str,
        read_seconds: i64,
    ) -> Result<bool, MailtraceError> {
        queries::emails::mark_read(self.db()?, email_id, read_at, read_seconds).await
    }

    async fn mark_email_failed(&self, email_id: &str) -> Result<(), MailtraceError> {
        queries::emails::mark_failed(self.db()?, email_id).await
    }

    // --- Read receipt operations ---

    async fn create_receipt(&self, receipt: &ReadReceipt) -> Result<(), MailtraceError> {
        queries::receipts::insert_receipt(self.db()?, receipt).await
    }

    async fn receipts_for_email(
        &self,
        email_id: &str,
    ) -> Result<Vec<ReadReceipt>, MailtraceError> {
        queries::receipts::receipts_for_email(self.db()?, email_id).await
    }

    // --- Summary operations ---

    async fn create_summary(&self, summary: &AiSummary) -> Result<(), MailtraceError> {
        queries::summaries::insert_summary(self.db()?, summary).await
    }

    async fn list_summaries(&self) -> Result<Vec<AiSummary>, MailtraceError> {
        queries::summaries::list_summaries(self.db()?).await
    }

    // --- Notification operations ---

    async fn create_notification(
        &self,
        notification: &Notification,
    ) -> Result<(), MailtraceError> {
        queries::notifications::insert_notification(self.db()?, notification).await
    }

    async fn list_notifications(&self) -> Result<Vec<Notification>, MailtraceError> {
        queries::notifications::list_notifications(self.db()?).await
    }

    async fn mark_notification_read(&self, id: &str) -> Result<(), MailtraceError> {
        queries::notifications::mark_notification_read(self.db()?, id).await
    }
}
