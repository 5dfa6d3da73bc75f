// SPDX-FileCopyrightText: 2026 Mailtrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Email CRUD and status-transition operations.

use mailtrace_core::MailtraceError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{Email, ReadStatus};

const EMAIL_COLUMNS: &str = "id, recipient, subject, content, sent_at, tracking_pixel_id,
     read_status, read_at, read_seconds, open_count";

fn row_to_email(row: &rusqlite::Row<'_>) -> rusqlite::Result<Email> {
    let status: String = row.get(6)?;
    Ok(Email {
        id: row.get(0)?,
        recipient: row.get(1)?,
        subject: row.get(2)?,
        content: row.get(3)?,
        sent_at: row.get(4)?,
        tracking_pixel_id: row.get(5)?,
        read_status: status.parse::<ReadStatus>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
        })?,
        read_at: row.get(7)?,
        read_seconds: row.get(8)?,
        open_count: row.get(9)?,
    })
}

/// Insert a new tracked email.
pub async fn insert_email(db: &Database, email: &Email) -> Result<(), MailtraceError> {
    let email = email.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO emails (id, recipient, subject, content, sent_at,
                     tracking_pixel_id, read_status, read_at, read_seconds, open_count)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    email.id,
                    email.recipient,
                    email.subject,
                    email.content,
                    email.sent_at,
                    email.tracking_pixel_id,
                    email.read_status.to_string(),
                    email.read_at,
                    email.read_seconds,
                    email.open_count,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get an email by ID.
pub async fn get_email(db: &Database, id: &str) -> Result<Option<Email>, MailtraceError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {EMAIL_COLUMNS} FROM emails WHERE id = ?1"
            ))?;
            let result = stmt.query_row(params![id], row_to_email);
            match result {
                Ok(email) => Ok(Some(email)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Resolve the email owning a tracking pixel.
pub async fn get_email_by_pixel(
    db: &Database,
    pixel_id: &str,
) -> Result<Option<Email>, MailtraceError> {
    let pixel_id = pixel_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {EMAIL_COLUMNS} FROM emails WHERE tracking_pixel_id = ?1"
            ))?;
            let result = stmt.query_row(params![pixel_id], row_to_email);
            match result {
                Ok(email) => Ok(Some(email)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List all emails, newest first.
pub async fn list_emails(db: &Database) -> Result<Vec<Email>, MailtraceError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {EMAIL_COLUMNS} FROM emails ORDER BY sent_at DESC"
            ))?;
            let rows = stmt.query_map([], row_to_email)?;
            let mut emails = Vec::new();
            for row in rows {
                emails.push(row?);
            }
            Ok(emails)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Bump the open counter. Runs on every pixel fetch, qualifying or not.
pub async fn increment_open_count(db: &Database, email_id: &str) -> Result<(), MailtraceError> {
    let email_id = email_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE emails SET open_count = open_count + 1 WHERE id = ?1",
                params![email_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Conditionally transition `pending -> read`.
///
/// The `read_status = 'pending'` guard makes the transition idempotent under
/// concurrent pixel fetches: exactly one UPDATE observes a pending row.
/// Returns `true` when this call performed the transition.
pub async fn mark_read(
    db: &Database,
    email_id: &str,
    read_at: &str,
    read_seconds: i64,
) -> Result<bool, MailtraceError> {
    let email_id = email_id.to_string();
    let read_at = read_at.to_string();
    db.connection()
        .call(move |conn| {
            let affected = conn.execute(
                "UPDATE emails SET read_status = 'read', read_at = ?2, read_seconds = ?3
                 WHERE id = ?1 AND read_status = 'pending'",
                params![email_id, read_at, read_seconds],
            )?;
            Ok(affected > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Transition `pending -> failed` after a send error.
pub async fn mark_failed(db: &Database, email_id: &str) -> Result<(), MailtraceError> {
    let email_id = email_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE emails SET read_status = 'failed'
                 WHERE id = ?1 AND read_status = 'pending'",
                params![email_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
