// SPDX-FileCopyrightText: 2026 Mailtrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dashboard notification operations.

use mailtrace_core::MailtraceError;
use mailtrace_core::types::NotificationKind;
use rusqlite::params;

use crate::database::Database;
use crate::models::Notification;

fn row_to_notification(row: &rusqlite::Row<'_>) -> rusqlite::Result<Notification> {
    let kind: String = row.get(1)?;
    Ok(Notification {
        id: row.get(0)?,
        kind: kind.parse::<NotificationKind>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
        })?,
        title: row.get(2)?,
        content: row.get(3)?,
        data: row.get(4)?,
        is_read: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Insert a notification.
pub async fn insert_notification(
    db: &Database,
    notification: &Notification,
) -> Result<(), MailtraceError> {
    let notification = notification.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO notifications (id, kind, title, content, data, is_read, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    notification.id,
                    notification.kind.to_string(),
                    notification.title,
                    notification.content,
                    notification.data,
                    notification.is_read,
                    notification.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All notifications, newest first.
pub async fn list_notifications(db: &Database) -> Result<Vec<Notification>, MailtraceError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, kind, title, content, data, is_read, created_at
                 FROM notifications ORDER BY created_at DESC",
            )?;
            let rows = stmt.query_map([], row_to_notification)?;
            let mut notifications = Vec::new();
            for row in rows {
                notifications.push(row?);
            }
            Ok(notifications)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Mark a notification as read.
pub async fn mark_notification_read(db: &Database, id: &str) -> Result<(), MailtraceError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE notifications SET is_read = 1 WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
