// SPDX-FileCopyrightText: 2026 Mailtrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read receipt operations. Receipts are append-only: one row per pixel
//! fetch, never mutated or deleted.

use mailtrace_core::MailtraceError;
use rusqlite::params;

use crate::database::Database;
use crate::models::ReadReceipt;

fn row_to_receipt(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReadReceipt> {
    Ok(ReadReceipt {
        id: row.get(0)?,
        email_id: row.get(1)?,
        tracking_pixel_id: row.get(2)?,
        remote_addr: row.get(3)?,
        user_agent: row.get(4)?,
        fetched_at: row.get(5)?,
        session_seconds: row.get(6)?,
    })
}

/// Insert a receipt for one pixel fetch.
pub async fn insert_receipt(db: &Database, receipt: &ReadReceipt) -> Result<(), MailtraceError> {
    let receipt = receipt.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO read_receipts (id, email_id, tracking_pixel_id, remote_addr,
                     user_agent, fetched_at, session_seconds)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    receipt.id,
                    receipt.email_id,
                    receipt.tracking_pixel_id,
                    receipt.remote_addr,
                    receipt.user_agent,
                    receipt.fetched_at,
                    receipt.session_seconds,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All receipts for an email, oldest fetch first.
pub async fn receipts_for_email(
    db: &Database,
    email_id: &str,
) -> Result<Vec<ReadReceipt>, MailtraceError> {
    let email_id = email_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, email_id, tracking_pixel_id, remote_addr, user_agent,
                        fetched_at, session_seconds
                 FROM read_receipts WHERE email_id = ?1
                 ORDER BY fetched_at ASC",
            )?;
            let rows = stmt.query_map(params![email_id], row_to_receipt)?;
            let mut receipts = Vec::new();
            for row in rows {
                receipts.push(row?);
            }
            Ok(receipts)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
