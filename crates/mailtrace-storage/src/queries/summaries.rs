// SPDX-FileCopyrightText: 2026 Mailtrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AI summary persistence.

use mailtrace_core::MailtraceError;
use mailtrace_core::types::{SummaryPriority, SummarySource};
use rusqlite::params;

use crate::database::Database;
use crate::models::AiSummary;

fn row_to_summary(row: &rusqlite::Row<'_>) -> rusqlite::Result<AiSummary> {
    let source: String = row.get(3)?;
    let priority: String = row.get(5)?;
    Ok(AiSummary {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        source: source.parse::<SummarySource>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?,
        source_data: row.get(4)?,
        priority: priority.parse::<SummaryPriority>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?,
        key_points: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Insert a generated summary.
pub async fn insert_summary(db: &Database, summary: &AiSummary) -> Result<(), MailtraceError> {
    let summary = summary.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO ai_summaries (id, title, content, source, source_data,
                     priority, key_points, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    summary.id,
                    summary.title,
                    summary.content,
                    summary.source.to_string(),
                    summary.source_data,
                    summary.priority.to_string(),
                    summary.key_points,
                    summary.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All summaries, newest first.
pub async fn list_summaries(db: &Database) -> Result<Vec<AiSummary>, MailtraceError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, content, source, source_data, priority, key_points, created_at
                 FROM ai_summaries ORDER BY created_at DESC",
            )?;
            let rows = stmt.query_map([], row_to_summary)?;
            let mut summaries = Vec::new();
            for row in rows {
                summaries.push(row?);
            }
            Ok(summaries)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
