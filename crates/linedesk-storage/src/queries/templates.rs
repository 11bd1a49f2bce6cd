// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canned reply template queries.

use rusqlite::params;

use linedesk_core::LinedeskError;
use linedesk_core::types::ReplyTemplate;

use crate::database::{Database, map_tr_err};

/// Templates for one channel, in insertion order.
pub async fn list_templates(
    db: &Database,
    channel_id: &str,
) -> Result<Vec<ReplyTemplate>, LinedeskError> {
    let channel_id = channel_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, channel_id, body FROM templates
                 WHERE channel_id = ?1 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![channel_id], |row| {
                Ok(ReplyTemplate {
                    id: row.get(0)?,
                    channel_id: row.get(1)?,
                    body: row.get(2)?,
                })
            })?;
            let mut templates = Vec::new();
            for row in rows {
                templates.push(row?);
            }
            Ok(templates)
        })
        .await
        .map_err(map_tr_err)
}

/// Add a template and return the stored row.
pub async fn add_template(
    db: &Database,
    channel_id: &str,
    body: &str,
) -> Result<ReplyTemplate, LinedeskError> {
    let channel_id = channel_id.to_string();
    let body = body.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO templates (channel_id, body) VALUES (?1, ?2)",
                params![channel_id, body],
            )?;
            Ok(ReplyTemplate {
                id: conn.last_insert_rowid(),
                channel_id,
                body,
            })
        })
        .await
        .map_err(map_tr_err)
}
