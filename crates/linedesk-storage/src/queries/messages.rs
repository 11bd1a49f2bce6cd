// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation log queries.
//!
//! Message ids are server-assigned and strictly increasing in insertion
//! order, so `ORDER BY id` IS persistence order. Timestamps are set in
//! SQL at insert time and never taken from the caller.

use std::str::FromStr;

use rusqlite::params;

use linedesk_core::LinedeskError;
use linedesk_core::types::{CaseId, DeliveryState, MessageId, SenderRole, StoredMessage};

use crate::database::{Database, map_tr_err};

const MESSAGE_COLUMNS: &str = "id, case_id, sender, body, delivery, created_at";

pub(crate) fn message_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredMessage> {
    let sender: String = row.get(2)?;
    let sender = SenderRole::from_str(&sender).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let delivery: Option<String> = row.get(4)?;
    let delivery = match delivery {
        Some(s) => Some(DeliveryState::from_str(&s).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?),
        None => None,
    };
    Ok(StoredMessage {
        id: MessageId(row.get(0)?),
        case_id: CaseId(row.get(1)?),
        sender,
        body: row.get(3)?,
        delivery,
        created_at: row.get(5)?,
    })
}

/// Append a message with server-assigned id and timestamp.
///
/// Fails with `UnknownCase` when the case id does not exist. The
/// existence check and insert run in one closure on the writer thread,
/// and cases are never deleted, so the check cannot go stale.
pub async fn insert_message(
    db: &Database,
    case_id: CaseId,
    sender: SenderRole,
    body: &str,
    delivery: Option<DeliveryState>,
) -> Result<StoredMessage, LinedeskError> {
    let body = body.to_string();
    let sender = sender.to_string();
    let delivery = delivery.map(|d| d.to_string());
    let stored = db
        .connection()
        .call(move |conn| {
            let case_exists: bool = conn
                .prepare("SELECT EXISTS(SELECT 1 FROM cases WHERE id = ?1)")?
                .query_row(params![case_id.0], |row| row.get(0))?;
            if !case_exists {
                return Ok(None);
            }

            conn.execute(
                "INSERT INTO messages (case_id, sender, body, delivery, created_at)
                 VALUES (?1, ?2, ?3, ?4, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))",
                params![case_id.0, sender, body, delivery],
            )?;
            let id = conn.last_insert_rowid();
            let message = conn
                .prepare(&format!(
                    "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"
                ))?
                .query_row(params![id], message_from_row)?;
            Ok(Some(message))
        })
        .await
        .map_err(map_tr_err)?;

    stored.ok_or(LinedeskError::UnknownCase { case_id: case_id.0 })
}

/// Messages for a case in persistence order (oldest first).
pub async fn messages_for_case(
    db: &Database,
    case_id: CaseId,
    limit: Option<i64>,
) -> Result<Vec<StoredMessage>, LinedeskError> {
    db.connection()
        .call(move |conn| {
            let mut messages = Vec::new();
            match limit {
                Some(lim) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {MESSAGE_COLUMNS} FROM messages
                         WHERE case_id = ?1 ORDER BY id ASC LIMIT ?2"
                    ))?;
                    let rows = stmt.query_map(params![case_id.0, lim], message_from_row)?;
                    for row in rows {
                        messages.push(row?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {MESSAGE_COLUMNS} FROM messages
                         WHERE case_id = ?1 ORDER BY id ASC"
                    ))?;
                    let rows = stmt.query_map(params![case_id.0], message_from_row)?;
                    for row in rows {
                        messages.push(row?);
                    }
                }
            }
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}

/// Newest-first summary slice of a case's messages.
pub async fn recent_messages(
    db: &Database,
    case_id: CaseId,
    limit: i64,
) -> Result<Vec<StoredMessage>, LinedeskError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE case_id = ?1 ORDER BY id DESC LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![case_id.0, limit], message_from_row)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}

/// Flip the delivery flag of an admin message after a push attempt.
pub async fn set_delivery(
    db: &Database,
    id: MessageId,
    state: DeliveryState,
) -> Result<(), LinedeskError> {
    let state = state.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE messages SET delivery = ?1 WHERE id = ?2",
                params![state, id.0],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
