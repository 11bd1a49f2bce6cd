// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Case registry queries.
//!
//! `resolve_or_create` performs its lookup and insert inside one closure
//! on the writer thread, which makes it atomic with respect to every
//! other write -- two concurrent webhook deliveries for the same
//! customer cannot both insert.

use std::str::FromStr;

use rusqlite::params;

use linedesk_core::LinedeskError;
use linedesk_core::types::{Case, CaseFilter, CaseId, CaseStatus};

use crate::database::{Database, map_tr_err};

const CASE_COLUMNS: &str = "id, customer_id, channel_id, status, assignee, note, created_at";

pub(crate) fn case_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Case> {
    let status: String = row.get(3)?;
    let status = CaseStatus::from_str(&status).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Case {
        id: CaseId(row.get(0)?),
        customer_id: row.get(1)?,
        channel_id: row.get(2)?,
        status,
        assignee: row.get(4)?,
        note: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Return the open case for (customer, channel), creating one with
/// status `new` when none exists. The boolean is `true` on creation.
pub async fn resolve_or_create(
    db: &Database,
    customer_id: &str,
    channel_id: &str,
) -> Result<(Case, bool), LinedeskError> {
    let customer = customer_id.to_string();
    let channel = channel_id.to_string();
    db.connection()
        .call(move |conn| {
            let existing = conn
                .prepare(&format!(
                    "SELECT {CASE_COLUMNS} FROM cases
                     WHERE customer_id = ?1 AND channel_id = ?2 AND status != 'closed'"
                ))?
                .query_row(params![customer, channel], case_from_row);

            match existing {
                Ok(case) => Ok((case, false)),
                Err(rusqlite::Error::QueryReturnedNoRows) => {
                    conn.execute(
                        "INSERT INTO cases (customer_id, channel_id, status, created_at)
                         VALUES (?1, ?2, 'new', strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))",
                        params![customer, channel],
                    )?;
                    let id = conn.last_insert_rowid();
                    let case = conn
                        .prepare(&format!("SELECT {CASE_COLUMNS} FROM cases WHERE id = ?1"))?
                        .query_row(params![id], case_from_row)?;
                    Ok((case, true))
                }
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(|e| map_conflict(e, customer_id, channel_id))
}

/// Map a unique-index violation on the open-case index to the typed
/// conflict error; everything else is a storage failure.
fn map_conflict(e: tokio_rusqlite::Error, customer_id: &str, channel_id: &str) -> LinedeskError {
    if let tokio_rusqlite::Error::Error(rusqlite::Error::SqliteFailure(err, _)) = &e {
        if err.code == rusqlite::ErrorCode::ConstraintViolation {
            return LinedeskError::DuplicateOpenCase {
                customer_id: customer_id.to_string(),
                channel_id: channel_id.to_string(),
            };
        }
    }
    map_tr_err(e)
}

/// Get a case by id.
pub async fn get_case(db: &Database, id: CaseId) -> Result<Option<Case>, LinedeskError> {
    db.connection()
        .call(move |conn| {
            let result = conn
                .prepare(&format!("SELECT {CASE_COLUMNS} FROM cases WHERE id = ?1"))?
                .query_row(params![id.0], case_from_row);
            match result {
                Ok(case) => Ok(Some(case)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// List cases newest-first, optionally filtered by status and channel.
pub async fn list_cases(
    db: &Database,
    filter: &CaseFilter,
) -> Result<Vec<Case>, LinedeskError> {
    let status = filter.status.map(|s| s.to_string());
    let channel = filter.channel_id.clone();
    db.connection()
        .call(move |conn| {
            let mut sql = format!("SELECT {CASE_COLUMNS} FROM cases");
            let mut clauses = Vec::new();
            let mut args: Vec<String> = Vec::new();

            if let Some(status) = status {
                args.push(status);
                clauses.push(format!("status = ?{}", args.len()));
            }
            if let Some(channel) = channel {
                args.push(channel);
                clauses.push(format!("channel_id = ?{}", args.len()));
            }
            if !clauses.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&clauses.join(" AND "));
            }
            sql.push_str(" ORDER BY created_at DESC, id DESC");

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(rusqlite::params_from_iter(args.iter()), case_from_row)?;
            let mut cases = Vec::new();
            for row in rows {
                cases.push(row?);
            }
            Ok(cases)
        })
        .await
        .map_err(map_tr_err)
}

/// Set the assignee and move the case to `assigned`. Last writer wins on
/// re-assignment. Returns the updated case, `None` when the id is unknown.
pub async fn assign_case(
    db: &Database,
    id: CaseId,
    admin: &str,
) -> Result<Option<Case>, LinedeskError> {
    let admin = admin.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE cases SET status = 'assigned', assignee = ?1 WHERE id = ?2",
                params![admin, id.0],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            let case = conn
                .prepare(&format!("SELECT {CASE_COLUMNS} FROM cases WHERE id = ?1"))?
                .query_row(params![id.0], case_from_row)?;
            Ok(Some(case))
        })
        .await
        .map_err(map_tr_err)
}

/// Replace the free-text note. Returns `None` when the id is unknown.
pub async fn set_case_note(
    db: &Database,
    id: CaseId,
    note: &str,
) -> Result<Option<Case>, LinedeskError> {
    let note = note.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE cases SET note = ?1 WHERE id = ?2",
                params![note, id.0],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            let case = conn
                .prepare(&format!("SELECT {CASE_COLUMNS} FROM cases WHERE id = ?1"))?
                .query_row(params![id.0], case_from_row)?;
            Ok(Some(case))
        })
        .await
        .map_err(map_tr_err)
}

/// Set the lifecycle status, optionally clearing the assignee (used by
/// reopen). Returns `None` when the id is unknown.
pub async fn set_case_status(
    db: &Database,
    id: CaseId,
    status: CaseStatus,
    clear_assignee: bool,
) -> Result<Option<Case>, LinedeskError> {
    let status = status.to_string();
    db.connection()
        .call(move |conn| {
            let changed = if clear_assignee {
                conn.execute(
                    "UPDATE cases SET status = ?1, assignee = NULL WHERE id = ?2",
                    params![status, id.0],
                )?
            } else {
                conn.execute(
                    "UPDATE cases SET status = ?1 WHERE id = ?2",
                    params![status, id.0],
                )?
            };
            if changed == 0 {
                return Ok(None);
            }
            let case = conn
                .prepare(&format!("SELECT {CASE_COLUMNS} FROM cases WHERE id = ?1"))?
                .query_row(params![id.0], case_from_row)?;
            Ok(Some(case))
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("cases.db")).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn resolve_creates_then_reuses_case() {
        let (db, _dir) = setup_db().await;

        let (case, created) = resolve_or_create(&db, "U1", "OA-A").await.unwrap();
        assert!(created);
        assert_eq!(case.status, CaseStatus::New);
        assert_eq!(case.customer_id, "U1");
        assert!(case.assignee.is_none());

        let (again, created) = resolve_or_create(&db, "U1", "OA-A").await.unwrap();
        assert!(!created);
        assert_eq!(again.id, case.id);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn distinct_channels_get_distinct_cases() {
        let (db, _dir) = setup_db().await;

        let (a, _) = resolve_or_create(&db, "U1", "OA-A").await.unwrap();
        let (b, _) = resolve_or_create(&db, "U1", "OA-B").await.unwrap();
        assert_ne!(a.id, b.id);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn closed_case_is_not_resolved() {
        let (db, _dir) = setup_db().await;

        let (first, _) = resolve_or_create(&db, "U1", "OA-A").await.unwrap();
        set_case_status(&db, first.id, CaseStatus::Closed, false)
            .await
            .unwrap();

        let (second, created) = resolve_or_create(&db, "U1", "OA-A").await.unwrap();
        assert!(created, "a closed case must not swallow new contacts");
        assert_ne!(second.id, first.id);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn assign_sets_status_and_admin() {
        let (db, _dir) = setup_db().await;

        let (case, _) = resolve_or_create(&db, "U1", "OA-A").await.unwrap();
        let updated = assign_case(&db, case.id, "Alice").await.unwrap().unwrap();
        assert_eq!(updated.status, CaseStatus::Assigned);
        assert_eq!(updated.assignee.as_deref(), Some("Alice"));

        // Last writer wins on re-assignment.
        let updated = assign_case(&db, case.id, "Bob").await.unwrap().unwrap();
        assert_eq!(updated.assignee.as_deref(), Some("Bob"));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn assign_unknown_case_returns_none() {
        let (db, _dir) = setup_db().await;
        assert!(assign_case(&db, CaseId(999), "Bob").await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn note_round_trips() {
        let (db, _dir) = setup_db().await;

        let (case, _) = resolve_or_create(&db, "U1", "OA-A").await.unwrap();
        let updated = set_case_note(&db, case.id, "VIP customer")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.note.as_deref(), Some("VIP customer"));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_is_newest_first_and_filterable() {
        let (db, _dir) = setup_db().await;

        let (a, _) = resolve_or_create(&db, "U1", "OA-A").await.unwrap();
        let (b, _) = resolve_or_create(&db, "U2", "OA-A").await.unwrap();
        let (c, _) = resolve_or_create(&db, "U3", "OA-B").await.unwrap();
        assign_case(&db, b.id, "Alice").await.unwrap();

        let all = list_cases(&db, &CaseFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
        // Same-millisecond creations fall back to id order, newest first.
        assert_eq!(all[0].id, c.id);
        assert_eq!(all[2].id, a.id);

        let assigned = list_cases(
            &db,
            &CaseFilter {
                status: Some(CaseStatus::Assigned),
                channel_id: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].id, b.id);

        let on_b = list_cases(
            &db,
            &CaseFilter {
                status: None,
                channel_id: Some("OA-B".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(on_b.len(), 1);
        assert_eq!(on_b[0].id, c.id);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reopen_clears_assignee() {
        let (db, _dir) = setup_db().await;

        let (case, _) = resolve_or_create(&db, "U1", "OA-A").await.unwrap();
        assign_case(&db, case.id, "Alice").await.unwrap();
        set_case_status(&db, case.id, CaseStatus::Closed, false)
            .await
            .unwrap();

        let reopened = set_case_status(&db, case.id, CaseStatus::New, true)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reopened.status, CaseStatus::New);
        assert!(reopened.assignee.is_none());

        db.close().await.unwrap();
    }
}
