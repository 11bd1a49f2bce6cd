// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admin account queries. Passwords arrive here already hashed.

use rusqlite::params;

use linedesk_core::LinedeskError;
use linedesk_core::types::AdminAccount;

use crate::database::{Database, map_tr_err};

/// Create an admin account. The username is unique.
pub async fn create_admin(db: &Database, admin: &AdminAccount) -> Result<(), LinedeskError> {
    let admin = admin.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO admins (username, password_hash, role, created_at)
                 VALUES (?1, ?2, ?3, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))",
                params![admin.username, admin.password_hash, admin.role],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Look up an admin by username.
pub async fn get_admin(
    db: &Database,
    username: &str,
) -> Result<Option<AdminAccount>, LinedeskError> {
    let username = username.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn
                .prepare("SELECT username, password_hash, role FROM admins WHERE username = ?1")?
                .query_row(params![username], |row| {
                    Ok(AdminAccount {
                        username: row.get(0)?,
                        password_hash: row.get(1)?,
                        role: row.get(2)?,
                    })
                });
            match result {
                Ok(admin) => Ok(Some(admin)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Number of admin accounts (drives bootstrap-admin creation).
pub async fn count_admins(db: &Database) -> Result<i64, LinedeskError> {
    db.connection()
        .call(|conn| {
            let n = conn.query_row("SELECT COUNT(*) FROM admins", [], |row| row.get(0))?;
            Ok(n)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_admin(username: &str) -> AdminAccount {
        AdminAccount {
            username: username.to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$hash".to_string(),
            role: "admin".to_string(),
        }
    }

    #[tokio::test]
    async fn create_and_get_admin_round_trips() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("admins.db")).await.unwrap();

        assert_eq!(count_admins(&db).await.unwrap(), 0);
        create_admin(&db, &make_admin("alice")).await.unwrap();

        let admin = get_admin(&db, "alice").await.unwrap().unwrap();
        assert_eq!(admin.username, "alice");
        assert_eq!(admin.role, "admin");
        assert_eq!(count_admins(&db).await.unwrap(), 1);

        assert!(get_admin(&db, "nobody").await.unwrap().is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("dup.db")).await.unwrap();

        create_admin(&db, &make_admin("alice")).await.unwrap();
        let result = create_admin(&db, &make_admin("alice")).await;
        assert!(result.is_err());

        db.close().await.unwrap();
    }
}
