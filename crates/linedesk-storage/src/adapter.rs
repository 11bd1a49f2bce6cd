// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the DeskStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use linedesk_config::model::StorageConfig;
use linedesk_core::types::{
    AdapterKind, AdminAccount, Case, CaseFilter, CaseId, CaseStatus, DeliveryState,
    HealthStatus, MessageId, ReplyTemplate, SenderRole, StoredMessage,
};
use linedesk_core::{Adapter, DeskStore, LinedeskError};

use crate::database::Database;
use crate::queries;

/// SQLite-backed desk store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`DeskStore::initialize`].
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given configuration.
    ///
    /// The database connection is not opened until `initialize` is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, LinedeskError> {
        self.db.get().ok_or_else(|| LinedeskError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl Adapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, LinedeskError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LinedeskError> {
        // Shutdown delegates to close if the DB was initialized.
        if let Some(db) = self.db.get() {
            db.close().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl DeskStore for SqliteStore {
    async fn initialize(&self) -> Result<(), LinedeskError> {
        let db =
            Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| LinedeskError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite store initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), LinedeskError> {
        self.db()?.close().await
    }

    // --- Case operations ---

    async fn resolve_or_create_case(
        &self,
        customer_id: &str,
        channel_id: &str,
    ) -> Result<(Case, bool), LinedeskError> {
        queries::cases::resolve_or_create(self.db()?, customer_id, channel_id).await
    }

    async fn get_case(&self, id: CaseId) -> Result<Option<Case>, LinedeskError> {
        queries::cases::get_case(self.db()?, id).await
    }

    async fn list_cases(&self, filter: &CaseFilter) -> Result<Vec<Case>, LinedeskError> {
        queries::cases::list_cases(self.db()?, filter).await
    }

    async fn assign_case(
        &self,
        id: CaseId,
        admin: &str,
    ) -> Result<Option<Case>, LinedeskError> {
        queries::cases::assign_case(self.db()?, id, admin).await
    }

    async fn set_case_note(
        &self,
        id: CaseId,
        note: &str,
    ) -> Result<Option<Case>, LinedeskError> {
        queries::cases::set_case_note(self.db()?, id, note).await
    }

    async fn set_case_status(
        &self,
        id: CaseId,
        status: CaseStatus,
        clear_assignee: bool,
    ) -> Result<Option<Case>, LinedeskError> {
        queries::cases::set_case_status(self.db()?, id, status, clear_assignee).await
    }

    // --- Message operations ---

    async fn insert_message(
        &self,
        case_id: CaseId,
        sender: SenderRole,
        body: &str,
        delivery: Option<DeliveryState>,
    ) -> Result<StoredMessage, LinedeskError> {
        queries::messages::insert_message(self.db()?, case_id, sender, body, delivery).await
    }

    async fn messages_for_case(
        &self,
        case_id: CaseId,
        limit: Option<i64>,
    ) -> Result<Vec<StoredMessage>, LinedeskError> {
        queries::messages::messages_for_case(self.db()?, case_id, limit).await
    }

    async fn recent_messages(
        &self,
        case_id: CaseId,
        limit: i64,
    ) -> Result<Vec<StoredMessage>, LinedeskError> {
        queries::messages::recent_messages(self.db()?, case_id, limit).await
    }

    async fn set_message_delivery(
        &self,
        id: MessageId,
        state: DeliveryState,
    ) -> Result<(), LinedeskError> {
        queries::messages::set_delivery(self.db()?, id, state).await
    }

    // --- Admin accounts ---

    async fn create_admin(&self, admin: &AdminAccount) -> Result<(), LinedeskError> {
        queries::admins::create_admin(self.db()?, admin).await
    }

    async fn get_admin(
        &self,
        username: &str,
    ) -> Result<Option<AdminAccount>, LinedeskError> {
        queries::admins::get_admin(self.db()?, username).await
    }

    async fn count_admins(&self) -> Result<i64, LinedeskError> {
        queries::admins::count_admins(self.db()?).await
    }

    // --- Reply templates ---

    async fn list_templates(
        &self,
        channel_id: &str,
    ) -> Result<Vec<ReplyTemplate>, LinedeskError> {
        queries::templates::list_templates(self.db()?, channel_id).await
    }

    async fn add_template(
        &self,
        channel_id: &str,
        body: &str,
    ) -> Result<ReplyTemplate, LinedeskError> {
        queries::templates::add_template(self.db()?, channel_id, body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn sqlite_store_reports_identity() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("identity.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        assert_eq!(store.name(), "sqlite");
        assert_eq!(store.version(), semver::Version::new(0, 1, 0));
        assert_eq!(store.kind(), AdapterKind::Storage);
    }

    #[tokio::test]
    async fn initialize_opens_database_at_configured_path() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("init_test.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        assert!(db_path.exists(), "database file should be created");
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double_init.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        assert!(store.initialize().await.is_err());
    }

    #[tokio::test]
    async fn health_check_fails_when_not_initialized() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("no_init.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        assert!(store.health_check().await.is_err());
    }

    #[tokio::test]
    async fn health_check_returns_healthy_when_initialized() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("health.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn full_case_lifecycle_through_store() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("lifecycle.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));
        store.initialize().await.unwrap();

        // First contact opens a case.
        let (case, created) = store.resolve_or_create_case("U1", "OA-A").await.unwrap();
        assert!(created);
        assert_eq!(case.status, CaseStatus::New);

        // Messages attach to it.
        let m1 = store
            .insert_message(case.id, SenderRole::Customer, "hello", None)
            .await
            .unwrap();
        let m2 = store
            .insert_message(
                case.id,
                SenderRole::Admin,
                "hi there",
                Some(DeliveryState::Pending),
            )
            .await
            .unwrap();
        assert!(m2.id > m1.id);

        let history = store.messages_for_case(case.id, None).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].sender, SenderRole::Customer);
        assert_eq!(history[1].sender, SenderRole::Admin);

        // Assignment and listing.
        let assigned = store.assign_case(case.id, "Alice").await.unwrap().unwrap();
        assert_eq!(assigned.status, CaseStatus::Assigned);

        let all = store.list_cases(&CaseFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);

        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_runs_checkpoint() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("shutdown.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));
        store.initialize().await.unwrap();

        store.resolve_or_create_case("U1", "OA-A").await.unwrap();
        store.shutdown().await.unwrap();
    }
}
