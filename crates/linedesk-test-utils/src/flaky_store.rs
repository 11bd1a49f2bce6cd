// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Failure-injecting store wrapper.
//!
//! `FlakyStore` delegates every operation to an inner `DeskStore`, but
//! a switch makes all write operations fail with a storage error. Used
//! to prove the no-publish-without-persist property: an append that
//! fails to persist must produce no realtime notification.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use linedesk_core::types::{
    AdapterKind, AdminAccount, Case, CaseFilter, CaseId, CaseStatus, DeliveryState,
    HealthStatus, MessageId, ReplyTemplate, SenderRole, StoredMessage,
};
use linedesk_core::{Adapter, DeskStore, LinedeskError};

/// Wraps a store; writes fail while the switch is on, reads pass through.
pub struct FlakyStore {
    inner: Arc<dyn DeskStore>,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn new(inner: Arc<dyn DeskStore>) -> Self {
        Self {
            inner,
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), LinedeskError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LinedeskError::Storage {
                source: "injected write failure".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Adapter for FlakyStore {
    fn name(&self) -> &str {
        "flaky-store"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, LinedeskError> {
        self.inner.health_check().await
    }

    async fn shutdown(&self) -> Result<(), LinedeskError> {
        self.inner.shutdown().await
    }
}

#[async_trait]
impl DeskStore for FlakyStore {
    async fn initialize(&self) -> Result<(), LinedeskError> {
        self.inner.initialize().await
    }

    async fn close(&self) -> Result<(), LinedeskError> {
        self.inner.close().await
    }

    async fn resolve_or_create_case(
        &self,
        customer_id: &str,
        channel_id: &str,
    ) -> Result<(Case, bool), LinedeskError> {
        self.check_writable()?;
        self.inner.resolve_or_create_case(customer_id, channel_id).await
    }

    async fn get_case(&self, id: CaseId) -> Result<Option<Case>, LinedeskError> {
        self.inner.get_case(id).await
    }

    async fn list_cases(&self, filter: &CaseFilter) -> Result<Vec<Case>, LinedeskError> {
        self.inner.list_cases(filter).await
    }

    async fn assign_case(
        &self,
        id: CaseId,
        admin: &str,
    ) -> Result<Option<Case>, LinedeskError> {
        self.check_writable()?;
        self.inner.assign_case(id, admin).await
    }

    async fn set_case_note(
        &self,
        id: CaseId,
        note: &str,
    ) -> Result<Option<Case>, LinedeskError> {
        self.check_writable()?;
        self.inner.set_case_note(id, note).await
    }

    async fn set_case_status(
        &self,
        id: CaseId,
        status: CaseStatus,
        clear_assignee: bool,
    ) -> Result<Option<Case>, LinedeskError> {
        self.check_writable()?;
        self.inner.set_case_status(id, status, clear_assignee).await
    }

    async fn insert_message(
        &self,
        case_id: CaseId,
        sender: SenderRole,
        body: &str,
        delivery: Option<DeliveryState>,
    ) -> Result<StoredMessage, LinedeskError> {
        self.check_writable()?;
        self.inner.insert_message(case_id, sender, body, delivery).await
    }

    async fn messages_for_case(
        &self,
        case_id: CaseId,
        limit: Option<i64>,
    ) -> Result<Vec<StoredMessage>, LinedeskError> {
        self.inner.messages_for_case(case_id, limit).await
    }

    async fn recent_messages(
        &self,
        case_id: CaseId,
        limit: i64,
    ) -> Result<Vec<StoredMessage>, LinedeskError> {
        self.inner.recent_messages(case_id, limit).await
    }

    async fn set_message_delivery(
        &self,
        id: MessageId,
        state: DeliveryState,
    ) -> Result<(), LinedeskError> {
        self.check_writable()?;
        self.inner.set_message_delivery(id, state).await
    }

    async fn create_admin(&self, admin: &AdminAccount) -> Result<(), LinedeskError> {
        self.check_writable()?;
        self.inner.create_admin(admin).await
    }

    async fn get_admin(
        &self,
        username: &str,
    ) -> Result<Option<AdminAccount>, LinedeskError> {
        self.inner.get_admin(username).await
    }

    async fn count_admins(&self) -> Result<i64, LinedeskError> {
        self.inner.count_admins().await
    }

    async fn list_templates(
        &self,
        channel_id: &str,
    ) -> Result<Vec<ReplyTemplate>, LinedeskError> {
        self.inner.list_templates(channel_id).await
    }

    async fn add_template(
        &self,
        channel_id: &str,
        body: &str,
    ) -> Result<ReplyTemplate, LinedeskError> {
        self.check_writable()?;
        self.inner.add_template(channel_id, body).await
    }
}
