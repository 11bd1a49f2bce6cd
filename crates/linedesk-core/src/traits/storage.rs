// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage trait for the case registry and conversation log.
//!
//! Storage is an explicit, injected interface with a defined lifecycle
//! (opened at process start, closed at shutdown) -- never ambient state.
//! Implementations must serialize writes so that two concurrent
//! `resolve_or_create_case` calls for the same customer observe each
//! other (the SQLite implementation funnels every write through a single
//! background thread).

use async_trait::async_trait;

use crate::error::LinedeskError;
use crate::traits::adapter::Adapter;
use crate::types::{
    AdminAccount, Case, CaseFilter, CaseId, CaseStatus, DeliveryState, MessageId,
    ReplyTemplate, SenderRole, StoredMessage,
};

/// Persistence operations backing the desk.
#[async_trait]
pub trait DeskStore: Adapter {
    /// Opens the backend: connections, migrations, pragmas.
    async fn initialize(&self) -> Result<(), LinedeskError>;

    /// Closes the backend, flushing pending writes.
    async fn close(&self) -> Result<(), LinedeskError>;

    // --- Case operations ---

    /// Returns the open case for (customer, channel), creating one with
    /// status `new` if none exists. The lookup and insert are atomic
    /// with respect to concurrent calls for the same pair. The boolean
    /// is `true` when a case was created by this call.
    async fn resolve_or_create_case(
        &self,
        customer_id: &str,
        channel_id: &str,
    ) -> Result<(Case, bool), LinedeskError>;

    async fn get_case(&self, id: CaseId) -> Result<Option<Case>, LinedeskError>;

    /// Lists cases newest-first by creation time.
    async fn list_cases(&self, filter: &CaseFilter) -> Result<Vec<Case>, LinedeskError>;

    /// Sets the assignee and moves the case to `assigned`. Returns the
    /// updated case, or `None` if the case does not exist.
    async fn assign_case(
        &self,
        id: CaseId,
        admin: &str,
    ) -> Result<Option<Case>, LinedeskError>;

    /// Replaces the case note. Returns `None` if the case does not exist.
    async fn set_case_note(
        &self,
        id: CaseId,
        note: &str,
    ) -> Result<Option<Case>, LinedeskError>;

    /// Sets the lifecycle status, optionally clearing the assignee.
    /// Returns `None` if the case does not exist.
    async fn set_case_status(
        &self,
        id: CaseId,
        status: CaseStatus,
        clear_assignee: bool,
    ) -> Result<Option<Case>, LinedeskError>;

    // --- Message operations ---

    /// Appends a message with a server-assigned id and timestamp and
    /// returns the stored row. Fails with `UnknownCase` when the case
    /// id does not resolve.
    async fn insert_message(
        &self,
        case_id: CaseId,
        sender: SenderRole,
        body: &str,
        delivery: Option<DeliveryState>,
    ) -> Result<StoredMessage, LinedeskError>;

    /// Messages for a case in persistence order (oldest first).
    async fn messages_for_case(
        &self,
        case_id: CaseId,
        limit: Option<i64>,
    ) -> Result<Vec<StoredMessage>, LinedeskError>;

    /// Newest-first summary slice of a case's messages.
    async fn recent_messages(
        &self,
        case_id: CaseId,
        limit: i64,
    ) -> Result<Vec<StoredMessage>, LinedeskError>;

    /// Updates the delivery flag of an admin message.
    async fn set_message_delivery(
        &self,
        id: MessageId,
        state: DeliveryState,
    ) -> Result<(), LinedeskError>;

    // --- Admin accounts ---

    async fn create_admin(&self, admin: &AdminAccount) -> Result<(), LinedeskError>;

    async fn get_admin(
        &self,
        username: &str,
    ) -> Result<Option<AdminAccount>, LinedeskError>;

    async fn count_admins(&self) -> Result<i64, LinedeskError>;

    // --- Reply templates ---

    async fn list_templates(
        &self,
        channel_id: &str,
    ) -> Result<Vec<ReplyTemplate>, LinedeskError>;

    async fn add_template(
        &self,
        channel_id: &str,
        body: &str,
    ) -> Result<ReplyTemplate, LinedeskError>;
}
