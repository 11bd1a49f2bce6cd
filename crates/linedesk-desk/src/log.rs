// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The conversation log: durable, ordered, append-only message storage
//! per case, with realtime fan-out.
//!
//! `append` holds the case's critical section across persist+publish.
//! The publish happens only after the insert succeeds, so nothing a
//! subscriber sees as "sent" can be missing from storage, and per-case
//! delivery order always equals persistence order.

use std::sync::Arc;

use tracing::debug;

use linedesk_bus::{DeskEvent, EventBus};
use linedesk_core::types::{CaseId, DeliveryState, MessageId, SenderRole, StoredMessage};
use linedesk_core::{DeskStore, LinedeskError};

use crate::locks::CaseLocks;

pub struct ConversationLog {
    store: Arc<dyn DeskStore>,
    bus: Arc<EventBus>,
    locks: Arc<CaseLocks>,
}

impl ConversationLog {
    pub fn new(store: Arc<dyn DeskStore>, bus: Arc<EventBus>, locks: Arc<CaseLocks>) -> Self {
        Self { store, bus, locks }
    }

    /// Append a message to a case's log and notify its subscribers.
    ///
    /// Fails with `UnknownCase` when the case id does not resolve, and
    /// with `Storage` when persistence fails -- in both situations no
    /// event is published. Admin messages start with a `pending`
    /// delivery flag; customer messages carry none.
    pub async fn append(
        &self,
        case_id: CaseId,
        sender: SenderRole,
        body: &str,
    ) -> Result<StoredMessage, LinedeskError> {
        let _guard = self.locks.acquire(case_id).await;

        let delivery = match sender {
            SenderRole::Admin => Some(DeliveryState::Pending),
            SenderRole::Customer => None,
        };
        let message = self
            .store
            .insert_message(case_id, sender, body, delivery)
            .await?;

        debug!(case_id = %case_id, message_id = %message.id, %sender, "message appended");
        self.bus.publish_case(
            case_id,
            DeskEvent::MessageAppended {
                message: message.clone(),
            },
        );
        Ok(message)
    }

    /// Chronological history of a case, oldest first. Repeating the
    /// call with no intervening append yields identical results.
    pub async fn history(
        &self,
        case_id: CaseId,
        limit: Option<i64>,
    ) -> Result<Vec<StoredMessage>, LinedeskError> {
        self.ensure_case(case_id).await?;
        self.store.messages_for_case(case_id, limit).await
    }

    /// Newest-first summary slice, a distinct operation from `history`.
    pub async fn recent(
        &self,
        case_id: CaseId,
        limit: i64,
    ) -> Result<Vec<StoredMessage>, LinedeskError> {
        self.ensure_case(case_id).await?;
        self.store.recent_messages(case_id, limit).await
    }

    /// Record the outcome of an outbound push attempt on an admin
    /// message. A `failed` outcome is surfaced to the case's
    /// subscribers as a distinct event.
    pub async fn mark_delivery(
        &self,
        case_id: CaseId,
        message_id: MessageId,
        state: DeliveryState,
    ) -> Result<(), LinedeskError> {
        self.store.set_message_delivery(message_id, state).await?;
        if state == DeliveryState::Failed {
            self.bus.publish_case(
                case_id,
                DeskEvent::DeliveryFailed {
                    case_id,
                    message_id,
                },
            );
        }
        Ok(())
    }

    async fn ensure_case(&self, case_id: CaseId) -> Result<(), LinedeskError> {
        match self.store.get_case(case_id).await? {
            Some(_) => Ok(()),
            None => Err(LinedeskError::CaseNotFound { case_id: case_id.0 }),
        }
    }
}
