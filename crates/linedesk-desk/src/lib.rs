// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The desk core: case registry plus conversation log.
//!
//! Control flow, both directions, is registry-first: an inbound webhook
//! event or an outbound admin action resolves its case through the
//! [`CaseRegistry`], appends through the [`ConversationLog`], and only
//! then notifies subscribed admin sessions. [`Desk`] composes the two
//! and owns the outbound reply path.

pub mod locks;
pub mod log;
pub mod registry;

use std::sync::Arc;

use tracing::warn;

use linedesk_bus::EventBus;
use linedesk_core::types::{Case, CaseId, DeliveryState, InboundEvent, SenderRole, StoredMessage};
use linedesk_core::{DeskStore, LinedeskError, ReplySender};

pub use locks::CaseLocks;
pub use log::ConversationLog;
pub use registry::CaseRegistry;

/// The composed desk: one registry, one log, one outbound channel.
pub struct Desk {
    registry: CaseRegistry,
    log: ConversationLog,
    reply_sender: Arc<dyn ReplySender>,
}

impl Desk {
    pub fn new(
        store: Arc<dyn DeskStore>,
        bus: Arc<EventBus>,
        reply_sender: Arc<dyn ReplySender>,
    ) -> Self {
        let locks = Arc::new(CaseLocks::new());
        Self {
            registry: CaseRegistry::new(
                Arc::clone(&store),
                Arc::clone(&bus),
                Arc::clone(&locks),
            ),
            log: ConversationLog::new(store, bus, locks),
            reply_sender,
        }
    }

    pub fn registry(&self) -> &CaseRegistry {
        &self.registry
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    /// Handle one verified inbound customer message: resolve or create
    /// the case, append, notify. Returns the case and the stored message.
    pub async fn ingest(
        &self,
        event: &InboundEvent,
    ) -> Result<(Case, StoredMessage), LinedeskError> {
        let case = self
            .registry
            .resolve_or_create(&event.customer_id, &event.channel_id)
            .await?;
        let message = self
            .log
            .append(case.id, SenderRole::Customer, &event.body)
            .await?;
        Ok((case, message))
    }

    /// Handle an admin reply: append first, then push to the customer.
    ///
    /// The push happens only after the message is durably persisted. A
    /// push failure is non-fatal: the message keeps its row, the
    /// delivery flag flips to `failed`, and the case's subscribers get a
    /// `DeliveryFailed` event. The returned message carries the final
    /// flag so the admin UI can render the outcome.
    pub async fn reply(
        &self,
        case_id: CaseId,
        body: &str,
    ) -> Result<StoredMessage, LinedeskError> {
        let case = self
            .registry
            .get(case_id)
            .await?
            .ok_or(LinedeskError::UnknownCase { case_id: case_id.0 })?;

        let mut message = self.log.append(case_id, SenderRole::Admin, body).await?;

        let outcome = match self
            .reply_sender
            .send_text(&case.channel_id, &case.customer_id, body)
            .await
        {
            Ok(()) => DeliveryState::Sent,
            Err(e) => {
                warn!(case_id = %case_id, message_id = %message.id, error = %e,
                    "outbound push failed; message stays persisted");
                DeliveryState::Failed
            }
        };
        self.log.mark_delivery(case_id, message.id, outcome).await?;
        message.delivery = Some(outcome);
        Ok(message)
    }
}
