// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed realtime event bus for the Linedesk console.
//!
//! Two kinds of streams, resolving the usual dashboard ambiguity of
//! "broadcast everything to everyone" versus per-conversation rooms:
//!
//! - a **desk stream** every connected admin receives: case lifecycle
//!   events (opened, assigned, closed, reopened, note updated);
//! - a **per-case stream** admins subscribe to explicitly: message
//!   traffic and delivery failures for that case only.
//!
//! Events are published only after the corresponding row is durably
//! persisted; the publisher holds the per-case critical section across
//! persist+publish, so subscribers observe each case's messages in
//! persistence order. Delivery to currently-connected subscribers is
//! best-effort beyond the channel capacity: a receiver that lags more
//! than `capacity` events misses the overwritten ones (`Lagged`).

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

use linedesk_core::types::{Case, CaseId, MessageId, StoredMessage};

/// An event visible to connected admin sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeskEvent {
    /// A case was created for a first-contact customer.
    CaseOpened { case: Case },
    /// A case was (re)assigned to an admin.
    CaseAssigned { case: Case },
    /// A case was closed.
    CaseClosed { case: Case },
    /// A closed case was explicitly reopened.
    CaseReopened { case: Case },
    /// The free-text note on a case changed.
    NoteUpdated { case: Case },
    /// A message was appended to a case's conversation log.
    MessageAppended { message: StoredMessage },
    /// Outbound push of an admin message failed after persistence.
    DeliveryFailed {
        case_id: CaseId,
        message_id: MessageId,
    },
}

/// In-process publish/subscribe fan-out to admin sessions.
///
/// Cheap to clone via `Arc`; per-case channels are created lazily on
/// first use and live for the process lifetime (cases are never
/// deleted, and an idle sender is two machine words).
pub struct EventBus {
    desk: broadcast::Sender<DeskEvent>,
    cases: DashMap<i64, broadcast::Sender<DeskEvent>>,
    capacity: usize,
}

impl EventBus {
    /// Create a bus whose channels buffer `capacity` events per receiver.
    pub fn new(capacity: usize) -> Self {
        let (desk, _) = broadcast::channel(capacity);
        Self {
            desk,
            cases: DashMap::new(),
            capacity,
        }
    }

    /// Subscribe to the desk-wide lifecycle stream.
    pub fn subscribe_desk(&self) -> broadcast::Receiver<DeskEvent> {
        self.desk.subscribe()
    }

    /// Subscribe to one case's message stream.
    pub fn subscribe_case(&self, case_id: CaseId) -> broadcast::Receiver<DeskEvent> {
        self.case_sender(case_id).subscribe()
    }

    /// Publish a lifecycle event to every connected admin.
    pub fn publish_desk(&self, event: DeskEvent) {
        // Send only fails when there are no receivers, which is fine:
        // realtime delivery is fan-out, never durability.
        let delivered = self.desk.send(event).unwrap_or(0);
        trace!(delivered, "desk event published");
    }

    /// Publish a message-traffic event to one case's subscribers.
    pub fn publish_case(&self, case_id: CaseId, event: DeskEvent) {
        let delivered = self.case_sender(case_id).send(event).unwrap_or(0);
        trace!(case_id = %case_id, delivered, "case event published");
    }

    fn case_sender(&self, case_id: CaseId) -> broadcast::Sender<DeskEvent> {
        self.cases
            .entry(case_id.0)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }
}
