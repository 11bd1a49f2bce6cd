// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Desk test harness: a real SQLite store on a temp directory, wrapped
//! in a `FlakyStore` for failure injection, wired to a fresh bus and a
//! mock reply sender.

use std::sync::Arc;

use tempfile::TempDir;

use linedesk_bus::EventBus;
use linedesk_config::model::StorageConfig;
use linedesk_core::types::InboundEvent;
use linedesk_core::{DeskStore, ReplySender};
use linedesk_desk::Desk;
use linedesk_storage::SqliteStore;

use crate::flaky_store::FlakyStore;
use crate::mock_reply::MockReplySender;

/// A fully wired desk over throwaway storage.
pub struct TestDesk {
    pub desk: Arc<Desk>,
    pub bus: Arc<EventBus>,
    pub store: Arc<FlakyStore>,
    pub reply: Arc<MockReplySender>,
    _tmp: TempDir,
}

impl TestDesk {
    /// Build and initialize a desk against a fresh temp database.
    pub async fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let sqlite = Arc::new(SqliteStore::new(StorageConfig {
            database_path: tmp
                .path()
                .join("testdesk.db")
                .to_string_lossy()
                .into_owned(),
            wal_mode: true,
        }));
        let store = Arc::new(FlakyStore::new(sqlite));
        store.initialize().await.expect("initialize storage");

        let bus = Arc::new(EventBus::new(64));
        let reply = Arc::new(MockReplySender::new());
        let desk = Arc::new(Desk::new(
            Arc::clone(&store) as Arc<dyn DeskStore>,
            Arc::clone(&bus),
            Arc::clone(&reply) as Arc<dyn ReplySender>,
        ));

        Self {
            desk,
            bus,
            store,
            reply,
            _tmp: tmp,
        }
    }

    /// Convenience constructor for inbound webhook events.
    pub fn inbound(customer: &str, channel: &str, body: &str) -> InboundEvent {
        InboundEvent {
            customer_id: customer.to_string(),
            channel_id: channel.to_string(),
            body: body.to_string(),
            received_at: "2026-01-01T00:00:00.000Z".to_string(),
        }
    }
}
