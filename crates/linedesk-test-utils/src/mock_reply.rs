// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock reply sender for deterministic testing.
//!
//! `MockReplySender` implements `ReplySender`, capturing every push for
//! assertion and optionally failing on demand to exercise the
//! delivery-failure path.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use linedesk_core::{LinedeskError, ReplySender};

/// One captured outbound push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentReply {
    pub channel_id: String,
    pub customer_id: String,
    pub body: String,
}

/// A reply sender that records pushes instead of performing them.
#[derive(Default)]
pub struct MockReplySender {
    sent: Mutex<Vec<SentReply>>,
    fail: AtomicBool,
}

impl MockReplySender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent sends fail (or succeed again).
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Everything sent so far, in order.
    pub fn sent(&self) -> Vec<SentReply> {
        self.sent.lock().expect("mock lock poisoned").clone()
    }

    /// Number of captured pushes.
    pub fn sent_count(&self) -> usize {
        self.sent.lock().expect("mock lock poisoned").len()
    }
}

#[async_trait]
impl ReplySender for MockReplySender {
    async fn send_text(
        &self,
        channel_id: &str,
        customer_id: &str,
        body: &str,
    ) -> Result<(), LinedeskError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(LinedeskError::Channel {
                message: "mock push failure".to_string(),
                source: None,
            });
        }
        self.sent.lock().expect("mock lock poisoned").push(SentReply {
            channel_id: channel_id.to_string(),
            customer_id: customer_id.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
