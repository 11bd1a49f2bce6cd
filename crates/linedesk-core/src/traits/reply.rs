// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound reply trait for pushing admin messages back to the customer.

use async_trait::async_trait;

use crate::error::LinedeskError;

/// Pushes a text reply to a customer through the messaging platform.
///
/// The desk calls this after an admin message is durably persisted. A
/// failure here is non-fatal to the stored message: the caller flips the
/// message's delivery flag and surfaces the failure to the admin UI.
/// Implementations must not retry internally.
#[async_trait]
pub trait ReplySender: Send + Sync + 'static {
    /// Sends `body` to `customer_id` through the account identified by
    /// `channel_id`.
    async fn send_text(
        &self,
        channel_id: &str,
        customer_id: &str,
        body: &str,
    ) -> Result<(), LinedeskError>;
}
