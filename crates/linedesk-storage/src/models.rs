// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `linedesk-core::types` for use
//! across the storage trait boundary. This module re-exports them for
//! convenience within the storage crate.

pub use linedesk_core::types::{
    AdminAccount, Case, CaseFilter, CaseId, CaseStatus, DeliveryState, MessageId,
    ReplyTemplate, SenderRole, StoredMessage,
};
