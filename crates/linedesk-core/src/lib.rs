// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Linedesk console.
//!
//! This crate provides the foundational trait definitions, error types,
//! and domain types used throughout the Linedesk workspace. The storage
//! backend and outbound channel plug in through traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::LinedeskError;
pub use traits::{Adapter, DeskStore, ReplySender};
pub use types::{
    AdapterKind, AdminAccount, Case, CaseFilter, CaseId, CaseStatus, DeliveryState,
    HealthStatus, InboundEvent, MessageId, ReplyTemplate, SenderRole, StoredMessage,
};
