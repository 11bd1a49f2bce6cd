// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LINE Messaging API channel adapter for the Linedesk console.
//!
//! Two halves: [`event`] maps verified webhook envelopes into the desk's
//! inbound events, and [`push`] sends admin replies back to customers
//! through the push endpoint. Webhook signature verification happens
//! upstream of this crate (a verifying front adapter is assumed) and is
//! deliberately not re-implemented here.

pub mod event;
pub mod push;

pub use event::{WebhookEnvelope, text_events};
pub use push::LinePush;
