// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Linedesk integration tests.

pub mod flaky_store;
pub mod harness;
pub mod mock_reply;

pub use flaky_store::FlakyStore;
pub use harness::TestDesk;
pub use mock_reply::{MockReplySender, SentReply};
