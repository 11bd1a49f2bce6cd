// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-writer documentation and enforcement.
//!
//! All writes in linedesk-storage are serialized through `tokio-rusqlite`'s
//! single background thread. The `Database` struct IS the single writer.
//! Query modules accept `&Database` and call through `connection().call()`.
//!
//! This is what makes `resolve_or_create` safe: the lookup and insert
//! run inside one closure, so two concurrent webhook deliveries for the
//! same customer are queued behind each other and the second sees the
//! first's case.
//!
//! **Do NOT create additional Connection instances for writes.**
