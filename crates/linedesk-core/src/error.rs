// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Linedesk console.

use thiserror::Error;

/// The primary error type used across Linedesk adapter traits and desk operations.
#[derive(Debug, Error)]
pub enum LinedeskError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database unreachable, query failure).
    ///
    /// An operation that fails here has no partial effect: nothing was
    /// persisted and nothing was published.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A referenced case does not exist.
    #[error("case {case_id} not found")]
    CaseNotFound { case_id: i64 },

    /// A message append targeted a case that does not resolve.
    #[error("cannot append: unknown case {case_id}")]
    UnknownCase { case_id: i64 },

    /// Opening a second case for a customer with an open conversation.
    ///
    /// Resolve-or-create prevents this structurally; the variant surfaces
    /// only if an external writer races the open-case unique index.
    #[error("customer {customer_id} already has an open case on channel {channel_id}")]
    DuplicateOpenCase {
        customer_id: String,
        channel_id: String,
    },

    /// Channel adapter errors (webhook payloads, outbound push transport).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LinedeskError {
    /// Wrap an arbitrary error as a storage failure.
    pub fn storage<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(source),
        }
    }
}
