// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Linedesk console.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Linedesk configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LinedeskConfig {
    /// Console identity and logging settings.
    #[serde(default)]
    pub console: ConsoleConfig,

    /// HTTP/WebSocket server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Desk behavior settings.
    #[serde(default)]
    pub desk: DeskConfig,

    /// Admin authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// LINE Official Accounts the console serves.
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
}

/// Console identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConsoleConfig {
    /// Display name of the console instance.
    #[serde(default = "default_console_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            name: default_console_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_console_name() -> String {
    "linedesk".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP/WebSocket server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8330
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("linedesk").join("linedesk.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("linedesk.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Desk behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeskConfig {
    /// Default number of messages returned by history queries when the
    /// caller gives no limit.
    #[serde(default = "default_history_limit")]
    pub history_limit: i64,

    /// Capacity of each realtime broadcast channel. Slow subscribers
    /// past this many buffered events miss the overwritten ones.
    #[serde(default = "default_bus_capacity")]
    pub bus_capacity: usize,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            bus_capacity: default_bus_capacity(),
        }
    }
}

fn default_history_limit() -> i64 {
    50
}

fn default_bus_capacity() -> usize {
    256
}

/// Admin authentication configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Username of the admin created automatically when the admins
    /// table is empty. `None` disables bootstrap.
    #[serde(default)]
    pub bootstrap_admin: Option<String>,

    /// Password for the bootstrap admin. Required when
    /// `bootstrap_admin` is set.
    #[serde(default)]
    pub bootstrap_password: Option<String>,
}

/// One LINE Official Account served by this console.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AccountConfig {
    /// Channel identifier used in webhook routes and case records.
    pub id: String,

    /// Display name shown in the console.
    #[serde(default)]
    pub name: String,

    /// Channel access token for the Messaging API push endpoint.
    pub access_token: String,
}
