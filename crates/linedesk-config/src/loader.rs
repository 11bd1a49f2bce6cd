// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./linedesk.toml` > `~/.config/linedesk/linedesk.toml` > `/etc/linedesk/linedesk.toml`
//! with environment variable overrides via `LINEDESK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::LinedeskConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/linedesk/linedesk.toml` (system-wide)
/// 3. `~/.config/linedesk/linedesk.toml` (user XDG config)
/// 4. `./linedesk.toml` (local directory)
/// 5. `LINEDESK_*` environment variables
pub fn load_config() -> Result<LinedeskConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<LinedeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LinedeskConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LinedeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LinedeskConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(LinedeskConfig::default()))
        .merge(Toml::file("/etc/linedesk/linedesk.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("linedesk/linedesk.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("linedesk.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `LINEDESK_STORAGE_DATABASE_PATH` must
/// map to `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("LINEDESK_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("console_", "console.", 1)
            .replacen("server_", "server.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("desk_", "desk.", 1)
            .replacen("auth_", "auth.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_from_str_applies_overrides_over_defaults() {
        let config = load_config_from_str(
            r#"
[server]
port = 9000

[desk]
history_limit = 10
"#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.desk.history_limit, 10);
        // Untouched sections keep their defaults.
        assert_eq!(config.console.name, "linedesk");
    }

    #[test]
    fn load_from_str_empty_is_all_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.server.port, 8330);
        assert!(config.accounts.is_empty());
    }
}
