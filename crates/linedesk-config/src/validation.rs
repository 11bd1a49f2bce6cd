// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as valid bind addresses, non-empty paths, and
//! unique account identifiers.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::LinedeskConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &LinedeskConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Validate bind host is not empty and looks like an IP or hostname.
    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!(
                    "server.host `{host}` is not a valid IP address or hostname"
                ),
            });
        }
    }

    // Validate database_path is not empty.
    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    // Validate desk limits.
    if config.desk.history_limit < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "desk.history_limit must be at least 1, got {}",
                config.desk.history_limit
            ),
        });
    }

    if config.desk.bus_capacity < 16 {
        errors.push(ConfigError::Validation {
            message: format!(
                "desk.bus_capacity must be at least 16, got {}",
                config.desk.bus_capacity
            ),
        });
    }

    // Bootstrap admin needs a password.
    if config.auth.bootstrap_admin.is_some() && config.auth.bootstrap_password.is_none() {
        errors.push(ConfigError::Validation {
            message: "auth.bootstrap_password is required when auth.bootstrap_admin is set"
                .to_string(),
        });
    }

    // Validate accounts: unique, non-empty ids; non-empty tokens.
    let mut seen_ids = HashSet::new();
    for (i, account) in config.accounts.iter().enumerate() {
        if account.id.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("accounts[{i}].id must not be empty"),
            });
        }
        if !seen_ids.insert(&account.id) {
            errors.push(ConfigError::Validation {
                message: format!(
                    "duplicate account id `{}` in [[accounts]] array",
                    account.id
                ),
            });
        }
        if account.access_token.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("accounts[{i}].access_token must not be empty"),
            });
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
