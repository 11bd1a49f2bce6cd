// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Linedesk configuration system.

use linedesk_config::diagnostic::{ConfigError, suggest_key};
use linedesk_config::model::LinedeskConfig;
use linedesk_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_linedesk_config() {
    let toml = r#"
[console]
name = "support-desk"
log_level = "debug"

[server]
host = "0.0.0.0"
port = 9000

[storage]
database_path = "/tmp/desk.db"
wal_mode = false

[desk]
history_limit = 25
bus_capacity = 64

[auth]
bootstrap_admin = "root"
bootstrap_password = "changeme"

[[accounts]]
id = "OA-A"
name = "Main OA"
access_token = "token-a"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.console.name, "support-desk");
    assert_eq!(config.console.log_level, "debug");
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.storage.database_path, "/tmp/desk.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.desk.history_limit, 25);
    assert_eq!(config.desk.bus_capacity, 64);
    assert_eq!(config.auth.bootstrap_admin.as_deref(), Some("root"));
    assert_eq!(config.accounts.len(), 1);
    assert_eq!(config.accounts[0].id, "OA-A");
}

/// Unknown field in [server] section produces an UnknownField error.
#[test]
fn unknown_field_in_server_produces_error() {
    let toml = r#"
[server]
prot = 9000
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("prot"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.console.name, "linedesk");
    assert_eq!(config.console.log_level, "info");
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8330);
    assert!(config.storage.wal_mode);
    assert_eq!(config.desk.history_limit, 50);
    assert!(config.accounts.is_empty());
    assert!(config.auth.bootstrap_admin.is_none());
}

/// Env-style override merges over TOML values.
#[test]
fn override_wins_over_toml_value() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let toml_content = r#"
[console]
name = "from-toml"
"#;

    let config: LinedeskConfig = Figment::new()
        .merge(Serialized::defaults(LinedeskConfig::default()))
        .merge(Toml::string(toml_content))
        .merge(("console.name", "from-env"))
        .extract()
        .expect("should merge override");

    assert_eq!(config.console.name, "from-env");
}

/// load_and_validate_str rejects configs that deserialize but fail
/// semantic validation.
#[test]
fn validation_errors_are_collected() {
    let toml = r#"
[storage]
database_path = ""

[desk]
history_limit = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert_eq!(errors.len(), 2);
    assert!(errors
        .iter()
        .all(|e| matches!(e, ConfigError::Validation { .. })));
}

/// Typos in config keys produce a "did you mean" suggestion.
#[test]
fn typo_produces_suggestion() {
    let errors = load_and_validate_str("[desk]\nhistroy_limit = 10\n")
        .expect_err("typo should be rejected");
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::UnknownKey { suggestion, .. }
            if suggestion.as_deref() == Some("history_limit")
    )));
}

/// suggest_key is exposed for reuse and behaves as documented.
#[test]
fn suggest_key_threshold_filters_noise() {
    assert_eq!(
        suggest_key("acces_token", &["id", "name", "access_token"]),
        Some("access_token".to_string())
    );
    assert_eq!(suggest_key("qqqq", &["id", "name", "access_token"]), None);
}
