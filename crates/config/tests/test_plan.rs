//! Test plan for the `gatehouse-config` crate.
//!
//! These tests exercise the configuration loader across default handling,
//! file discovery, and environment overrides.

use std::fs;

use serial_test::serial;
use tempfile::TempDir;

use gatehouse_config::{load, AppConfig};

const ENV_VARS_TO_RESET: &[&str] = &[
    "GATEHOUSE_CONFIG",
    "GATEHOUSE__STORAGE__URL",
    "GATEHOUSE__STORAGE__MAX_CONNECTIONS",
    "GATEHOUSE__IDENTITY__USERS_COLLECTION",
    "GATEHOUSE__IDENTITY__SESSIONS_COLLECTION",
    "GATEHOUSE__IDENTITY__UNIQUE_SESSION_TOKENS",
];

fn reset_environment() {
    for var in ENV_VARS_TO_RESET {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn load_returns_defaults_without_file_or_environment() {
    reset_environment();

    let config = load().expect("defaults should load");
    let defaults = AppConfig::default();

    assert_eq!(config.storage.url, defaults.storage.url);
    assert_eq!(config.storage.max_connections, defaults.storage.max_connections);
    assert_eq!(config.identity.users_collection, "users");
    assert_eq!(config.identity.sessions_collection, "sessions");
    assert!(!config.identity.unique_session_tokens);
}

#[test]
#[serial]
fn explicit_config_file_overrides_defaults() {
    reset_environment();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gatehouse.toml");
    fs::write(
        &path,
        r#"
[storage]
url = "sqlite://identity/store.db"
max_connections = 3

[identity]
users_collection = "accounts"
unique_session_tokens = true
"#,
    )
    .unwrap();

    std::env::set_var("GATEHOUSE_CONFIG", &path);
    let config = load().expect("file-backed configuration should load");
    std::env::remove_var("GATEHOUSE_CONFIG");

    assert_eq!(config.storage.url, "sqlite://identity/store.db");
    assert_eq!(config.storage.max_connections, 3);
    assert_eq!(config.identity.users_collection, "accounts");
    // Unset keys keep their defaults.
    assert_eq!(config.identity.sessions_collection, "sessions");
    assert!(config.identity.unique_session_tokens);
}

#[test]
#[serial]
fn environment_overrides_take_precedence() {
    reset_environment();

    std::env::set_var("GATEHOUSE__STORAGE__URL", "sqlite://env.db");
    std::env::set_var("GATEHOUSE__IDENTITY__SESSIONS_COLLECTION", "tickets");
    let config = load().expect("environment overrides should load");
    reset_environment();

    assert_eq!(config.storage.url, "sqlite://env.db");
    assert_eq!(config.identity.sessions_collection, "tickets");
}
