use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "gatehouse.toml",
    "config/gatehouse.toml",
    "crates/config/gatehouse.toml",
    "../gatehouse.toml",
    "../config/gatehouse.toml",
];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub identity: IdentityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://gatehouse.db".to_string(),
            max_connections: 10,
        }
    }
}

/// Collection names and optional constraints for the identity stores.
///
/// ```
/// use gatehouse_config::IdentityConfig;
///
/// let identity = IdentityConfig::default();
/// assert_eq!(identity.users_collection, "users");
/// assert_eq!(identity.sessions_collection, "sessions");
/// assert!(!identity.unique_session_tokens);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "IdentityConfig::default_users_collection")]
    pub users_collection: String,
    #[serde(default = "IdentityConfig::default_sessions_collection")]
    pub sessions_collection: String,
    /// Provision a unique index over session tokens so a reused bearer token
    /// is rejected instead of silently shared between users.
    #[serde(default)]
    pub unique_session_tokens: bool,
}

impl IdentityConfig {
    fn default_users_collection() -> String {
        "users".to_string()
    }

    fn default_sessions_collection() -> String {
        "sessions".to_string()
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            users_collection: Self::default_users_collection(),
            sessions_collection: Self::default_sessions_collection(),
            unique_session_tokens: false,
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use gatehouse_config::load;
///
/// std::env::remove_var("GATEHOUSE_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.storage.url.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let mut builder = config::Config::builder();
    builder = builder
        .set_default("storage.url", defaults.storage.url.clone())
        .unwrap()
        .set_default(
            "storage.max_connections",
            i64::from(defaults.storage.max_connections),
        )
        .unwrap()
        .set_default(
            "identity.users_collection",
            defaults.identity.users_collection.clone(),
        )
        .unwrap()
        .set_default(
            "identity.sessions_collection",
            defaults.identity.sessions_collection.clone(),
        )
        .unwrap()
        .set_default(
            "identity.unique_session_tokens",
            defaults.identity.unique_session_tokens,
        )
        .unwrap();

    let environment_overrides = config::Environment::with_prefix("GATEHOUSE").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("GATEHOUSE_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via GATEHOUSE_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    debug!(?config, "loaded gatehouse configuration");
    Ok(config)
}
