//! # Application Configuration
//!
//! This module manages application configuration loaded from environment variables.
//! All configuration is validated on startup to fail fast if misconfigured.
//!
//! ## Variables
//!
//! | Variable | Default |
//! |---|---|
//! | `MULTIPASS_APP_NAME` | `eos-transit-demo-multipass` |
//! | `MULTIPASS_STORAGE_NAMESPACE` | `eos-transit` |
//! | `MULTIPASS_STORAGE_PATH` | `data/multipass-storage.json` |
//! | `MULTIPASS_DEFAULT_CHAIN_ID` | [`DEFAULT_CHAIN_ID`] |
//! | `MULTIPASS_CHAINS_FILE` | unset (built-in directory) |
//! | `MULTIPASS_SESSION_KEY` | `actor-permission` |
//!
//! ## Global Config Access
//!
//! Use [`core_config()`] to access the global configuration instance:
//!
//! ```rust,no_run
//! use lib_core::config::core_config;
//!
//! let config = core_config();
//! let namespace = &config.storage_namespace;
//! ```
//!
//! The config must be initialized once at application startup using [`init_config()`].

use std::path::PathBuf;
use std::sync::OnceLock;

use lib_utils::{get_env_opt, get_env_or};

use crate::model::store::DedupPolicy;

/// Chain selected when neither the URL nor the environment names one.
pub const DEFAULT_CHAIN_ID: &str = "0db13ab9b321c37c0ba8481cb4681c2788b622c3abfd1f12f0e5353d44ba6e72";

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug)]
pub struct Config {
    /// Name announced to wallet providers when they are set up
    pub app_name: String,

    /// Prefix of every persisted key (`<namespace>-sessions-<chainId>`)
    pub storage_namespace: String,

    /// JSON file backing the durable key/value store
    pub storage_path: PathBuf,

    /// Chain used when the location carries no `chainId` parameter
    pub default_chain_id: String,

    /// Alternate chain directory (JSON array of chain descriptors)
    pub chains_file: Option<PathBuf>,

    /// Which fields identify a session within a chain's list
    pub dedup_policy: DedupPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "eos-transit-demo-multipass".to_string(),
            storage_namespace: "eos-transit".to_string(),
            storage_path: PathBuf::from("data/multipass-storage.json"),
            default_chain_id: DEFAULT_CHAIN_ID.to_string(),
            chains_file: None,
            dedup_policy: DedupPolicy::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let defaults = Config::default();

        let dedup_policy = match get_env_opt("MULTIPASS_SESSION_KEY") {
            Some(value) => value
                .parse()
                .map_err(|e| format!("MULTIPASS_SESSION_KEY is invalid: {}", e))?,
            None => defaults.dedup_policy,
        };

        Ok(Self {
            app_name: get_env_or("MULTIPASS_APP_NAME", &defaults.app_name),
            storage_namespace: get_env_or(
                "MULTIPASS_STORAGE_NAMESPACE",
                &defaults.storage_namespace,
            ),
            storage_path: get_env_opt("MULTIPASS_STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_path),
            default_chain_id: get_env_or("MULTIPASS_DEFAULT_CHAIN_ID", &defaults.default_chain_id),
            chains_file: get_env_opt("MULTIPASS_CHAINS_FILE").map(PathBuf::from),
            dedup_policy,
        })
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.app_name.trim().is_empty() {
            return Err("MULTIPASS_APP_NAME cannot be empty".to_string());
        }

        // Keys are joined with '-' (`<namespace>-sessions-<chainId>`).
        if self.storage_namespace.is_empty() || self.storage_namespace.ends_with('-') {
            return Err(
                "MULTIPASS_STORAGE_NAMESPACE must be non-empty and not end with '-'".to_string(),
            );
        }

        if self.default_chain_id.trim().is_empty() {
            return Err("MULTIPASS_DEFAULT_CHAIN_ID cannot be empty".to_string());
        }

        Ok(())
    }
}

/// Global configuration instance (initialized once at startup).
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Initialize the global configuration.
///
/// # Errors
///
/// Returns an error if:
/// - Environment variables are invalid
/// - Configuration validation fails
/// - Config has already been initialized
pub fn init_config() -> Result<(), String> {
    let config = Config::from_env()?;
    config.validate()?;

    CONFIG
        .set(config)
        .map_err(|_| "Config has already been initialized".to_string())
}

/// Get a reference to the global configuration.
///
/// # Panics
///
/// Panics if [`init_config()`] has not been called yet.
pub fn core_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Config must be initialized with init_config() before use")
}
