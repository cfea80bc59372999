//! Logging configuration from environment variables

use std::path::PathBuf;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "multipass=info,warn";

/// Logging configuration
#[derive(Debug, Clone)]
pub struct DebugConfig {
    /// Log level filter (e.g., "multipass=debug,info")
    pub log_level: String,
    /// Directory for the daily rotated log file; no file logging when unset
    pub log_dir: Option<PathBuf>,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_dir: None,
            json: false,
        }
    }
}

impl DebugConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string()),
            log_dir: std::env::var("MULTIPASS_LOG_DIR")
                .ok()
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
            json: std::env::var("MULTIPASS_LOG_JSON")
                .map(|v| v == "1")
                .unwrap_or(false),
        }
    }

    /// Check if debug logging is enabled
    pub fn is_debug_enabled(&self) -> bool {
        self.log_level.contains("debug") || self.log_level.contains("trace")
    }

    pub fn log_file(&self) -> Option<PathBuf> {
        self.log_dir.as_ref().map(|dir| dir.join(LOG_FILE_NAME))
    }
}

/// Base name of the rotated log file.
pub const LOG_FILE_NAME: &str = "multipass.log";
