//! # Environment Variables
//!
//! Utilities for reading optional environment variables.

use std::env;

/// Get an environment variable, falling back to `default` when unset or empty.
pub fn get_env_or(name: &'static str, default: &str) -> String {
    get_env_opt(name).unwrap_or_else(|| default.to_string())
}

/// Get an optional environment variable; unset and empty both yield `None`.
pub fn get_env_opt(name: &'static str) -> Option<String> {
    env::var(name).ok().filter(|val| !val.trim().is_empty())
}
