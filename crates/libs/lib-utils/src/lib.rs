//! # Utilities Library
//!
//! Shared utility functions for environment variables, query strings, time, and validation.

pub mod envs;
pub mod time;
pub mod url;
pub mod validation;

// Re-export commonly used functions
pub use envs::{get_env_opt, get_env_or};
pub use time::format_time_point_sec;
pub use url::{get_query_param, set_query_param};
pub use validation::{validate_account_name, validate_permission_name};
