//! # Logging
//!
//! Structured logging for the session manager and the maintenance CLI.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tracing::info;
//!
//! // Initialize at startup and keep the guard alive
//! let _guard = multipass::debug::init();
//!
//! // Log with structured fields
//! info!(chain_id = "aca376f2...", actor = "alice", "Session restored");
//! ```
//!
//! ## Configuration
//!
//! Environment variables:
//! - `RUST_LOG`: Log level filter (e.g., `multipass=debug,info`)
//! - `MULTIPASS_LOG_DIR`: Directory for a daily rotated `multipass.log`
//! - `MULTIPASS_LOG_JSON`: Emit JSON lines on stderr (1=on, 0=off)

pub mod config;
pub mod logger;

pub use config::DebugConfig;
pub use logger::init;
