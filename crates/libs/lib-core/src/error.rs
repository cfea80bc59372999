//! # Centralized Error Handling
//!
//! This module defines the application-wide error type [`AppError`] used consistently
//! across the store, the wallet layer and the session manager. It follows the
//! `thiserror` pattern for ergonomic error handling.
//!
//! ## Error Categories
//!
//! 1. **Fatal** - the requested transition cannot continue at all
//!    - [`NotFound`](AppError::NotFound) - unknown chain or wallet provider
//!    - [`Config`](AppError::Config) - invalid configuration or provider setup
//!
//! 2. **Provider boundary** - logged, transition aborted, prior state preserved
//!    - [`ConnectionFailed`](AppError::ConnectionFailed)
//!    - [`LoginFailed`](AppError::LoginFailed)
//!    - [`LogoutFailed`](AppError::LogoutFailed)
//!    - [`TransactionFailed`](AppError::TransactionFailed)
//!    - [`NotAuthenticated`](AppError::NotAuthenticated)
//!
//! 3. **Storage** - absorbed inside the session store, never propagated past it
//!    - [`StorageCorrupt`](AppError::StorageCorrupt) - malformed persisted JSON
//!    - [`Storage`](AppError::Storage) - backend I/O failure
//!
//! 4. **Usage** - caller asked for something the current state cannot do
//!    - [`State`](AppError::State), [`InvalidInput`](AppError::InvalidInput), [`Internal`](AppError::Internal)
//!
//! ## Usage Example
//!
//! ```rust
//! use lib_core::error::{AppError, Result};
//!
//! fn require_chain(chain_id: &str) -> Result<()> {
//!     if chain_id.is_empty() {
//!         return Err(AppError::InvalidInput("chain id cannot be empty".to_string()));
//!     }
//!     Ok(())
//! }
//!
//! assert!(require_chain("").is_err());
//! ```

use thiserror::Error;

/// Convenience type alias for `Result<T, AppError>`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application-wide error type covering all error scenarios.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error during startup, chain directory loading or provider setup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown chain id or wallet provider identifier.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Provider could not establish a connection to its wallet.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Provider login was rejected or returned an unusable identity.
    #[error("Login failed: {0}")]
    LoginFailed(String),

    /// Provider logout failed.
    #[error("Logout failed: {0}")]
    LogoutFailed(String),

    /// Signing was rejected or failed inside the provider.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// A wallet operation needed a logged-in identity.
    #[error("Not authenticated: {0}")]
    NotAuthenticated(String),

    /// Persisted data could not be parsed.
    #[error("Storage corrupt: {0}")]
    StorageCorrupt(String),

    /// Storage backend failure (I/O).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Operation not valid in the current application state.
    #[error("State error: {0}")]
    State(String),

    /// Invalid caller input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unexpected failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the error must be surfaced to the caller instead of being
    /// absorbed. Continuing without a valid chain or provider set is meaningless.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::NotFound(_) | AppError::Config(_))
    }

    /// Stable error code, used as a structured log field.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "Config",
            AppError::NotFound(_) => "NotFound",
            AppError::ConnectionFailed(_) => "ConnectionFailed",
            AppError::LoginFailed(_) => "LoginFailed",
            AppError::LogoutFailed(_) => "LogoutFailed",
            AppError::TransactionFailed(_) => "TransactionFailed",
            AppError::NotAuthenticated(_) => "NotAuthenticated",
            AppError::StorageCorrupt(_) => "StorageCorrupt",
            AppError::Storage(_) => "Storage",
            AppError::State(_) => "State",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::Internal(_) => "Internal",
        }
    }

    /// Get a user-friendly error message.
    ///
    /// For storage and internal errors, returns a generic message to avoid
    /// exposing implementation details.
    pub fn user_message(&self) -> String {
        match self {
            AppError::NotFound(msg)
            | AppError::InvalidInput(msg)
            | AppError::State(msg)
            | AppError::ConnectionFailed(msg)
            | AppError::LoginFailed(msg)
            | AppError::LogoutFailed(msg)
            | AppError::TransactionFailed(msg)
            | AppError::NotAuthenticated(msg) => msg.clone(),
            AppError::Config(_) => "The application is misconfigured".to_string(),
            AppError::StorageCorrupt(_) | AppError::Storage(_) | AppError::Internal(_) => {
                "An internal error occurred".to_string()
            }
        }
    }
}

/// Convert `serde_json::Error` to `AppError`.
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::StorageCorrupt(format!("JSON error: {}", err))
    }
}

/// Convert `std::io::Error` to `AppError`.
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(format!("I/O error: {}", err))
    }
}
