//! Wallet boundary errors.

use lib_core::AppError;
use thiserror::Error;

use crate::codec::CodecError;

/// Failures raised at the wallet provider boundary.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("wallet provider '{0}' is not available")]
    ProviderNotFound(String),

    #[error("provider setup failed: {0}")]
    Setup(String),

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("login failed: {0}")]
    LoginFailed(String),

    #[error("logout failed: {0}")]
    LogoutFailed(String),

    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    #[error("no identity is logged in on provider '{0}'")]
    NotAuthenticated(String),

    #[error("transaction decode failed: {0}")]
    Decode(#[from] CodecError),
}

impl From<WalletError> for AppError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::ProviderNotFound(id) => {
                AppError::NotFound(format!("wallet provider {}", id))
            }
            WalletError::Setup(msg) => AppError::Config(msg),
            WalletError::ConnectionFailed(msg) => AppError::ConnectionFailed(msg),
            WalletError::LoginFailed(msg) => AppError::LoginFailed(msg),
            WalletError::LogoutFailed(msg) => AppError::LogoutFailed(msg),
            WalletError::TransactionFailed(msg) => AppError::TransactionFailed(msg),
            WalletError::NotAuthenticated(provider) => {
                AppError::NotAuthenticated(format!(
                    "provider {} has no logged-in identity",
                    provider
                ))
            }
            WalletError::Decode(e) => AppError::InvalidInput(e.to_string()),
        }
    }
}
