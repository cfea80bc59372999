//! # Wallet Library
//!
//! The wallet provider boundary and everything built directly on it:
//!
//! - [`provider`] - the [`WalletProvider`] trait, [`ProviderKind`] and [`ProviderFactory`]
//! - [`registry`] - provider adapters registered for one chain
//! - [`binder`] - resolving a provider id to a connected [`WalletHandle`]
//! - [`codec`] - the packed transaction layout and account name encoding
//! - [`tester`] - sanity checks over a signing response
//! - [`action`] - the demo vote transaction
//!
//! With the `test-utils` feature, [`testing`] provides scripted providers.

pub mod action;
pub mod binder;
pub mod codec;
pub mod error;
pub mod provider;
pub mod registry;
pub mod tester;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export commonly used types
pub use binder::{WalletBinder, WalletHandle};
pub use error::WalletError;
pub use provider::{NetworkConfig, ProviderFactory, ProviderKind, WalletProvider};
pub use registry::ProviderRegistry;
pub use tester::{run_checks, CheckResult};
