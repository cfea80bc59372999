//! # Multipass
//!
//! Concurrent blockchain sessions bound to wallet providers.
//!
//! A session is one account (`actor@permission`) on one chain, logged in
//! through one wallet provider. Any number of sessions can be stored per
//! chain; exactly one (or none) is active and bound to a live wallet at a
//! time. Sessions persist across restarts and the most recent one is
//! restored when its chain is selected.
//!
//! ## Crates
//!
//! ```text
//! multipass (this crate)   SessionManager state machine, logging, CLI
//!   ├── lib-wallet         provider boundary, binder, codec, tester
//!   ├── lib-core           config, errors, chain directory, session store
//!   ├── lib-utils          env, query string, name validation, time
//!   └── shared             DTOs
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! let (tx, rx) = async_channel::unbounded();
//! let store = SessionStore::new(backend, "eos-transit", DedupPolicy::default());
//! let manager = SessionManager::new(core_config(), ChainRegistry::builtin()?, store, factory, tx)
//!     .with_query("?chainId=aca376f2...");
//!
//! manager.start().await?;
//! manager.add_account("anchor-link").await?;
//! let response = manager.sign_test_transaction().await?;
//! ```

pub mod app;
pub mod cli;
pub mod debug;

// Re-export commonly used types for convenience
pub use app::{AppEvent, AppSnapshot, ApplicationState, Phase, SessionManager, Transition};
pub use lib_core::{AppError, Result};
