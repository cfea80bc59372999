//! # Shared Data Transfer Objects Library
//!
//! This library defines the values exchanged between the session manager, the
//! session store and the wallet provider boundary. Everything that is persisted
//! or handed to a provider lives here.
//!
//! ## Structure
//!
//! - **[`dto`]**: Data Transfer Objects
//!   - **[`dto::session`]**: Sessions and the `(actor, permission)` identity
//!   - **[`dto::chain`]**: Chain directory entries and RPC endpoints
//!   - **[`dto::transaction`]**: Actions, transact options and signing responses
//! - **[`utils`]**: Shared display helpers
//!
//! ## Wire Format
//!
//! Persisted and provider-facing records serialize to JSON with **camelCase**
//! field names, matching the keys written by browser clients:
//!
//! ```text
//! {"chainId":"aca376f2...","provider":"anchor-link","actor":"alice","permission":"active"}
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use shared::dto::session::{PermissionLevel, Session};
//!
//! let identity = PermissionLevel::new("alice", "active");
//! let session = Session::from_identity("aca376f2", "anchor-link", identity);
//! assert_eq!(session.to_string(), "alice@active (anchor-link)");
//! ```

pub mod dto;
pub mod utils;

// Re-export commonly used types for convenience
// Note: Wildcard re-exports are used here since shared is a DTO library
// where all exports are meant to be public API
pub use dto::*;
pub use utils::*;
