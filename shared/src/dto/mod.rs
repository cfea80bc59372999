//! # Data Transfer Objects (DTOs)
//!
//! ## Module Organization
//!
//! - [`session`] - Sessions and permission levels (what gets persisted)
//! - [`chain`] - Chain directory entries (what the registry serves)
//! - [`transaction`] - Actions, options and signing responses (what providers consume/produce)
//!
//! ## Serialization Format
//!
//! - **Field naming**: camelCase (`#[serde(rename_all = "camelCase")]`)
//! - **Optional fields**: Omitted when `None`
//! - **Bytes**: hex strings (`serializedTransaction`)
//!
//! ## Example JSON
//!
//! ### Stored session list (`eos-transit-sessions-<chainId>`)
//!
//! ```text
//! [
//!   {"chainId":"aca376f2...","provider":"anchor-link","actor":"bob","permission":"active"},
//!   {"chainId":"aca376f2...","provider":"scatter","actor":"alice","permission":"owner"}
//! ]
//! ```
//!
//! ### Signing response
//!
//! ```text
//! {
//!   "signatures": ["SIG_K1_..."],
//!   "serializedTransaction": "e8f5c25e1a2b..."
//! }
//! ```

pub mod chain;
pub mod session;
pub mod transaction;

pub use chain::*;
pub use session::*;
pub use transaction::*;
