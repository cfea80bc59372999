//! # Core Library
//!
//! Configuration, errors, the chain directory and session persistence.

pub mod config;
pub mod error;
pub mod model;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
pub use model::chain::ChainRegistry;
pub use model::store::{DedupPolicy, FileStore, KeyValueStore, MemoryStore, SessionStore};
