//! # Storage
//!
//! Durable key/value backends and the session store layered on them.

// region: --- Modules
pub mod kv;
pub mod session_store;
// endregion: --- Modules

// region: --- Re-exports
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use session_store::{DedupPolicy, SessionStore};
// endregion: --- Re-exports
