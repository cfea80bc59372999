//! # Model Layer
//!
//! The chain directory and session persistence.

// region: --- Modules
pub mod chain;
pub mod store;
// endregion: --- Modules
