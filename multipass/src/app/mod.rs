//! # Application
//!
//! The session manager and the state it owns.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  SessionManager                                          │
//! │  - configure / add_account / use_session / ...           │
//! │  - one transition ticket per call, stale results dropped │
//! └───────┬──────────────────────┬───────────────────────────┘
//!         │                      │
//!         ▼                      ▼
//! ┌────────────────────┐  ┌───────────────────────────────┐
//! │ State              │  │ WalletBinder → WalletProvider │
//! │ Arc<RwLock<..>>    │  │ (awaited without the lock)    │
//! └───────┬────────────┘  └───────────────────────────────┘
//!         │ async_channel (unbounded)
//!         ▼
//!   AppEvent::StateChanged / TransitionFailed
//! ```
//!
//! The state lock is held only to read inputs and to commit; it is never held
//! across a provider call.

pub mod events;
pub mod manager;
pub mod state;

pub use events::{AppEvent, Transition};
pub use manager::{initial_chain_id, SessionManager, CHAIN_ID_PARAM};
pub use state::{AppSnapshot, ApplicationState, Phase};
