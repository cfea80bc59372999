//! # Application Events
//!
//! Events published by the session manager over an `async_channel`.

use std::fmt;

use super::state::AppSnapshot;

/// State machine transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Configure,
    SwitchChain,
    AddAccount,
    UseSession,
    RemoveSession,
    Transact,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Transition::Configure => "configure",
            Transition::SwitchChain => "switch_chain",
            Transition::AddAccount => "add_account",
            Transition::UseSession => "use_session",
            Transition::RemoveSession => "remove_session",
            Transition::Transact => "transact",
        };
        f.write_str(name)
    }
}

/// Events for application observers
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A transition committed new state
    StateChanged(AppSnapshot),
    /// A transition failed; prior state is preserved unless noted otherwise
    TransitionFailed {
        transition: Transition,
        code: &'static str,
        message: String,
    },
}
