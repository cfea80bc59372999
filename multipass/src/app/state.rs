//! # Application State Types
//!
//! The shared state the session manager mutates, and the immutable snapshot
//! published after every committed transition.

use lib_wallet::{ProviderKind, WalletHandle};
use serde::Serialize;
use shared::dto::chain::ChainInfo;
use shared::dto::session::{PermissionLevel, Session};
use shared::dto::transaction::SigningResponse;

/// Lifecycle phase, derived from the state fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// No chain selected yet
    Unconfigured,
    /// Chain selected, most recent session being restored
    Configuring,
    /// Chain selected, no active session
    Idle,
    /// A session is active with a bound wallet
    Active,
    /// The active wallet is signing
    Transacting,
}

/// Application state behind the manager's lock.
#[derive(Debug, Default)]
pub struct ApplicationState {
    pub chain_id: Option<String>,
    pub chain: Option<ChainInfo>,
    pub configuring: bool,
    /// Ticket of the configure that set `configuring`
    pub configure_ticket: u64,
    pub session: Option<Session>,
    pub sessions: Vec<Session>,
    pub wallet: Option<WalletHandle>,
    pub transacting: bool,
    /// Ticket of the transaction that set `transacting`
    pub transact_ticket: u64,
    pub response: Option<SigningResponse>,
    /// Location query string, e.g. `?chainId=...`
    pub query: String,
}

impl ApplicationState {
    pub fn phase(&self) -> Phase {
        if self.chain.is_none() {
            Phase::Unconfigured
        } else if self.configuring {
            Phase::Configuring
        } else if self.transacting {
            Phase::Transacting
        } else if self.session.is_some() {
            Phase::Active
        } else {
            Phase::Idle
        }
    }

    /// Check the wallet/session binding rules.
    pub fn check_invariants(&self) -> Result<(), String> {
        match (&self.session, &self.wallet) {
            (None, Some(wallet)) => {
                return Err(format!(
                    "wallet {} bound without an active session",
                    wallet.kind()
                ));
            }
            (Some(session), Some(wallet)) if session.provider != wallet.kind().id() => {
                return Err(format!(
                    "session uses {} but wallet is bound to {}",
                    session.provider,
                    wallet.kind()
                ));
            }
            (Some(session), None) => {
                return Err(format!("session {} has no bound wallet", session));
            }
            _ => {}
        }

        if let Some(session) = &self.session {
            if self.chain_id.as_deref() != Some(session.chain_id.as_str()) {
                return Err(format!(
                    "session {} belongs to chain {}",
                    session, session.chain_id
                ));
            }
        }

        Ok(())
    }

    pub fn snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            phase: self.phase(),
            chain_id: self.chain_id.clone(),
            chain_name: self.chain.as_ref().map(|c| c.name.clone()),
            session: self.session.clone(),
            sessions: self.sessions.clone(),
            wallet_provider: self.wallet.as_ref().map(WalletHandle::kind),
            wallet_auth: self.wallet.as_ref().and_then(WalletHandle::auth),
            transacting: self.transacting,
            response: self.response.clone(),
            query: self.query.clone(),
        }
    }
}

/// Point-in-time copy of the state, safe to hand to observers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSnapshot {
    pub phase: Phase,
    pub chain_id: Option<String>,
    pub chain_name: Option<String>,
    pub session: Option<Session>,
    pub sessions: Vec<Session>,
    pub wallet_provider: Option<ProviderKind>,
    pub wallet_auth: Option<PermissionLevel>,
    pub transacting: bool,
    pub response: Option<SigningResponse>,
    pub query: String,
}
