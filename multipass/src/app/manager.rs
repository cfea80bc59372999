//! # Session Manager
//!
//! The session lifecycle state machine. Every transition:
//!
//! 1. takes a ticket from a monotonic sequence,
//! 2. awaits the wallet provider without holding the state lock,
//! 3. re-checks under the lock that no newer transition started; a
//!    superseded transition's results are discarded,
//! 4. writes storage, commits state and publishes a snapshot.
//!
//! ```text
//!  Unconfigured ──configure──▶ Configuring ──▶ Idle ◀──────▶ Active ◀──▶ Transacting
//!                                              ▲  remove last   │
//!                                              └────────────────┘
//! ```
//!
//! Provider failures abort the transition with prior state preserved, are
//! logged and published as [`AppEvent::TransitionFailed`], and are returned
//! to the caller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_channel::Sender;
use lib_core::config::Config;
use lib_core::{AppError, ChainRegistry, Result, SessionStore};
use lib_utils::{get_query_param, set_query_param, validate_account_name, validate_permission_name};
use lib_wallet::action::{test_transact_options, test_vote_action};
use lib_wallet::{
    run_checks, CheckResult, NetworkConfig, ProviderFactory, WalletBinder, WalletHandle,
};
use parking_lot::RwLock;
use shared::dto::session::{PermissionLevel, Session};
use shared::dto::transaction::{Action, SigningResponse, TransactOptions};
use tracing::{debug, error, info, trace, warn};

use super::events::{AppEvent, Transition};
use super::state::{AppSnapshot, ApplicationState};

/// Query parameter naming the selected chain.
pub const CHAIN_ID_PARAM: &str = "chainId";

/// Chain named by the location query, else `default_chain_id`.
pub fn initial_chain_id(query: &str, default_chain_id: &str) -> String {
    get_query_param(query, CHAIN_ID_PARAM)
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| default_chain_id.to_string())
}

/// Owns the application state and drives every session transition.
pub struct SessionManager {
    app_name: String,
    default_chain_id: String,
    chains: ChainRegistry,
    store: SessionStore,
    factory: Arc<dyn ProviderFactory>,
    /// Provider set of the configured chain
    binder: RwLock<Option<WalletBinder>>,
    state: Arc<RwLock<ApplicationState>>,
    sequence: AtomicU64,
    events: Sender<AppEvent>,
}

impl SessionManager {
    pub fn new(
        config: &Config,
        chains: ChainRegistry,
        store: SessionStore,
        factory: Arc<dyn ProviderFactory>,
        events: Sender<AppEvent>,
    ) -> Self {
        Self {
            app_name: config.app_name.clone(),
            default_chain_id: config.default_chain_id.clone(),
            chains,
            store,
            factory,
            binder: RwLock::new(None),
            state: Arc::new(RwLock::new(ApplicationState::default())),
            sequence: AtomicU64::new(0),
            events,
        }
    }

    /// Set the location query string the initial chain is read from.
    pub fn with_query(self, query: impl Into<String>) -> Self {
        self.state.write().query = query.into();
        self
    }

    pub fn state(&self) -> &Arc<RwLock<ApplicationState>> {
        &self.state
    }

    pub fn snapshot(&self) -> AppSnapshot {
        self.state.read().snapshot()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn chains(&self) -> &ChainRegistry {
        &self.chains
    }

    /// Configure the chain named by the query, or the default chain.
    pub async fn start(&self) -> Result<AppSnapshot> {
        let chain_id = initial_chain_id(&self.state.read().query, &self.default_chain_id);
        self.configure(&chain_id).await
    }

    // region: --- Transitions

    /// Select a chain, load its sessions and restore the most recent one.
    ///
    /// An unknown chain or a failing provider factory is fatal and returned.
    /// A failed restore is reported and leaves the chain idle.
    pub async fn configure(&self, chain_id: &str) -> Result<AppSnapshot> {
        self.configure_with_query(chain_id, None).await
    }

    /// Configure `chain_id`, committing `query` together with the new chain.
    async fn configure_with_query(
        &self,
        chain_id: &str,
        query: Option<String>,
    ) -> Result<AppSnapshot> {
        let ticket = self.next_ticket();
        info!(chain_id, ticket, "Configuring chain");

        let (recent, snapshot) = self
            .load_chain(chain_id, query, ticket)
            .map_err(|e| self.fail(Transition::Configure, ticket, e))?;

        let Some(recent) = recent else {
            return Ok(snapshot);
        };

        info!(
            chain_id,
            actor = %recent.actor,
            permission = %recent.permission,
            "Restoring most recent session"
        );
        match self.use_session(&recent).await {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                debug!(chain_id, error = %e, "Most recent session not restored");
                Ok(self.finish_configuring(ticket))
            }
        }
    }

    /// Rewrite the `chainId` query parameter and configure that chain.
    ///
    /// Returns the new query string. The query is only rewritten once the
    /// chain has been loaded; a failed switch leaves the current chain as is.
    pub async fn switch_chain(&self, chain_id: &str) -> Result<String> {
        if chain_id.trim().is_empty() {
            let err = AppError::InvalidInput("chain id cannot be empty".to_string());
            self.report(Transition::SwitchChain, &err);
            return Err(err);
        }

        let query = set_query_param(&self.state.read().query, CHAIN_ID_PARAM, chain_id);
        info!(chain_id, query = %query, "Switching chain");

        self.configure_with_query(chain_id, Some(query.clone()))
            .await?;
        Ok(query)
    }

    /// Log in through `provider_id` and make the resulting account active.
    pub async fn add_account(&self, provider_id: &str) -> Result<AppSnapshot> {
        let ticket = self.next_ticket();
        info!(provider = provider_id, ticket, "Adding account");

        self.add_account_inner(provider_id, ticket)
            .await
            .map_err(|e| self.fail(Transition::AddAccount, ticket, e))
    }

    /// Bind the session's provider, restore its login and make it active.
    pub async fn use_session(&self, session: &Session) -> Result<AppSnapshot> {
        let ticket = self.next_ticket();
        info!(
            actor = %session.actor,
            permission = %session.permission,
            provider = %session.provider,
            ticket,
            "Using session"
        );

        self.use_session_inner(session, ticket)
            .await
            .map_err(|e| self.fail(Transition::UseSession, ticket, e))
    }

    /// Log `target` out of its provider and forget it.
    ///
    /// Removing the active session activates the newest remaining one, or
    /// leaves the chain idle when none remain.
    pub async fn remove_session(&self, target: &Session) -> Result<AppSnapshot> {
        let ticket = self.next_ticket();
        info!(
            actor = %target.actor,
            permission = %target.permission,
            provider = %target.provider,
            ticket,
            "Removing session"
        );

        self.remove_session_inner(target, ticket)
            .await
            .map_err(|e| self.fail(Transition::RemoveSession, ticket, e))
    }

    /// Sign `actions` with the active wallet.
    pub async fn transact(
        &self,
        actions: &[Action],
        options: &TransactOptions,
    ) -> Result<SigningResponse> {
        let ticket = self.next_ticket();
        let wallet = self
            .begin_transact(ticket)
            .map_err(|e| self.fail(Transition::Transact, ticket, e))?;
        info!(provider = %wallet.kind(), actions = actions.len(), ticket, "Signing transaction");

        let result = wallet
            .transact(actions, options)
            .await
            .map_err(AppError::from);
        self.finish_transact(ticket, result)
    }

    /// Sign the demo vote transaction as the active session, without broadcasting.
    pub async fn sign_test_transaction(&self) -> Result<SigningResponse> {
        let session = self.state.read().session.clone();
        let Some(session) = session else {
            let err = AppError::State("no active session to sign with".to_string());
            self.report(Transition::Transact, &err);
            return Err(err);
        };

        let actions = [test_vote_action(&session.permission_level())];
        self.transact(&actions, &test_transact_options()).await
    }

    /// Run the transaction checks over the last signing response.
    pub fn check_response(&self) -> Option<Vec<CheckResult>> {
        self.state.read().response.as_ref().map(run_checks)
    }

    // endregion: --- Transitions

    // region: --- Transition bodies

    fn load_chain(
        &self,
        chain_id: &str,
        query: Option<String>,
        ticket: u64,
    ) -> Result<(Option<Session>, AppSnapshot)> {
        let chain = self.chains.lookup(chain_id)?.clone();
        let network = NetworkConfig::from_chain(&chain)?;
        let binder = WalletBinder::new(self.factory.create(&self.app_name, &network)?);
        debug!(chain_id, providers = ?binder.registry().kinds(), "Provider set created");

        let recent = self.store.get_recent(chain_id);
        let restoring = recent.is_some();

        let snapshot = self.commit(Transition::Configure, ticket, |state| {
            *self.binder.write() = Some(binder);
            state.sessions = self.store.list_sessions(chain_id);
            state.chain_id = Some(chain_id.to_string());
            state.chain = Some(chain);
            state.configuring = restoring;
            state.configure_ticket = ticket;
            if let Some(query) = query {
                state.query = query;
            }
            state.session = None;
            state.wallet = None;
            state.transacting = false;
            state.response = None;
        })?;

        Ok((recent, snapshot))
    }

    /// End the restore window opened by configure `ticket`, unless a newer
    /// configure owns it.
    fn finish_configuring(&self, ticket: u64) -> AppSnapshot {
        let mut state = self.state.write();
        if state.configuring && state.configure_ticket == ticket {
            state.configuring = false;
            self.publish(&state);
        }
        state.snapshot()
    }

    async fn add_account_inner(&self, provider_id: &str, ticket: u64) -> Result<AppSnapshot> {
        let chain_id = self.require_chain()?;
        let handle = self.binder()?.bind(provider_id).await?;
        let identity = handle.login().await?;
        validate_identity(&identity)?;

        let session = Session::from_identity(chain_id.as_str(), handle.kind().id(), identity);

        self.commit(Transition::AddAccount, ticket, |state| {
            state.sessions = self.store.upsert_session(&chain_id, &session);
            self.store.set_recent(&chain_id, &session);
            info!(
                chain_id = %chain_id,
                session = %session,
                count = state.sessions.len(),
                "Account added"
            );

            state.session = Some(session);
            state.wallet = Some(handle);
            state.response = None;
        })
    }

    async fn use_session_inner(&self, session: &Session, ticket: u64) -> Result<AppSnapshot> {
        let chain_id = self.require_chain()?;
        if session.chain_id != chain_id {
            return Err(AppError::InvalidInput(format!(
                "session {} belongs to chain {}, not {}",
                session, session.chain_id, chain_id
            )));
        }

        let handle = self.activate(session).await?;

        self.commit(Transition::UseSession, ticket, |state| {
            self.store.set_recent(&chain_id, session);
            state.session = Some(session.clone());
            state.wallet = Some(handle);
            state.response = None;
        })
    }

    async fn remove_session_inner(&self, target: &Session, ticket: u64) -> Result<AppSnapshot> {
        let (chain_id, sessions, current, wallet) = {
            let state = self.state.read();
            let chain_id = state
                .chain_id
                .clone()
                .ok_or_else(|| AppError::State("no chain configured".to_string()))?;
            (chain_id, state.sessions.clone(), state.session.clone(), state.wallet.clone())
        };

        if target.chain_id != chain_id {
            return Err(AppError::InvalidInput(format!(
                "session {} belongs to chain {}, not {}",
                target, target.chain_id, chain_id
            )));
        }

        let policy = self.store.policy();
        let remaining: Vec<Session> = sessions
            .iter()
            .filter(|s| !policy.matches(s, target))
            .cloned()
            .collect();
        if remaining.len() == sessions.len() {
            return Err(AppError::InvalidInput(format!(
                "session {} is not stored for this chain",
                target
            )));
        }

        // The active session is matched on (actor, permission) regardless of policy.
        let is_current = current.as_ref().is_some_and(|c| c.same_identity(target));

        if !is_current {
            let handle = self.binder()?.bind(&target.provider).await?;
            handle.logout(&target.actor, &target.permission).await?;
            drop(handle);

            return self.commit(Transition::RemoveSession, ticket, |state| {
                self.store.save_sessions(&chain_id, &remaining);
                if self
                    .store
                    .get_recent(&chain_id)
                    .is_some_and(|recent| policy.matches(&recent, target))
                {
                    self.store.clear_recent(&chain_id);
                }
                state.sessions = remaining;
            });
        }

        let wallet = wallet.ok_or_else(|| {
            AppError::Internal(format!("active session {} has no wallet", target))
        })?;
        wallet.logout(&target.actor, &target.permission).await?;

        let Some(next) = remaining.first().cloned() else {
            return self.commit(Transition::RemoveSession, ticket, |state| {
                self.store.save_sessions(&chain_id, &remaining);
                self.store.clear_recent(&chain_id);
                info!(chain_id = %chain_id, "Last session removed");

                state.sessions = remaining;
                state.session = None;
                state.wallet = None;
                state.response = None;
            });
        };

        let activation = self.activate(&next).await;

        let snapshot = self.commit(Transition::RemoveSession, ticket, |state| {
            self.store.save_sessions(&chain_id, &remaining);
            state.sessions = remaining.clone();
            state.response = None;

            match &activation {
                Ok(handle) => {
                    self.store.set_recent(&chain_id, &next);
                    info!(
                        chain_id = %chain_id,
                        session = %next,
                        "Switched to most recent remaining session"
                    );
                    state.session = Some(next.clone());
                    state.wallet = Some(handle.clone());
                }
                Err(_) => {
                    self.store.clear_recent(&chain_id);
                    state.session = None;
                    state.wallet = None;
                }
            }
        })?;

        if let Err(e) = activation {
            warn!(session = %next, "Remaining session could not be activated, chain left idle");
            self.report(Transition::RemoveSession, &e);
        }

        Ok(snapshot)
    }

    fn begin_transact(&self, ticket: u64) -> Result<WalletHandle> {
        let mut state = self.state.write();
        let wallet = state
            .wallet
            .clone()
            .ok_or_else(|| AppError::State("no active wallet to sign with".to_string()))?;

        state.transacting = true;
        state.transact_ticket = ticket;
        state.response = None;
        self.publish(&state);

        Ok(wallet)
    }

    fn finish_transact(
        &self,
        ticket: u64,
        result: Result<SigningResponse>,
    ) -> Result<SigningResponse> {
        let mut state = self.state.write();

        if !self.is_current(ticket) {
            // Only the newest transaction may clear the flag it set.
            if state.transact_ticket == ticket {
                state.transacting = false;
                self.publish(&state);
            }
            return Err(self.superseded(Transition::Transact, ticket));
        }

        state.transacting = false;
        state.response = result.as_ref().ok().cloned();
        self.publish(&state);
        drop(state);

        match result {
            Ok(response) => {
                info!(
                    ticket,
                    signatures = response.signatures.len(),
                    "Transaction signed"
                );
                Ok(response)
            }
            Err(e) => Err(self.fail(Transition::Transact, ticket, e)),
        }
    }

    async fn activate(&self, session: &Session) -> Result<WalletHandle> {
        let handle = self.binder()?.bind(&session.provider).await?;
        handle.login_as(&session.actor, &session.permission).await?;
        Ok(handle)
    }

    // endregion: --- Transition bodies

    // region: --- Sequencing and observability

    fn next_ticket(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.sequence.load(Ordering::SeqCst) == ticket
    }

    fn superseded(&self, transition: Transition, ticket: u64) -> AppError {
        debug!(
            %transition,
            ticket,
            latest = self.sequence.load(Ordering::SeqCst),
            "Discarding results of superseded transition"
        );
        AppError::State(format!("{} superseded by a newer transition", transition))
    }

    /// Apply `apply` and publish, unless a newer transition has started.
    fn commit(
        &self,
        transition: Transition,
        ticket: u64,
        apply: impl FnOnce(&mut ApplicationState),
    ) -> Result<AppSnapshot> {
        let mut state = self.state.write();
        if !self.is_current(ticket) {
            return Err(self.superseded(transition, ticket));
        }

        apply(&mut state);
        if transition != Transition::Configure {
            state.configuring = false;
        }

        let snapshot = self.publish(&state);
        debug!(%transition, ticket, phase = ?snapshot.phase, "Transition committed");
        Ok(snapshot)
    }

    fn publish(&self, state: &ApplicationState) -> AppSnapshot {
        if let Err(violation) = state.check_invariants() {
            error!(%violation, "Application state invariant violated");
        }

        let snapshot = state.snapshot();
        self.emit(AppEvent::StateChanged(snapshot.clone()));
        snapshot
    }

    fn emit(&self, event: AppEvent) {
        if self.events.try_send(event).is_err() {
            trace!("No event listener attached");
        }
    }

    fn fail(&self, transition: Transition, ticket: u64, err: AppError) -> AppError {
        if self.is_current(ticket) {
            self.report(transition, &err);
        } else {
            debug!(%transition, ticket, error = %err, "Ignoring failure of superseded transition");
        }
        err
    }

    /// The single sink for absorbed and returned transition failures.
    pub fn report(&self, transition: Transition, err: &AppError) {
        if err.is_fatal() {
            error!(%transition, code = err.code(), error = %err, "Transition failed");
        } else {
            warn!(%transition, code = err.code(), error = %err, "Transition failed");
        }

        self.emit(AppEvent::TransitionFailed {
            transition,
            code: err.code(),
            message: err.user_message(),
        });
    }

    // endregion: --- Sequencing and observability

    fn require_chain(&self) -> Result<String> {
        self.state
            .read()
            .chain_id
            .clone()
            .ok_or_else(|| AppError::State("no chain configured".to_string()))
    }

    fn binder(&self) -> Result<WalletBinder> {
        self.binder
            .read()
            .clone()
            .ok_or_else(|| {
                AppError::State("no wallet providers for an unconfigured chain".to_string())
            })
    }
}

/// Reject identities that are not valid account and permission names.
fn validate_identity(identity: &PermissionLevel) -> Result<()> {
    validate_account_name(&identity.actor)
        .and_then(|_| validate_permission_name(&identity.permission))
        .map_err(|e| AppError::LoginFailed(format!("provider returned an invalid identity: {}", e)))
}
