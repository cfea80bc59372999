//! # Scripted Providers
//!
//! In-process wallet providers whose behavior is set by the test: which
//! account a generic login yields, which calls fail and which call pauses
//! until released. Every call is recorded.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use shared::dto::session::PermissionLevel;
use shared::dto::transaction::{Action, SigningResponse, TransactOptions};
use tokio::sync::Notify;

use crate::codec::{PackedAction, Transaction};
use crate::error::WalletError;
use crate::provider::{NetworkConfig, ProviderFactory, ProviderKind, WalletProvider};
use crate::registry::ProviderRegistry;

/// Reference block values stamped into scripted transactions.
pub const SCRIPTED_REF_BLOCK_NUM: u16 = 4242;
pub const SCRIPTED_REF_BLOCK_PREFIX: u32 = 0xdead_beef;
pub const SCRIPTED_HEAD_TIME: u32 = 1_700_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Connect,
    Login(Option<PermissionLevel>),
    Logout(PermissionLevel),
    Transact {
        auth: PermissionLevel,
        actions: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    Connect,
    Login,
    Logout,
    Transact,
}

/// A one-shot pause installed on the next call of some kind.
#[derive(Debug, Clone, Default)]
pub struct Pause {
    reached: Arc<Notify>,
    release: Arc<Notify>,
}

impl Pause {
    /// Wait until the paused call has started.
    pub async fn reached(&self) {
        self.reached.notified().await;
    }

    /// Let the paused call continue.
    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[derive(Default)]
struct Script {
    identity: Option<PermissionLevel>,
    failing: HashSet<CallKind>,
    pauses: HashMap<CallKind, Pause>,
}

pub struct ScriptedProvider {
    kind: ProviderKind,
    connected: AtomicBool,
    script: Mutex<Script>,
    calls: Mutex<Vec<ProviderCall>>,
}

impl ScriptedProvider {
    pub fn new(kind: ProviderKind) -> Arc<Self> {
        Arc::new(Self {
            kind,
            connected: AtomicBool::new(false),
            script: Mutex::new(Script::default()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn into_dyn(self: Arc<Self>) -> Arc<dyn WalletProvider> {
        self
    }

    /// Account chosen when a generic login is requested.
    pub fn set_identity(&self, actor: &str, permission: &str) {
        self.script.lock().identity = Some(PermissionLevel::new(actor, permission));
    }

    pub fn set_failing(&self, kind: CallKind, failing: bool) {
        let mut script = self.script.lock();
        if failing {
            script.failing.insert(kind);
        } else {
            script.failing.remove(&kind);
        }
    }

    pub fn fail_connect(&self, failing: bool) {
        self.set_failing(CallKind::Connect, failing);
    }

    pub fn fail_login(&self, failing: bool) {
        self.set_failing(CallKind::Login, failing);
    }

    pub fn fail_logout(&self, failing: bool) {
        self.set_failing(CallKind::Logout, failing);
    }

    pub fn fail_transact(&self, failing: bool) {
        self.set_failing(CallKind::Transact, failing);
    }

    /// Pause the next call of `kind` until the returned [`Pause`] is released.
    pub fn pause_next(&self, kind: CallKind) -> Pause {
        let pause = Pause::default();
        self.script.lock().pauses.insert(kind, pause.clone());
        pause
    }

    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Record the call, honor any pause, then report whether it should fail.
    async fn enter(&self, kind: CallKind, call: ProviderCall) -> bool {
        self.calls.lock().push(call);

        let pause = self.script.lock().pauses.remove(&kind);
        if let Some(pause) = pause {
            pause.reached.notify_one();
            pause.release.notified().await;
        }

        self.script.lock().failing.contains(&kind)
    }
}

#[async_trait]
impl WalletProvider for ScriptedProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn connect(&self) -> Result<(), WalletError> {
        if self.enter(CallKind::Connect, ProviderCall::Connect).await {
            return Err(WalletError::ConnectionFailed(format!(
                "{} refused to connect",
                self.kind
            )));
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn login(
        &self,
        target: Option<&PermissionLevel>,
    ) -> Result<PermissionLevel, WalletError> {
        if self
            .enter(CallKind::Login, ProviderCall::Login(target.cloned()))
            .await
        {
            return Err(WalletError::LoginFailed(format!(
                "{} rejected the login",
                self.kind
            )));
        }

        match target {
            Some(target) => Ok(target.clone()),
            None => self
                .script
                .lock()
                .identity
                .clone()
                .ok_or_else(|| WalletError::LoginFailed("no account selected".to_string())),
        }
    }

    async fn logout(&self, actor: &str, permission: &str) -> Result<(), WalletError> {
        let call = ProviderCall::Logout(PermissionLevel::new(actor, permission));
        if self.enter(CallKind::Logout, call).await {
            return Err(WalletError::LogoutFailed(format!(
                "{} could not log out {}",
                self.kind, actor
            )));
        }
        Ok(())
    }

    async fn transact(
        &self,
        auth: &PermissionLevel,
        actions: &[Action],
        options: &TransactOptions,
    ) -> Result<SigningResponse, WalletError> {
        let call = ProviderCall::Transact {
            auth: auth.clone(),
            actions: actions.len(),
        };
        if self.enter(CallKind::Transact, call).await {
            return Err(WalletError::TransactionFailed(
                "user cancelled signing".to_string(),
            ));
        }

        let transaction = Transaction {
            expiration: SCRIPTED_HEAD_TIME + options.expire_seconds,
            ref_block_num: SCRIPTED_REF_BLOCK_NUM,
            ref_block_prefix: SCRIPTED_REF_BLOCK_PREFIX,
            max_net_usage_words: 0,
            max_cpu_usage_ms: 0,
            delay_sec: 0,
            context_free_actions: Vec::new(),
            actions: actions.iter().map(pack_action).collect(),
            transaction_extensions: Vec::new(),
        };
        let serialized_transaction = transaction
            .encode()
            .map_err(|e| WalletError::TransactionFailed(e.to_string()))?;

        Ok(SigningResponse {
            signatures: vec![format!("SIG_K1_scripted_{}", auth.actor)],
            serialized_transaction,
        })
    }
}

fn pack_action(action: &Action) -> PackedAction {
    PackedAction {
        account: action.account.clone(),
        name: action.name.clone(),
        authorization: action.authorization.clone(),
        data: action.data.to_string().into_bytes(),
    }
}

/// Factory handing the same scripted providers to every network.
pub struct StaticProviderFactory {
    providers: Vec<Arc<ScriptedProvider>>,
    failing: AtomicBool,
    networks: Mutex<Vec<NetworkConfig>>,
}

impl StaticProviderFactory {
    pub fn new(providers: Vec<Arc<ScriptedProvider>>) -> Arc<Self> {
        Arc::new(Self {
            providers,
            failing: AtomicBool::new(false),
            networks: Mutex::new(Vec::new()),
        })
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Networks a provider set was created for, in order.
    pub fn networks(&self) -> Vec<NetworkConfig> {
        self.networks.lock().clone()
    }
}

impl ProviderFactory for StaticProviderFactory {
    fn create(
        &self,
        app_name: &str,
        network: &NetworkConfig,
    ) -> Result<ProviderRegistry, WalletError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(WalletError::Setup(format!(
                "{} could not initialise providers for {}",
                app_name, network.chain_id
            )));
        }

        self.networks.lock().push(network.clone());
        ProviderRegistry::with_providers(self.providers.iter().map(|p| p.clone().into_dyn()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pause_holds_call_until_released() {
        let provider = ScriptedProvider::new(ProviderKind::AnchorLink);
        provider.set_identity("alice", "active");
        let pause = provider.pause_next(CallKind::Login);

        let task = {
            let provider = provider.clone();
            tokio::spawn(async move { provider.login(None).await })
        };

        pause.reached().await;
        assert!(!task.is_finished());
        pause.release();

        let identity = task.await.unwrap().unwrap();
        assert_eq!(identity.actor, "alice");

        // One-shot: the next login does not pause.
        provider.login(None).await.unwrap();
    }

    #[tokio::test]
    async fn test_scripted_transaction_decodes() {
        let provider = ScriptedProvider::new(ProviderKind::Scatter);
        let auth = PermissionLevel::new("alice", "active");
        let action = crate::action::test_vote_action(&auth);

        let response = provider
            .transact(&auth, &[action], &crate::action::test_transact_options())
            .await
            .unwrap();

        let tx = Transaction::decode(&response.serialized_transaction).unwrap();
        assert_eq!(tx.ref_block_num, SCRIPTED_REF_BLOCK_NUM);
        assert_eq!(tx.expiration, SCRIPTED_HEAD_TIME + 120);
        assert_eq!(tx.actions[0].authorization, vec![auth]);
    }

    #[test]
    fn test_factory_failure() {
        let factory =
            StaticProviderFactory::new(vec![ScriptedProvider::new(ProviderKind::Scatter)]);
        let network = NetworkConfig {
            host: "localhost".to_string(),
            port: 8888,
            protocol: "http".to_string(),
            chain_id: "c1".to_string(),
        };

        assert_eq!(
            factory.create("app", &network).unwrap().kinds(),
            vec![ProviderKind::Scatter]
        );
        factory.set_failing(true);
        assert!(matches!(
            factory.create("app", &network),
            Err(WalletError::Setup(_))
        ));
        assert_eq!(factory.networks(), vec![network]);
    }
}
