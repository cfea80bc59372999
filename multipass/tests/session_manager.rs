//! State machine tests against scripted wallet providers.

use std::sync::Arc;

use async_channel::Receiver;
use lib_core::config::Config;
use lib_core::{AppError, ChainRegistry, DedupPolicy, KeyValueStore, MemoryStore, SessionStore};
use lib_wallet::testing::{CallKind, ProviderCall, ScriptedProvider, StaticProviderFactory};
use lib_wallet::ProviderKind;
use multipass::app::{AppEvent, Phase, SessionManager, Transition};
use shared::dto::session::{PermissionLevel, Session};

const C1: &str = "aca376f206b8fc25a6ed44dbdc66547c36c6c33e3a119ffbeaef943642f0e906";
const C2: &str = "2a02a0053e5a8cf73a56ba0fda11e4d92e0238a4a2aa74fccf46d5a910746840";

struct Harness {
    manager: Arc<SessionManager>,
    anchor: Arc<ScriptedProvider>,
    scatter: Arc<ScriptedProvider>,
    factory: Arc<StaticProviderFactory>,
    backend: Arc<MemoryStore>,
    store: SessionStore,
    events: Receiver<AppEvent>,
}

impl Harness {
    fn new() -> Self {
        Self::with(DedupPolicy::ActorPermission, Arc::new(MemoryStore::new()))
    }

    fn with(policy: DedupPolicy, backend: Arc<MemoryStore>) -> Self {
        let anchor = ScriptedProvider::new(ProviderKind::AnchorLink);
        let scatter = ScriptedProvider::new(ProviderKind::Scatter);
        let factory = StaticProviderFactory::new(vec![anchor.clone(), scatter.clone()]);

        let config = Config {
            dedup_policy: policy,
            ..Config::default()
        };
        let store = SessionStore::new(backend.clone(), config.storage_namespace.clone(), policy);
        let (tx, events) = async_channel::unbounded();

        let manager = SessionManager::new(
            &config,
            ChainRegistry::builtin().unwrap(),
            store.clone(),
            factory.clone(),
            tx,
        );

        Self {
            manager: Arc::new(manager),
            anchor,
            scatter,
            factory,
            backend,
            store,
            events,
        }
    }

    /// A second manager over the same storage, as after a reload.
    fn reload(&self) -> Self {
        Self::with(self.store.policy(), self.backend.clone())
    }

    fn drain(&self) -> Vec<AppEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }

    fn failures(&self) -> Vec<(Transition, &'static str)> {
        self.drain()
            .into_iter()
            .filter_map(|event| match event {
                AppEvent::TransitionFailed { transition, code, .. } => Some((transition, code)),
                AppEvent::StateChanged(_) => None,
            })
            .collect()
    }

    /// Configure C1 with alice (anchor) active over bob (scatter).
    async fn two_sessions(&self) -> (Session, Session) {
        self.manager.configure(C1).await.unwrap();

        self.scatter.set_identity("bob", "active");
        self.manager.add_account("scatter").await.unwrap();
        self.anchor.set_identity("alice", "active");
        self.manager.add_account("anchor-link").await.unwrap();

        self.anchor.clear_calls();
        self.scatter.clear_calls();
        self.drain();

        (alice(ProviderKind::AnchorLink), bob(ProviderKind::Scatter))
    }
}

fn alice(kind: ProviderKind) -> Session {
    Session::new(C1, kind.id(), "alice", "active")
}

fn bob(kind: ProviderKind) -> Session {
    Session::new(C1, kind.id(), "bob", "active")
}

// ========== Configure Tests ==========

#[tokio::test]
async fn configure_with_empty_storage_is_idle() {
    let h = Harness::new();

    let snapshot = h.manager.configure(C1).await.unwrap();

    assert_eq!(snapshot.phase, Phase::Idle);
    assert_eq!(snapshot.chain_id.as_deref(), Some(C1));
    assert_eq!(snapshot.chain_name.as_deref(), Some("EOS"));
    assert!(snapshot.session.is_none());
    assert!(snapshot.sessions.is_empty());
    assert_eq!(h.factory.networks()[0].chain_id, C1);
    assert!(h.anchor.calls().is_empty());
}

#[tokio::test]
async fn configure_unknown_chain_is_fatal() {
    let h = Harness::new();

    let err = h.manager.configure("nope").await.unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(h.manager.snapshot().phase, Phase::Unconfigured);
    assert_eq!(h.failures(), vec![(Transition::Configure, "NotFound")]);
}

#[tokio::test]
async fn configure_factory_failure_is_fatal() {
    let h = Harness::new();
    h.factory.set_failing(true);

    let err = h.manager.configure(C1).await.unwrap_err();

    assert!(matches!(err, AppError::Config(_)));
    assert!(err.is_fatal());
    assert_eq!(h.manager.snapshot().phase, Phase::Unconfigured);
}

#[tokio::test]
async fn add_account_then_reload_restores_session() {
    let h = Harness::new();
    h.manager.configure(C1).await.unwrap();
    h.anchor.set_identity("alice", "active");

    let snapshot = h.manager.add_account("anchor-link").await.unwrap();

    let expected = alice(ProviderKind::AnchorLink);
    assert_eq!(snapshot.phase, Phase::Active);
    assert_eq!(snapshot.session.as_ref(), Some(&expected));
    assert_eq!(snapshot.sessions, vec![expected.clone()]);
    assert_eq!(snapshot.wallet_provider, Some(ProviderKind::AnchorLink));

    let raw = h.backend.get(&format!("eos-transit-sessions-{}", C1)).unwrap().unwrap();
    let stored: Vec<Session> = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored, vec![expected.clone()]);

    let reloaded = h.reload();
    let snapshot = reloaded.manager.configure(C1).await.unwrap();

    assert_eq!(snapshot.phase, Phase::Active);
    assert_eq!(snapshot.session, Some(expected));
    assert_eq!(snapshot.wallet_auth, Some(PermissionLevel::new("alice", "active")));
    assert!(reloaded
        .anchor
        .calls()
        .contains(&ProviderCall::Login(Some(PermissionLevel::new("alice", "active")))));
}

#[tokio::test]
async fn configure_publishes_configuring_while_restoring() {
    let h = Harness::new();
    h.manager.configure(C1).await.unwrap();
    h.anchor.set_identity("alice", "active");
    h.manager.add_account("anchor-link").await.unwrap();

    let reloaded = h.reload();
    reloaded.manager.configure(C1).await.unwrap();

    let phases: Vec<Phase> = reloaded
        .drain()
        .into_iter()
        .filter_map(|event| match event {
            AppEvent::StateChanged(snapshot) => Some(snapshot.phase),
            _ => None,
        })
        .collect();
    assert_eq!(phases, vec![Phase::Configuring, Phase::Active]);
}

#[tokio::test]
async fn failed_restore_leaves_chain_idle() {
    let h = Harness::new();
    h.manager.configure(C1).await.unwrap();
    h.anchor.set_identity("alice", "active");
    h.manager.add_account("anchor-link").await.unwrap();

    let reloaded = h.reload();
    reloaded.anchor.fail_login(true);
    let snapshot = reloaded.manager.configure(C1).await.unwrap();

    assert_eq!(snapshot.phase, Phase::Idle);
    assert!(snapshot.session.is_none());
    assert_eq!(snapshot.sessions.len(), 1);
    assert_eq!(reloaded.failures(), vec![(Transition::UseSession, "LoginFailed")]);
}

#[tokio::test]
async fn start_reads_chain_from_query() {
    let h = Harness::new();
    let manager = Arc::try_unwrap(h.manager)
        .ok()
        .unwrap()
        .with_query(format!("?chainId={}&theme=dark", C1));

    let snapshot = manager.start().await.unwrap();
    assert_eq!(snapshot.chain_id.as_deref(), Some(C1));

    let query = manager.switch_chain(C2).await.unwrap();
    assert_eq!(query, format!("?chainId={}&theme=dark", C2));
    assert_eq!(manager.snapshot().chain_name.as_deref(), Some("Jungle 3 (Testnet)"));
}

#[tokio::test]
async fn start_without_query_uses_default_chain() {
    let h = Harness::new();

    let snapshot = h.manager.start().await.unwrap();
    assert_eq!(snapshot.chain_id.as_deref(), Some(lib_core::config::DEFAULT_CHAIN_ID));
}

#[tokio::test]
async fn switch_chain_rewrites_query_and_reconfigures() {
    let h = Harness::new();
    h.manager.configure(C1).await.unwrap();
    h.anchor.set_identity("alice", "active");
    h.manager.add_account("anchor-link").await.unwrap();

    let query = h.manager.switch_chain(C2).await.unwrap();

    assert_eq!(query, format!("?chainId={}", C2));
    let snapshot = h.manager.snapshot();
    assert_eq!(snapshot.chain_id.as_deref(), Some(C2));
    assert_eq!(snapshot.query, query);
    assert!(snapshot.session.is_none());
    assert!(snapshot.sessions.is_empty());

    // C1's sessions are untouched by the switch.
    assert_eq!(h.store.list_sessions(C1).len(), 1);
}

#[tokio::test]
async fn switch_chain_unknown_chain_keeps_query() {
    let h = Harness::new();
    let query = format!("?chainId={}", C1);
    let manager = Arc::try_unwrap(h.manager)
        .ok()
        .unwrap()
        .with_query(query.clone());
    manager.start().await.unwrap();
    h.anchor.set_identity("alice", "active");
    manager.add_account("anchor-link").await.unwrap();
    let response = manager.sign_test_transaction().await.unwrap();
    while h.events.try_recv().is_ok() {}

    let err = manager.switch_chain("nope").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let snapshot = manager.snapshot();
    assert_eq!(snapshot.chain_id.as_deref(), Some(C1));
    assert_eq!(snapshot.query, query);
    assert_eq!(snapshot.session, Some(alice(ProviderKind::AnchorLink)));
    assert_eq!(snapshot.response, Some(response));

    let mut events = Vec::new();
    while let Ok(event) = h.events.try_recv() {
        events.push(event);
    }
    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0],
        AppEvent::TransitionFailed {
            transition: Transition::Configure,
            code: "NotFound",
            ..
        }
    ));

    // The unchanged query still starts on the original chain.
    let restarted = Harness::with(DedupPolicy::ActorPermission, h.backend.clone());
    let manager = Arc::try_unwrap(restarted.manager)
        .ok()
        .unwrap()
        .with_query(snapshot.query);
    let snapshot = manager.start().await.unwrap();
    assert_eq!(snapshot.chain_id.as_deref(), Some(C1));
    assert_eq!(snapshot.session, Some(alice(ProviderKind::AnchorLink)));
}

#[tokio::test]
async fn overlapping_configure_keeps_newer_restore_window() {
    let h = Harness::new();
    h.manager.configure(C1).await.unwrap();
    h.anchor.set_identity("alice", "active");
    h.manager.add_account("anchor-link").await.unwrap();

    let reloaded = h.reload();

    let first_pause = reloaded.anchor.pause_next(CallKind::Login);
    let first = {
        let manager = reloaded.manager.clone();
        tokio::spawn(async move { manager.configure(C1).await })
    };
    first_pause.reached().await;

    let second_pause = reloaded.anchor.pause_next(CallKind::Login);
    let second = {
        let manager = reloaded.manager.clone();
        tokio::spawn(async move { manager.configure(C1).await })
    };
    second_pause.reached().await;

    // The older restore is superseded and must not end the newer window.
    first_pause.release();
    let snapshot = first.await.unwrap().unwrap();
    assert_eq!(snapshot.phase, Phase::Configuring);
    assert_eq!(reloaded.manager.snapshot().phase, Phase::Configuring);

    second_pause.release();
    let snapshot = second.await.unwrap().unwrap();
    assert_eq!(snapshot.phase, Phase::Active);
    assert_eq!(snapshot.session, Some(alice(ProviderKind::AnchorLink)));
}

// ========== AddAccount Tests ==========

#[tokio::test]
async fn add_account_login_failure_preserves_state() {
    let h = Harness::new();
    h.manager.configure(C1).await.unwrap();
    h.scatter.set_identity("bob", "active");
    h.manager.add_account("scatter").await.unwrap();
    let before = h.manager.snapshot();
    h.drain();

    h.anchor.fail_login(true);
    let err = h.manager.add_account("anchor-link").await.unwrap_err();

    assert!(matches!(err, AppError::LoginFailed(_)));
    assert_eq!(h.manager.snapshot(), before);
    assert_eq!(h.store.list_sessions(C1), vec![bob(ProviderKind::Scatter)]);
    assert_eq!(h.failures(), vec![(Transition::AddAccount, "LoginFailed")]);
}

#[tokio::test]
async fn add_account_rejects_invalid_identity() {
    let h = Harness::new();
    h.manager.configure(C1).await.unwrap();
    h.anchor.set_identity("Not An Account", "active");

    let err = h.manager.add_account("anchor-link").await.unwrap_err();

    assert!(matches!(err, AppError::LoginFailed(_)));
    assert!(h.store.list_sessions(C1).is_empty());
    assert!(h.store.get_recent(C1).is_none());
}

#[tokio::test]
async fn add_account_provider_errors() {
    let h = Harness::new();

    let err = h.manager.add_account("anchor-link").await.unwrap_err();
    assert!(matches!(err, AppError::State(_)));

    h.manager.configure(C1).await.unwrap();
    let err = h.manager.add_account("ledger").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    h.scatter.fail_connect(true);
    let err = h.manager.add_account("scatter").await.unwrap_err();
    assert!(matches!(err, AppError::ConnectionFailed(_)));
}

// ========== Dedup Policy Tests ==========

#[tokio::test]
async fn same_account_through_two_providers_replaces_by_default() {
    let h = Harness::new();
    h.manager.configure(C1).await.unwrap();
    h.anchor.set_identity("alice", "active");
    h.scatter.set_identity("alice", "active");

    h.manager.add_account("anchor-link").await.unwrap();
    let snapshot = h.manager.add_account("scatter").await.unwrap();

    assert_eq!(snapshot.sessions, vec![alice(ProviderKind::Scatter)]);
    assert_eq!(h.store.list_sessions(C1), vec![alice(ProviderKind::Scatter)]);
}

#[tokio::test]
async fn same_account_through_two_providers_kept_with_provider_key() {
    let h = Harness::with(DedupPolicy::ActorPermissionProvider, Arc::new(MemoryStore::new()));
    h.manager.configure(C1).await.unwrap();
    h.anchor.set_identity("alice", "active");
    h.scatter.set_identity("alice", "active");

    h.manager.add_account("anchor-link").await.unwrap();
    let snapshot = h.manager.add_account("scatter").await.unwrap();

    assert_eq!(
        snapshot.sessions,
        vec![alice(ProviderKind::Scatter), alice(ProviderKind::AnchorLink)]
    );

    // The active check ignores the provider: removing the anchor entry while
    // the scatter entry is active logs out the live wallet and re-activates
    // the remaining entry.
    let snapshot = h.manager.remove_session(&alice(ProviderKind::AnchorLink)).await.unwrap();
    assert_eq!(snapshot.sessions, vec![alice(ProviderKind::Scatter)]);
    assert_eq!(snapshot.session, Some(alice(ProviderKind::Scatter)));
    assert!(h
        .scatter
        .calls()
        .contains(&ProviderCall::Logout(PermissionLevel::new("alice", "active"))));
}

// ========== UseSession Tests ==========

#[tokio::test]
async fn use_session_switches_wallet_and_recent() {
    let h = Harness::new();
    let (_, b) = h.two_sessions().await;

    let snapshot = h.manager.use_session(&b).await.unwrap();

    assert_eq!(snapshot.session, Some(b.clone()));
    assert_eq!(snapshot.wallet_provider, Some(ProviderKind::Scatter));
    assert_eq!(snapshot.wallet_auth, Some(PermissionLevel::new("bob", "active")));
    assert_eq!(h.store.get_recent(C1), Some(b));
}

#[tokio::test]
async fn use_session_from_other_chain_rejected() {
    let h = Harness::new();
    h.manager.configure(C1).await.unwrap();

    let other = Session::new(C2, "scatter", "bob", "active");
    let err = h.manager.use_session(&other).await.unwrap_err();

    assert!(matches!(err, AppError::InvalidInput(_)));
    assert!(h.scatter.calls().is_empty());
}

#[tokio::test]
async fn use_session_login_failure_keeps_active() {
    let h = Harness::new();
    let (a, b) = h.two_sessions().await;
    h.scatter.fail_login(true);

    assert!(h.manager.use_session(&b).await.is_err());

    let snapshot = h.manager.snapshot();
    assert_eq!(snapshot.session, Some(a.clone()));
    assert_eq!(h.store.get_recent(C1), Some(a));
}

// ========== RemoveSession Tests ==========

#[tokio::test]
async fn remove_active_session_activates_next() {
    let h = Harness::new();
    let (a, b) = h.two_sessions().await;

    let snapshot = h.manager.remove_session(&a).await.unwrap();

    assert_eq!(snapshot.session, Some(b.clone()));
    assert_eq!(snapshot.sessions, vec![b.clone()]);
    assert_eq!(snapshot.wallet_provider, Some(ProviderKind::Scatter));
    assert_eq!(h.store.list_sessions(C1), vec![b.clone()]);
    assert_eq!(h.store.get_recent(C1), Some(b));
    assert_eq!(
        h.anchor.calls(),
        vec![ProviderCall::Logout(PermissionLevel::new("alice", "active"))]
    );
}

#[tokio::test]
async fn remove_sole_active_session_goes_idle() {
    let h = Harness::new();
    h.manager.configure(C1).await.unwrap();
    h.anchor.set_identity("alice", "active");
    h.manager.add_account("anchor-link").await.unwrap();

    let snapshot = h.manager.remove_session(&alice(ProviderKind::AnchorLink)).await.unwrap();

    assert_eq!(snapshot.phase, Phase::Idle);
    assert!(snapshot.session.is_none());
    assert!(snapshot.wallet_provider.is_none());
    assert!(snapshot.sessions.is_empty());
    assert!(h.store.get_recent(C1).is_none());
    assert!(h.store.list_sessions(C1).is_empty());
}

#[tokio::test]
async fn remove_non_active_session_keeps_wallet() {
    let h = Harness::new();
    let (a, b) = h.two_sessions().await;

    let snapshot = h.manager.remove_session(&b).await.unwrap();

    assert_eq!(snapshot.session, Some(a.clone()));
    assert_eq!(snapshot.wallet_provider, Some(ProviderKind::AnchorLink));
    assert_eq!(snapshot.sessions, vec![a.clone()]);
    assert_eq!(h.store.get_recent(C1), Some(a));
    assert!(h
        .scatter
        .calls()
        .contains(&ProviderCall::Logout(PermissionLevel::new("bob", "active"))));
    assert!(h.anchor.calls().is_empty());
}

#[tokio::test]
async fn remove_logout_failure_preserves_state() {
    let h = Harness::new();
    let (a, _) = h.two_sessions().await;
    let before = h.manager.snapshot();
    h.anchor.fail_logout(true);

    let err = h.manager.remove_session(&a).await.unwrap_err();

    assert!(matches!(err, AppError::LogoutFailed(_)));
    assert_eq!(h.manager.snapshot(), before);
    assert_eq!(h.store.list_sessions(C1).len(), 2);
    assert_eq!(h.store.get_recent(C1), Some(a));
}

#[tokio::test]
async fn remove_active_with_failing_fallback_goes_idle() {
    let h = Harness::new();
    let (a, b) = h.two_sessions().await;
    h.scatter.fail_login(true);

    let snapshot = h.manager.remove_session(&a).await.unwrap();

    assert_eq!(snapshot.phase, Phase::Idle);
    assert_eq!(snapshot.sessions, vec![b]);
    assert!(h.store.get_recent(C1).is_none());
    assert_eq!(h.failures(), vec![(Transition::RemoveSession, "LoginFailed")]);
}

#[tokio::test]
async fn remove_unknown_session_rejected() {
    let h = Harness::new();
    h.two_sessions().await;

    let stranger = Session::new(C1, "scatter", "carol", "active");
    let err = h.manager.remove_session(&stranger).await.unwrap_err();

    assert!(matches!(err, AppError::InvalidInput(_)));
    assert!(h.scatter.calls().is_empty());
}

// ========== Transact Tests ==========

#[tokio::test]
async fn sign_test_transaction_sets_response() {
    let h = Harness::new();
    h.two_sessions().await;

    let response = h.manager.sign_test_transaction().await.unwrap();

    let snapshot = h.manager.snapshot();
    assert!(!snapshot.transacting);
    assert_eq!(snapshot.response, Some(response));
    assert_eq!(
        h.anchor.calls(),
        vec![ProviderCall::Transact {
            auth: PermissionLevel::new("alice", "active"),
            actions: 1,
        }]
    );

    let checks = h.manager.check_response().unwrap();
    assert!(checks.iter().all(|c| c.passed));
}

#[tokio::test]
async fn transact_failure_clears_flag_without_response() {
    let h = Harness::new();
    h.two_sessions().await;
    h.manager.sign_test_transaction().await.unwrap();
    h.drain();
    h.anchor.fail_transact(true);

    let err = h.manager.sign_test_transaction().await.unwrap_err();
    assert!(matches!(err, AppError::TransactionFailed(_)));

    let states: Vec<(bool, bool)> = h
        .drain()
        .into_iter()
        .filter_map(|event| match event {
            AppEvent::StateChanged(s) => Some((s.transacting, s.response.is_some())),
            _ => None,
        })
        .collect();
    assert_eq!(states, vec![(true, false), (false, false)]);

    let snapshot = h.manager.snapshot();
    assert!(!snapshot.transacting);
    assert!(snapshot.response.is_none());
    assert!(h.manager.check_response().is_none());
}

#[tokio::test]
async fn transact_requires_active_wallet() {
    let h = Harness::new();
    h.manager.configure(C1).await.unwrap();

    let err = h.manager.sign_test_transaction().await.unwrap_err();
    assert!(matches!(err, AppError::State(_)));

    let err = h
        .manager
        .transact(&[], &lib_wallet::action::test_transact_options())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::State(_)));
}

// ========== Superseded Transition Tests ==========

#[tokio::test]
async fn stale_login_result_is_discarded() {
    let h = Harness::new();
    h.manager.configure(C1).await.unwrap();
    h.scatter.set_identity("bob", "active");
    h.manager.add_account("scatter").await.unwrap();

    h.anchor.set_identity("alice", "active");
    let pause = h.anchor.pause_next(CallKind::Login);
    let pending = {
        let manager = h.manager.clone();
        tokio::spawn(async move { manager.add_account("anchor-link").await })
    };
    pause.reached().await;

    // A newer transition completes while the login is still pending.
    h.manager.use_session(&bob(ProviderKind::Scatter)).await.unwrap();
    pause.release();

    let err = pending.await.unwrap().unwrap_err();
    assert!(matches!(err, AppError::State(_)));

    let snapshot = h.manager.snapshot();
    assert_eq!(snapshot.session, Some(bob(ProviderKind::Scatter)));
    assert_eq!(snapshot.sessions, vec![bob(ProviderKind::Scatter)]);
    assert_eq!(h.store.list_sessions(C1), vec![bob(ProviderKind::Scatter)]);
    assert_eq!(h.store.get_recent(C1), Some(bob(ProviderKind::Scatter)));

    // Superseded results are not reported as failures.
    assert!(h.failures().is_empty());
}

#[tokio::test]
async fn stale_transaction_only_clears_its_own_flag() {
    let h = Harness::new();
    let (_, b) = h.two_sessions().await;

    let pause = h.anchor.pause_next(CallKind::Transact);
    let pending = {
        let manager = h.manager.clone();
        tokio::spawn(async move { manager.sign_test_transaction().await })
    };
    pause.reached().await;
    assert_eq!(h.manager.snapshot().phase, Phase::Transacting);

    h.manager.use_session(&b).await.unwrap();
    pause.release();

    assert!(pending.await.unwrap().is_err());

    let snapshot = h.manager.snapshot();
    assert!(!snapshot.transacting);
    assert!(snapshot.response.is_none());
    assert_eq!(snapshot.session, Some(b));
    assert_eq!(snapshot.phase, Phase::Active);
}

#[tokio::test]
async fn newer_transaction_keeps_flag_set() {
    let h = Harness::new();
    h.two_sessions().await;

    let first_pause = h.anchor.pause_next(CallKind::Transact);
    let first = {
        let manager = h.manager.clone();
        tokio::spawn(async move { manager.sign_test_transaction().await })
    };
    first_pause.reached().await;

    let second_pause = h.anchor.pause_next(CallKind::Transact);
    let second = {
        let manager = h.manager.clone();
        tokio::spawn(async move { manager.sign_test_transaction().await })
    };
    second_pause.reached().await;

    first_pause.release();
    assert!(first.await.unwrap().is_err());
    assert!(h.manager.snapshot().transacting);

    second_pause.release();
    let response = second.await.unwrap().unwrap();

    let snapshot = h.manager.snapshot();
    assert!(!snapshot.transacting);
    assert_eq!(snapshot.response, Some(response));
}
