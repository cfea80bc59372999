//! # Session Store
//!
//! Best-effort persistence of session lists and the per-chain "most recent"
//! pointer on top of a [`KeyValueStore`].
//!
//! ## Keys
//!
//! ```text
//! <namespace>-sessions-<chainId>        JSON array of sessions, newest first
//! <namespace>-recent-session-<chainId>  JSON session
//! ```
//!
//! ## Failure Semantics
//!
//! Durability is advisory. Read, parse and write failures are logged and
//! treated as "no data"; none of them reach the caller.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::dto::session::Session;
use tracing::{debug, warn};

use super::kv::KeyValueStore;
use crate::error::Result;

/// Which fields identify a session within one chain's list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupPolicy {
    /// `(actor, permission)` is unique; re-adding through another provider
    /// replaces the entry and its provider.
    #[default]
    ActorPermission,
    /// `(actor, permission, provider)` is unique; the same account may be
    /// listed once per provider.
    ActorPermissionProvider,
}

impl DedupPolicy {
    /// Whether `a` and `b` occupy the same slot in a session list.
    pub fn matches(&self, a: &Session, b: &Session) -> bool {
        match self {
            DedupPolicy::ActorPermission => a.same_identity(b),
            DedupPolicy::ActorPermissionProvider => a.same_identity(b) && a.provider == b.provider,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DedupPolicy::ActorPermission => "actor-permission",
            DedupPolicy::ActorPermissionProvider => "actor-permission-provider",
        }
    }
}

impl fmt::Display for DedupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DedupPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "actor-permission" => Ok(DedupPolicy::ActorPermission),
            "actor-permission-provider" => Ok(DedupPolicy::ActorPermissionProvider),
            other => Err(format!(
                "unknown session key '{}', expected 'actor-permission' or 'actor-permission-provider'",
                other
            )),
        }
    }
}

/// Per-chain session persistence.
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn KeyValueStore>,
    namespace: String,
    policy: DedupPolicy,
}

impl SessionStore {
    pub fn new(
        backend: Arc<dyn KeyValueStore>,
        namespace: impl Into<String>,
        policy: DedupPolicy,
    ) -> Self {
        Self {
            backend,
            namespace: namespace.into(),
            policy,
        }
    }

    pub fn policy(&self) -> DedupPolicy {
        self.policy
    }

    pub fn sessions_key(&self, chain_id: &str) -> String {
        format!("{}-sessions-{}", self.namespace, chain_id)
    }

    pub fn recent_key(&self, chain_id: &str) -> String {
        format!("{}-recent-session-{}", self.namespace, chain_id)
    }

    /// Sessions for a chain, newest first. Absent or malformed data yields `[]`.
    pub fn list_sessions(&self, chain_id: &str) -> Vec<Session> {
        self.load(&self.sessions_key(chain_id)).unwrap_or_default()
    }

    /// Overwrite the session list for a chain.
    pub fn save_sessions(&self, chain_id: &str, sessions: &[Session]) {
        self.persist(&self.sessions_key(chain_id), &sessions);
    }

    /// Insert `session` at the head of the chain's list, replacing any entry
    /// with the same key, and return the new list.
    pub fn upsert_session(&self, chain_id: &str, session: &Session) -> Vec<Session> {
        let mut sessions = self.list_sessions(chain_id);
        sessions.retain(|existing| !self.policy.matches(existing, session));
        sessions.insert(0, session.clone());

        self.save_sessions(chain_id, &sessions);
        debug!(
            chain_id,
            actor = %session.actor,
            permission = %session.permission,
            count = sessions.len(),
            "Upserted session"
        );
        sessions
    }

    /// Remove `session` from the chain's list without touching any provider.
    ///
    /// The recent pointer is cleared too when it names the removed session.
    pub fn remove_session(&self, chain_id: &str, session: &Session) -> Vec<Session> {
        let mut sessions = self.list_sessions(chain_id);
        sessions.retain(|existing| !self.policy.matches(existing, session));
        self.save_sessions(chain_id, &sessions);

        if let Some(recent) = self.get_recent(chain_id) {
            if self.policy.matches(&recent, session) {
                self.clear_recent(chain_id);
            }
        }

        sessions
    }

    /// The session to auto-activate for a chain. Absent or malformed data yields `None`.
    pub fn get_recent(&self, chain_id: &str) -> Option<Session> {
        self.load(&self.recent_key(chain_id))
    }

    pub fn set_recent(&self, chain_id: &str, session: &Session) {
        self.persist(&self.recent_key(chain_id), session);
    }

    pub fn clear_recent(&self, chain_id: &str) {
        self.discard(&self.recent_key(chain_id));
    }

    /// Forget everything stored for a chain.
    pub fn clear_chain(&self, chain_id: &str) {
        self.discard(&self.sessions_key(chain_id));
        self.clear_recent(chain_id);
    }

    /// Chain ids that have a stored session list.
    pub fn chains_with_sessions(&self) -> Vec<String> {
        let prefix = format!("{}-sessions-", self.namespace);
        match self.backend.keys() {
            Ok(keys) => keys
                .iter()
                .filter_map(|key| key.strip_prefix(&prefix))
                .map(str::to_string)
                .collect(),
            Err(e) => {
                warn!(error = %e, "Failed to enumerate stored keys");
                Vec::new()
            }
        }
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.read_json(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, code = e.code(), "Ignoring unreadable stored value");
                None
            }
        }
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.backend.get(key)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn persist<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(Into::into)
            .and_then(|json| self.backend.set(key, &json));

        if let Err(e) = result {
            warn!(key, error = %e, code = e.code(), "Failed to persist value");
        }
    }

    fn discard(&self, key: &str) {
        if let Err(e) = self.backend.remove(key) {
            warn!(key, error = %e, code = e.code(), "Failed to remove stored value");
        }
    }
}
