use serde::{Deserialize, Serialize};
use std::fmt;

/// An `(actor, permission)` pair, as returned by a provider login and used to
/// authorize actions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PermissionLevel {
    pub actor: String,
    pub permission: String,
}

impl PermissionLevel {
    pub fn new(actor: impl Into<String>, permission: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            permission: permission.into(),
        }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.actor, self.permission)
    }
}

/// One login identity on one chain through one wallet provider.
///
/// Sessions are immutable values. Replacing a session means removing the old
/// record and inserting a new one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub chain_id: String,
    pub provider: String,
    pub actor: String,
    pub permission: String,
}

impl Session {
    pub fn new(
        chain_id: impl Into<String>,
        provider: impl Into<String>,
        actor: impl Into<String>,
        permission: impl Into<String>,
    ) -> Self {
        Self {
            chain_id: chain_id.into(),
            provider: provider.into(),
            actor: actor.into(),
            permission: permission.into(),
        }
    }

    /// Build a session from the identity a provider logged in as.
    pub fn from_identity(
        chain_id: impl Into<String>,
        provider: impl Into<String>,
        identity: PermissionLevel,
    ) -> Self {
        Self {
            chain_id: chain_id.into(),
            provider: provider.into(),
            actor: identity.actor,
            permission: identity.permission,
        }
    }

    /// The identity key within a chain's session list.
    pub fn key(&self) -> SessionKey<'_> {
        SessionKey {
            actor: &self.actor,
            permission: &self.permission,
        }
    }

    /// True when both sessions name the same `(actor, permission)` pair.
    ///
    /// The provider is deliberately ignored; this is the comparison used to
    /// decide whether a session is the active one.
    pub fn same_identity(&self, other: &Session) -> bool {
        self.key() == other.key()
    }

    pub fn permission_level(&self) -> PermissionLevel {
        PermissionLevel::new(self.actor.clone(), self.permission.clone())
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} ({})", self.actor, self.permission, self.provider)
    }
}

/// Borrowed `(actor, permission)` identity key of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionKey<'a> {
    pub actor: &'a str,
    pub permission: &'a str,
}
