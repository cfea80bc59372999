//! # Wallet Binder
//!
//! Resolves a provider identifier into a live [`WalletHandle`], connecting the
//! provider first when needed. Handles are not cached; every bind resolves
//! afresh.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use shared::dto::session::PermissionLevel;
use shared::dto::transaction::{Action, SigningResponse, TransactOptions};
use tracing::{debug, info};

use crate::error::WalletError;
use crate::provider::{ProviderKind, WalletProvider};
use crate::registry::ProviderRegistry;

/// Binds provider identifiers to connected handles for one chain context.
#[derive(Debug, Clone)]
pub struct WalletBinder {
    registry: Arc<ProviderRegistry>,
}

impl WalletBinder {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Resolve `provider_id` and make sure it is connected.
    pub async fn bind(&self, provider_id: &str) -> Result<WalletHandle, WalletError> {
        let kind: ProviderKind = provider_id.parse()?;
        let provider = self
            .registry
            .get(kind)
            .ok_or_else(|| WalletError::ProviderNotFound(provider_id.to_string()))?;

        let handle = WalletHandle::new(provider);
        if !handle.connected() {
            debug!(provider = %kind, "Provider not connected, connecting");
            handle.connect().await?;
        }

        Ok(handle)
    }
}

/// A live binding between a provider and the identity it is logged in as.
///
/// Clones share the logged-in identity.
#[derive(Clone)]
pub struct WalletHandle {
    provider: Arc<dyn WalletProvider>,
    auth: Arc<RwLock<Option<PermissionLevel>>>,
}

impl WalletHandle {
    pub fn new(provider: Arc<dyn WalletProvider>) -> Self {
        Self {
            provider,
            auth: Arc::new(RwLock::new(None)),
        }
    }

    pub fn kind(&self) -> ProviderKind {
        self.provider.kind()
    }

    pub fn connected(&self) -> bool {
        self.provider.is_connected()
    }

    pub async fn connect(&self) -> Result<(), WalletError> {
        self.provider.connect().await
    }

    /// Log in with whatever account the provider offers.
    pub async fn login(&self) -> Result<PermissionLevel, WalletError> {
        let identity = self.provider.login(None).await?;
        info!(
            provider = %self.kind(),
            actor = %identity.actor,
            permission = %identity.permission,
            "Logged in"
        );
        *self.auth.write() = Some(identity.clone());
        Ok(identity)
    }

    /// Restore a known identity.
    pub async fn login_as(
        &self,
        actor: &str,
        permission: &str,
    ) -> Result<PermissionLevel, WalletError> {
        let target = PermissionLevel::new(actor, permission);
        let identity = self.provider.login(Some(&target)).await?;
        debug!(provider = %self.kind(), actor, permission, "Restored login");
        *self.auth.write() = Some(identity.clone());
        Ok(identity)
    }

    pub async fn logout(&self, actor: &str, permission: &str) -> Result<(), WalletError> {
        self.provider.logout(actor, permission).await?;

        let mut auth = self.auth.write();
        if auth
            .as_ref()
            .is_some_and(|a| a.actor == actor && a.permission == permission)
        {
            *auth = None;
        }
        info!(provider = %self.kind(), actor, permission, "Logged out");
        Ok(())
    }

    /// Sign `actions` as the logged-in identity.
    pub async fn transact(
        &self,
        actions: &[Action],
        options: &TransactOptions,
    ) -> Result<SigningResponse, WalletError> {
        let auth = self
            .auth()
            .ok_or_else(|| WalletError::NotAuthenticated(self.kind().to_string()))?;
        self.provider.transact(&auth, actions, options).await
    }

    /// The logged-in identity (`accountName`, `permission`), if any.
    pub fn auth(&self) -> Option<PermissionLevel> {
        self.auth.read().clone()
    }
}

impl fmt::Debug for WalletHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletHandle")
            .field("provider", &self.kind())
            .field("auth", &self.auth())
            .finish()
    }
}
