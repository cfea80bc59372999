//! # Provider Registry
//!
//! The wallet provider adapters registered for one chain context.

use std::sync::Arc;

use tracing::debug;

use crate::error::WalletError;
use crate::provider::{ProviderKind, WalletProvider};

/// Registered provider adapters, at most one per [`ProviderKind`].
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn WalletProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a provider set, rejecting duplicate kinds.
    pub fn with_providers(
        providers: impl IntoIterator<Item = Arc<dyn WalletProvider>>,
    ) -> Result<Self, WalletError> {
        let mut registry = Self::new();
        for provider in providers {
            registry.register(provider)?;
        }
        Ok(registry)
    }

    /// Register a provider adapter.
    pub fn register(&mut self, provider: Arc<dyn WalletProvider>) -> Result<(), WalletError> {
        let kind = provider.kind();
        if self.get(kind).is_some() {
            return Err(WalletError::Setup(format!("provider {} registered twice", kind)));
        }

        debug!(provider = %kind, "Registered wallet provider");
        self.providers.push(provider);
        Ok(())
    }

    /// Get a provider by kind
    pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn WalletProvider>> {
        self.providers
            .iter()
            .find(|p| p.kind() == kind)
            .map(Arc::clone)
    }

    /// Kinds of all registered providers, in registration order.
    pub fn kinds(&self) -> Vec<ProviderKind> {
        self.providers.iter().map(|p| p.kind()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
