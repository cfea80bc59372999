//! # Wallet Provider Boundary
//!
//! Defines the interface every wallet provider adapter must implement. The
//! provider SDKs themselves (key storage, signing, the wallet wire protocol)
//! live behind this trait and are invoked, never reimplemented.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::dto::chain::ChainInfo;
use shared::dto::session::PermissionLevel;
use shared::dto::transaction::{Action, SigningResponse, TransactOptions};

use crate::error::WalletError;
use crate::registry::ProviderRegistry;

/// The fixed set of supported wallet providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    AnchorLink,
    Scatter,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::AnchorLink, ProviderKind::Scatter];

    /// Identifier persisted in sessions.
    pub fn id(&self) -> &'static str {
        match self {
            ProviderKind::AnchorLink => "anchor-link",
            ProviderKind::Scatter => "scatter",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ProviderKind {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderKind::ALL
            .into_iter()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| WalletError::ProviderNotFound(s.to_string()))
    }
}

/// Wallet provider adapter.
///
/// Providers are shared behind `Arc` and keep their connection state
/// internally.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    fn is_connected(&self) -> bool;

    async fn connect(&self) -> Result<(), WalletError>;

    /// Log in. `None` lets the provider prompt for an account; `Some` restores
    /// a known identity.
    async fn login(&self, target: Option<&PermissionLevel>) -> Result<PermissionLevel, WalletError>;

    async fn logout(&self, actor: &str, permission: &str) -> Result<(), WalletError>;

    /// Sign (and optionally broadcast) `actions` as `auth`.
    async fn transact(
        &self,
        auth: &PermissionLevel,
        actions: &[Action],
        options: &TransactOptions,
    ) -> Result<SigningResponse, WalletError>;
}

/// Network a provider set is created for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    pub host: String,
    pub port: u16,
    pub protocol: String,
    pub chain_id: String,
}

impl NetworkConfig {
    /// Network settings for a chain's primary RPC endpoint.
    pub fn from_chain(chain: &ChainInfo) -> Result<Self, WalletError> {
        let endpoint = chain
            .primary_endpoint()
            .ok_or_else(|| {
                WalletError::Setup(format!("chain {} has no RPC endpoint", chain.chain_id))
            })?;

        Ok(Self {
            host: endpoint.host.clone(),
            port: endpoint.port,
            protocol: endpoint.protocol.clone(),
            chain_id: chain.chain_id.clone(),
        })
    }
}

/// Host-supplied constructor of the provider set for one network.
pub trait ProviderFactory: Send + Sync {
    fn create(
        &self,
        app_name: &str,
        network: &NetworkConfig,
    ) -> Result<ProviderRegistry, WalletError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::dto::chain::RpcEndpoint;

    #[test]
    fn test_provider_kind_ids() {
        assert_eq!(
            "anchor-link".parse::<ProviderKind>().unwrap(),
            ProviderKind::AnchorLink
        );
        assert_eq!(
            "scatter".parse::<ProviderKind>().unwrap(),
            ProviderKind::Scatter
        );
        assert_eq!(ProviderKind::Scatter.to_string(), "scatter");
        assert_eq!(
            serde_json::to_string(&ProviderKind::AnchorLink).unwrap(),
            "\"anchor-link\""
        );

        let err = "ledger".parse::<ProviderKind>().unwrap_err();
        assert!(matches!(err, WalletError::ProviderNotFound(id) if id == "ledger"));
    }

    #[test]
    fn test_network_from_chain() {
        let chain = ChainInfo {
            chain_id: "c1".to_string(),
            name: "One".to_string(),
            rpc_endpoints: vec![RpcEndpoint {
                protocol: "https".to_string(),
                host: "eos.greymass.com".to_string(),
                port: 443,
            }],
        };

        let network = NetworkConfig::from_chain(&chain).unwrap();
        assert_eq!(network.host, "eos.greymass.com");
        assert_eq!(network.chain_id, "c1");

        let empty = ChainInfo {
            rpc_endpoints: vec![],
            ..chain
        };
        assert!(matches!(
            NetworkConfig::from_chain(&empty),
            Err(WalletError::Setup(_))
        ));
    }
}
