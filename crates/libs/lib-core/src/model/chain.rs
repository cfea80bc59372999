//! # Chain Registry
//!
//! Static lookup of supported chains to their RPC endpoints and display names.
//! Lookups are pure and synchronous.

use std::collections::HashMap;
use std::path::Path;

use shared::dto::chain::ChainInfo;

use crate::error::{AppError, Result};

const BUILTIN_CHAINS: &str = include_str!("chains.json");

/// Chain directory
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    chains: Vec<ChainInfo>,
    index: HashMap<String, usize>,
}

impl ChainRegistry {
    /// Build a registry from chain descriptors.
    ///
    /// Every chain needs at least one RPC endpoint and a unique id.
    pub fn new(chains: Vec<ChainInfo>) -> Result<Self> {
        let mut index = HashMap::with_capacity(chains.len());

        for (position, chain) in chains.iter().enumerate() {
            if chain.chain_id.trim().is_empty() {
                return Err(AppError::Config(format!(
                    "chain '{}' has an empty chain id",
                    chain.name
                )));
            }
            if chain.rpc_endpoints.is_empty() {
                return Err(AppError::Config(format!(
                    "chain '{}' has no RPC endpoints",
                    chain.name
                )));
            }
            if index.insert(chain.chain_id.clone(), position).is_some() {
                return Err(AppError::Config(format!("duplicate chain id {}", chain.chain_id)));
            }
        }

        Ok(Self { chains, index })
    }

    /// Parse a JSON array of chain descriptors.
    pub fn from_json(json: &str) -> Result<Self> {
        let chains: Vec<ChainInfo> = serde_json::from_str(json)
            .map_err(|e| AppError::Config(format!("invalid chain directory: {}", e)))?;
        Self::new(chains)
    }

    /// Load a chain directory file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// The directory compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CHAINS)
    }

    /// Look up a chain by id.
    pub fn lookup(&self, chain_id: &str) -> Result<&ChainInfo> {
        self.index
            .get(chain_id)
            .map(|&position| &self.chains[position])
            .ok_or_else(|| AppError::NotFound(format!("unknown chain {}", chain_id)))
    }

    /// All chains in declaration order.
    pub fn list(&self) -> &[ChainInfo] {
        &self.chains
    }
}
