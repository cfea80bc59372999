use serde::{Deserialize, Serialize};

/// RPC endpoint descriptor for a chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RpcEndpoint {
    pub protocol: String,
    pub host: String,
    pub port: u16,
}

impl RpcEndpoint {
    /// Endpoint as a URL, e.g. `https://eos.greymass.com:443`.
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }
}

/// Chain directory entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChainInfo {
    pub chain_id: String,
    pub name: String,
    pub rpc_endpoints: Vec<RpcEndpoint>,
}

impl ChainInfo {
    /// The endpoint used for provider setup (the first listed).
    pub fn primary_endpoint(&self) -> Option<&RpcEndpoint> {
        self.rpc_endpoints.first()
    }
}
