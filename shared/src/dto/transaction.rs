use serde::{Deserialize, Serialize};

use super::session::PermissionLevel;

/// A contract action to be signed.
///
/// `data` is the unserialized action payload; packing it is the provider's job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Action {
    pub account: String,
    pub name: String,
    pub authorization: Vec<PermissionLevel>,
    pub data: serde_json::Value,
}

/// Options passed through to a provider's `transact`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransactOptions {
    /// Whether the provider should broadcast after signing
    pub broadcast: bool,
    /// TAPOS: how many blocks behind head to reference
    pub blocks_behind: u32,
    /// Seconds until the transaction expires
    pub expire_seconds: u32,
}

impl Default for TransactOptions {
    fn default() -> Self {
        Self {
            broadcast: true,
            blocks_behind: 3,
            expire_seconds: 30,
        }
    }
}

/// Result of a provider `transact` call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SigningResponse {
    pub signatures: Vec<String>,
    #[serde(with = "hex::serde")]
    pub serialized_transaction: Vec<u8>,
}
