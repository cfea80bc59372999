//! Builder for the demo transaction signed to prove a session works.

use serde_json::json;
use shared::dto::session::PermissionLevel;
use shared::dto::transaction::{Action, TransactOptions};

/// Proxy the demo vote is delegated to.
pub const TEST_VOTE_PROXY: &str = "greymassvote";

/// `eosio::voteproducer` delegating `auth`'s vote to [`TEST_VOTE_PROXY`].
pub fn test_vote_action(auth: &PermissionLevel) -> Action {
    Action {
        account: "eosio".to_string(),
        name: "voteproducer".to_string(),
        authorization: vec![auth.clone()],
        data: json!({
            "voter": auth.actor,
            "proxy": TEST_VOTE_PROXY,
            "producers": [],
        }),
    }
}

/// Sign only; the demo transaction is never broadcast.
pub fn test_transact_options() -> TransactOptions {
    TransactOptions {
        broadcast: false,
        blocks_behind: 3,
        expire_seconds: 120,
    }
}
