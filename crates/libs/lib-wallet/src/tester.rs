//! # Transaction Tester
//!
//! Sanity checks over a provider's signing response. Checks run in a fixed
//! order and never fail as a whole; a decode error only fails its own check.

use serde::Serialize;
use serde_json::Value;
use shared::dto::transaction::SigningResponse;

use crate::codec::Transaction;

/// Outcome of one check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub name: &'static str,
    pub description: &'static str,
    pub passed: bool,
    /// What the check looked at; `null` when there was nothing to show.
    pub evidence: Value,
}

/// Run all checks against `response`.
pub fn run_checks(response: &SigningResponse) -> Vec<CheckResult> {
    vec![
        check_signatures(response),
        check_serialized(response),
        check_deserialized(response),
    ]
}

pub fn all_passed(results: &[CheckResult]) -> bool {
    results.iter().all(|r| r.passed)
}

fn check_signatures(response: &SigningResponse) -> CheckResult {
    CheckResult {
        name: "signatures",
        description: "Response contains at least one signature",
        passed: !response.signatures.is_empty(),
        evidence: if response.signatures.is_empty() {
            Value::Null
        } else {
            Value::from(response.signatures.clone())
        },
    }
}

fn check_serialized(response: &SigningResponse) -> CheckResult {
    let bytes = &response.serialized_transaction;
    CheckResult {
        name: "serialized_transaction",
        description: "Response contains the serialized transaction",
        passed: !bytes.is_empty(),
        evidence: if bytes.is_empty() {
            Value::Null
        } else {
            Value::from(hex::encode(bytes))
        },
    }
}

fn check_deserialized(response: &SigningResponse) -> CheckResult {
    let decoded = Transaction::decode(&response.serialized_transaction).ok();

    let passed = decoded.as_ref().is_some_and(|tx| {
        tx.expiration != 0
            && !tx.actions.is_empty()
            && tx.ref_block_num > 0
            && tx.ref_block_prefix > 0
    });

    CheckResult {
        name: "deserialized_transaction",
        description: "Serialized transaction decodes with expiration, TAPOS and actions",
        passed,
        evidence: decoded
            .and_then(|tx| serde_json::to_value(tx).ok())
            .unwrap_or(Value::Null),
    }
}
