//! # Maintenance CLI
//!
//! Offline inspection and cleanup of persisted sessions. None of these
//! commands contact a wallet provider.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use lib_core::{ChainRegistry, SessionStore};
use lib_wallet::tester::{all_passed, run_checks};
use shared::dto::transaction::SigningResponse;
use shared::utils::truncate_chain_id;

#[derive(Parser)]
#[command(name = "multipass")]
#[command(about = "Inspect and maintain stored blockchain sessions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the chain directory
    Chains,

    /// List stored sessions
    Sessions {
        /// Only this chain
        #[arg(long)]
        chain_id: Option<String>,
    },

    /// Forget a stored session without contacting its wallet
    Forget {
        #[arg(long)]
        chain_id: String,

        #[arg(long)]
        actor: String,

        #[arg(long)]
        permission: String,

        /// Only the entry stored for this provider
        #[arg(long)]
        provider: Option<String>,
    },

    /// Delete stored sessions and recent-session pointers
    Clear {
        /// Only this chain
        #[arg(long)]
        chain_id: Option<String>,

        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Run the transaction checks over a saved signing response (JSON)
    Check {
        path: PathBuf,
    },
}

/// Print the chain directory, marking the default chain.
pub fn list_chains(
    out: &mut impl Write,
    chains: &ChainRegistry,
    default_chain_id: &str,
) -> anyhow::Result<()> {
    for chain in chains.list() {
        let marker = if chain.chain_id == default_chain_id {
            "*"
        } else {
            " "
        };
        let endpoint = chain
            .primary_endpoint()
            .map(|e| e.url())
            .unwrap_or_default();
        writeln!(
            out,
            "{} {:<16} {:<16} {}",
            marker,
            chain.name,
            truncate_chain_id(&chain.chain_id),
            endpoint
        )?;
    }
    Ok(())
}

/// Print stored sessions, newest first, marking the most recent one.
pub fn list_sessions(
    out: &mut impl Write,
    store: &SessionStore,
    chains: &ChainRegistry,
    chain_id: Option<&str>,
) -> anyhow::Result<()> {
    let chain_ids = match chain_id {
        Some(id) => vec![id.to_string()],
        None => store.chains_with_sessions(),
    };

    if chain_ids.is_empty() {
        writeln!(out, "No stored sessions.")?;
        return Ok(());
    }

    for chain_id in chain_ids {
        let name = chains
            .lookup(&chain_id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|_| "unknown chain".to_string());
        writeln!(out, "{} ({})", name, truncate_chain_id(&chain_id))?;

        let sessions = store.list_sessions(&chain_id);
        if sessions.is_empty() {
            writeln!(out, "  (none)")?;
            continue;
        }

        let recent = store.get_recent(&chain_id);
        for session in sessions {
            let marker = if recent.as_ref().is_some_and(|r| r == &session) {
                "*"
            } else {
                " "
            };
            writeln!(out, "  {} {}", marker, session)?;
        }
    }
    Ok(())
}

/// Remove matching sessions from storage. Returns how many were removed.
pub fn forget(
    out: &mut impl Write,
    store: &SessionStore,
    chain_id: &str,
    actor: &str,
    permission: &str,
    provider: Option<&str>,
) -> anyhow::Result<usize> {
    let matching: Vec<_> = store
        .list_sessions(chain_id)
        .into_iter()
        .filter(|s| s.actor == actor && s.permission == permission)
        .filter(|s| provider.map_or(true, |p| s.provider == p))
        .collect();

    if matching.is_empty() {
        bail!(
            "no stored session {}@{} on chain {}",
            actor,
            permission,
            truncate_chain_id(chain_id)
        );
    }

    for session in &matching {
        store.remove_session(chain_id, session);
        writeln!(out, "Forgot {}", session)?;
    }
    Ok(matching.len())
}

/// Clear stored sessions after confirmation. Returns how many chains were cleared.
pub fn clear(
    out: &mut impl Write,
    input: &mut impl BufRead,
    store: &SessionStore,
    chain_id: Option<&str>,
    yes: bool,
) -> anyhow::Result<usize> {
    let chain_ids = match chain_id {
        Some(id) => vec![id.to_string()],
        None => store.chains_with_sessions(),
    };

    let total: usize = chain_ids
        .iter()
        .map(|id| store.list_sessions(id).len())
        .sum();
    if total == 0 {
        writeln!(out, "No stored sessions.")?;
        writeln!(out, "Nothing to delete.")?;
        return Ok(0);
    }

    writeln!(
        out,
        "Found {} session(s) on {} chain(s).",
        total,
        chain_ids.len()
    )?;

    if !yes {
        write!(out, "Are you sure you want to delete them? (yes/no): ")?;
        out.flush()?;

        let mut confirmation = String::new();
        input.read_line(&mut confirmation)?;
        let confirmation = confirmation.trim().to_lowercase();

        if confirmation != "yes" && confirmation != "y" {
            writeln!(out, "Operation cancelled.")?;
            return Ok(0);
        }
    }

    for id in &chain_ids {
        store.clear_chain(id);
    }
    writeln!(out, "Cleared {} chain(s).", chain_ids.len())?;
    Ok(chain_ids.len())
}

/// Check a saved signing response. Returns whether every check passed.
pub fn check(out: &mut impl Write, path: &Path) -> anyhow::Result<bool> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let response: SigningResponse = serde_json::from_str(&json)
        .with_context(|| format!("{} is not a signing response", path.display()))?;

    let results = run_checks(&response);
    for result in &results {
        let status = if result.passed { "PASS" } else { "FAIL" };
        writeln!(out, "[{}] {} - {}", status, result.name, result.description)?;
        if !result.evidence.is_null() {
            writeln!(out, "{}", serde_json::to_string_pretty(&result.evidence)?)?;
        }
    }

    Ok(all_passed(&results))
}
