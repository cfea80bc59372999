//! # Multipass Maintenance Utility
//!
//! Inspect and clean up stored sessions without a wallet attached.
//!
//! ## Usage
//!
//! ```bash
//! multipass chains
//! multipass sessions --chain-id aca376f2...
//! multipass forget --chain-id aca376f2... --actor alice --permission active
//! multipass clear --yes
//! multipass check response.json
//! ```
//!
//! Configuration is read from the environment (and `.env`); see
//! `lib_core::config`.

use std::io;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use lib_core::config::{core_config, init_config};
use lib_core::{ChainRegistry, FileStore, SessionStore};
use multipass::cli::{self, Cli, Command};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = multipass::debug::init();

    let cli = Cli::parse();

    init_config()
        .map_err(anyhow::Error::msg)
        .context("invalid configuration")?;
    let config = core_config();

    let chains = match &config.chains_file {
        Some(path) => ChainRegistry::from_file(path)?,
        None => ChainRegistry::builtin()?,
    };
    let backend = Arc::new(FileStore::open(&config.storage_path)?);
    let store = SessionStore::new(
        backend,
        config.storage_namespace.clone(),
        config.dedup_policy,
    );

    tracing::debug!(
        storage = %config.storage_path.display(),
        namespace = %config.storage_namespace,
        session_key = %config.dedup_policy,
        "Opened session storage"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Chains => cli::list_chains(&mut out, &chains, &config.default_chain_id)?,
        Command::Sessions { chain_id } => {
            cli::list_sessions(&mut out, &store, &chains, chain_id.as_deref())?
        }
        Command::Forget {
            chain_id,
            actor,
            permission,
            provider,
        } => {
            cli::forget(
                &mut out,
                &store,
                &chain_id,
                &actor,
                &permission,
                provider.as_deref(),
            )?;
        }
        Command::Clear { chain_id, yes } => {
            let stdin = io::stdin();
            cli::clear(
                &mut out,
                &mut stdin.lock(),
                &store,
                chain_id.as_deref(),
                yes,
            )?;
        }
        Command::Check { path } => {
            if !cli::check(&mut out, &path)? {
                anyhow::bail!("signing response failed one or more checks");
            }
        }
    }

    Ok(())
}
