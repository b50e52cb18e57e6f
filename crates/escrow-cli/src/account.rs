//! # Account Subcommands
//!
//! - `init`: Seed the local account book from the environment config.
//! - `balance`: Show one account's balance.

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;

use escrow_core::Address;

use crate::config::EnvConfig;
use crate::state::{LocalState, StateLock};

/// Arguments for `escrow init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite existing state, discarding every deployed escrow.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for `escrow balance`.
#[derive(Args, Debug)]
pub struct BalanceArgs {
    /// Account address.
    #[arg(long)]
    pub account: String,
}

/// Execute `escrow init`.
pub fn run_init(args: &InitArgs, state_dir: &Path, config: &EnvConfig) -> Result<u8> {
    let lock = StateLock::acquire(state_dir)?;
    if LocalState::exists(state_dir) && !args.force {
        bail!(
            "escrow state already exists in {} (use --force to overwrite)",
            state_dir.display()
        );
    }
    let balances = config.balances()?;
    let state = LocalState::new(config.unit.clone(), balances);
    state.save(&lock)?;
    drop(lock);

    tracing::info!(
        state_dir = %state_dir.display(),
        accounts = state.balances.len(),
        "initialized escrow state"
    );
    println!(
        "OK: initialized {} with {} account(s)",
        state_dir.display(),
        state.balances.len()
    );
    for (address, balance) in &state.balances {
        println!("  {address}: {}", state.unit.format(*balance));
    }
    Ok(0)
}

/// Execute `escrow balance`.
pub fn run_balance(args: &BalanceArgs, state_dir: &Path) -> Result<u8> {
    let account = Address::new(args.account.as_str()).context("invalid --account")?;
    let state = LocalState::load(state_dir)?;
    let balance = state.balances.get(&account).copied().unwrap_or_default();
    println!("{account}: {}", state.unit.format(balance));
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AccountConfig, UnitConfig};
    use escrow_core::Amount;

    const PAYER: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

    fn config() -> EnvConfig {
        EnvConfig {
            unit: UnitConfig::default(),
            accounts: vec![AccountConfig {
                address: Address::new(PAYER).unwrap(),
                balance: "10.0".to_string(),
            }],
        }
    }

    #[test]
    fn init_seeds_balances() {
        let dir = tempfile::tempdir().unwrap();
        let state_dir = dir.path().join(".escrow");

        let code = run_init(&InitArgs { force: false }, &state_dir, &config()).unwrap();
        assert_eq!(code, 0);

        let state = LocalState::load(&state_dir).unwrap();
        let payer = Address::new(PAYER).unwrap();
        assert_eq!(
            state.balances[&payer],
            Amount::from_units(10 * 1_000_000_000_000_000_000)
        );
        assert!(state.ledgers.is_empty());
    }

    #[test]
    fn init_twice_requires_force() {
        let dir = tempfile::tempdir().unwrap();
        let state_dir = dir.path().join(".escrow");

        run_init(&InitArgs { force: false }, &state_dir, &config()).unwrap();
        let err = run_init(&InitArgs { force: false }, &state_dir, &config()).unwrap_err();
        assert!(err.to_string().contains("already exists"));

        let code = run_init(&InitArgs { force: true }, &state_dir, &EnvConfig::default()).unwrap();
        assert_eq!(code, 0);
        assert!(LocalState::load(&state_dir).unwrap().balances.is_empty());
    }

    #[test]
    fn balance_of_known_and_unknown_accounts() {
        let dir = tempfile::tempdir().unwrap();
        let state_dir = dir.path().join(".escrow");
        run_init(&InitArgs { force: false }, &state_dir, &config()).unwrap();

        let known = BalanceArgs {
            account: PAYER.to_string(),
        };
        assert_eq!(run_balance(&known, &state_dir).unwrap(), 0);

        let unknown = BalanceArgs {
            account: format!("0x{}", "9".repeat(40)),
        };
        assert_eq!(run_balance(&unknown, &state_dir).unwrap(), 0);
    }

    #[test]
    fn balance_rejects_bad_address() {
        let dir = tempfile::tempdir().unwrap();
        let state_dir = dir.path().join(".escrow");
        run_init(&InitArgs { force: false }, &state_dir, &config()).unwrap();

        let args = BalanceArgs {
            account: "not-an-address".to_string(),
        };
        let err = run_balance(&args, &state_dir).unwrap_err();
        assert!(err.to_string().contains("--account"));
    }

    #[test]
    fn balance_without_state_fails() {
        let dir = tempfile::tempdir().unwrap();
        let args = BalanceArgs {
            account: PAYER.to_string(),
        };
        assert!(run_balance(&args, dir.path()).is_err());
    }
}
