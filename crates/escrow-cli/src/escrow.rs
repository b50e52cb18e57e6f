//! # Escrow Subcommands
//!
//! Escrow lifecycle over the local state file.
//!
//! - `deploy`: Open a ledger, debiting the payer.
//! - `release`: Arbiter pays the custodied funds to the payee.
//! - `refund`: Arbiter returns the custodied funds to the payer.
//! - `status`: Show one ledger.
//! - `list`: List all ledgers.
//!
//! Each mutating command takes the state lock, loads the state, runs one
//! ledger operation against an in-memory environment seeded from it, and
//! saves only if the operation succeeded. The lock is held until the save
//! lands, so concurrent invocations never settle one escrow twice or drop
//! each other's ledgers.

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;

use escrow_core::Address;
use escrow_ledger::{EscrowLedger, EscrowTerms, Operation};

use crate::state::{LocalState, StateLock};

/// Arguments for `escrow deploy`.
#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Funding account; debited by the escrow amount.
    #[arg(long)]
    pub payer: String,
    /// Account paid on release.
    #[arg(long)]
    pub payee: String,
    /// Account authorized to release or refund.
    #[arg(long)]
    pub arbiter: String,
    /// Escrow amount as a decimal in the configured unit (e.g. "1.0").
    #[arg(long)]
    pub amount: String,
    /// Name to refer to the escrow by. Defaults to its UUID.
    #[arg(long)]
    pub name: Option<String>,
}

/// Arguments for `escrow release` and `escrow refund`.
#[derive(Args, Debug)]
pub struct SettleArgs {
    /// Escrow name.
    #[arg(long)]
    pub name: String,
    /// Account invoking the operation.
    #[arg(long)]
    pub caller: String,
}

/// Arguments for `escrow status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Escrow name.
    #[arg(long)]
    pub name: String,
}

fn parse_address(value: &str, flag: &str) -> Result<Address> {
    Address::new(value).with_context(|| format!("invalid --{flag}"))
}

/// Execute `escrow deploy`.
pub fn run_deploy(args: &DeployArgs, state_dir: &Path) -> Result<u8> {
    let payer = parse_address(&args.payer, "payer")?;
    let payee = parse_address(&args.payee, "payee")?;
    let arbiter = parse_address(&args.arbiter, "arbiter")?;

    let lock = StateLock::acquire(state_dir)?;
    let mut state = LocalState::load(state_dir)?;
    let amount = state.unit.parse(&args.amount)?;

    if let Some(name) = &args.name {
        if name.trim().is_empty() {
            bail!("escrow name must not be empty");
        }
        if state.ledgers.contains_key(name) {
            bail!("escrow already exists: {name}");
        }
    }

    println!("Deploying contract with the following accounts:");
    println!("  Payer (deployer): {payer}");
    println!("  Payee: {payee}");
    println!("  Arbiter: {arbiter}");
    println!("  Escrow Amount: {}", state.unit.format(amount));

    let env = state.environment();
    let ledger = EscrowLedger::open(EscrowTerms::new(payer, payee, arbiter, amount), &env)
        .context("deployment failed")?;
    let id = ledger.id().clone();
    let name = args
        .name
        .clone()
        .unwrap_or_else(|| id.as_uuid().to_string());

    state.ledgers.insert(name.clone(), ledger);
    state.absorb(&env);
    state.save(&lock)?;
    drop(lock);

    println!();
    println!("Contract deployed successfully!");
    println!("  Escrow: {name} ({id})");
    Ok(0)
}

/// Execute `escrow release`.
pub fn run_release(args: &SettleArgs, state_dir: &Path) -> Result<u8> {
    settle(args, state_dir, Operation::Release)
}

/// Execute `escrow refund`.
pub fn run_refund(args: &SettleArgs, state_dir: &Path) -> Result<u8> {
    settle(args, state_dir, Operation::Refund)
}

fn settle(args: &SettleArgs, state_dir: &Path, operation: Operation) -> Result<u8> {
    let caller = parse_address(&args.caller, "caller")?;
    let lock = StateLock::acquire(state_dir)?;
    let mut state = LocalState::load(state_dir)?;
    let env = state.environment();

    let ledger = state
        .ledgers
        .get_mut(&args.name)
        .with_context(|| format!("escrow not found: {}", args.name))?;
    let receipt = match operation {
        Operation::Release => ledger.release(&caller, &env),
        Operation::Refund => ledger.refund(&caller, &env),
    }
    .with_context(|| format!("{operation} of escrow {} failed", args.name))?;

    state.absorb(&env);
    state.save(&lock)?;
    drop(lock);

    println!(
        "OK: escrow {} {} {} to {}",
        args.name,
        receipt.outcome,
        state.unit.format(receipt.amount),
        receipt.recipient
    );
    println!("  Receipt: {}", receipt.digest);
    Ok(0)
}

/// Execute `escrow status`.
pub fn run_status(args: &StatusArgs, state_dir: &Path) -> Result<u8> {
    let state = LocalState::load(state_dir)?;
    let ledger = state.ledger(&args.name)?;
    let snapshot = ledger.inspect();

    println!("Escrow: {} ({})", args.name, snapshot.id);
    println!("  Status: {}", ledger.status());
    println!("  Payer: {}", snapshot.payer);
    println!("  Payee: {}", snapshot.payee);
    println!("  Arbiter: {}", snapshot.arbiter);
    println!("  Amount: {}", state.unit.format(snapshot.amount));
    println!("  Custody: {}", state.unit.format(snapshot.custody));
    println!("  Settled: {}", snapshot.settled);
    if let Some(outcome) = snapshot.outcome {
        println!("  Outcome: {outcome}");
    }
    println!("  Created: {}", snapshot.created_at);
    if let Some(receipt) = ledger.receipt() {
        println!("  Settled at: {}", receipt.settled_at);
        println!("  Receipt: {}", receipt.digest);
    }
    Ok(0)
}

/// Execute `escrow list`.
pub fn run_list(state_dir: &Path) -> Result<u8> {
    let state = LocalState::load(state_dir)?;
    if state.ledgers.is_empty() {
        println!("No escrows found.");
        return Ok(0);
    }

    println!("Escrows ({}):", state.ledgers.len());
    for (name, ledger) in &state.ledgers {
        println!(
            "  {name}: {} {}",
            ledger.status(),
            state.unit.format(ledger.amount())
        );
    }
    Ok(0)
}
