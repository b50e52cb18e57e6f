//! # escrow CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use escrow_cli::account::{run_balance, run_init, BalanceArgs, InitArgs};
use escrow_cli::config::EnvConfig;
use escrow_cli::escrow::{
    run_deploy, run_list, run_refund, run_release, run_status, DeployArgs, SettleArgs, StatusArgs,
};
use escrow_cli::{resolve_path, DEFAULT_STATE_DIR};

/// Arbiter escrow CLI.
///
/// Deploys three-party escrows into a local account book and lets the
/// arbiter release them to the payee or refund them to the payer.
#[derive(Parser, Debug)]
#[command(name = "escrow", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the environment configuration (YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the local state file.
    #[arg(long, global = true, default_value = DEFAULT_STATE_DIR)]
    state_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Seed the local account book from the environment configuration.
    Init(InitArgs),

    /// Deploy an escrow, debiting the payer by the escrow amount.
    Deploy(DeployArgs),

    /// Release an escrow's funds to the payee (arbiter only).
    Release(SettleArgs),

    /// Refund an escrow's funds to the payer (arbiter only).
    Refund(SettleArgs),

    /// Show one escrow.
    Status(StatusArgs),

    /// List all escrows.
    List,

    /// Show an account balance.
    Balance(BalanceArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let state_dir = resolve_path(&cli.state_dir, &cwd);
    tracing::debug!(state_dir = %state_dir.display(), "resolved state directory");

    match cli.command {
        Commands::Init(args) => {
            let config_path = cli.config.as_deref().map(|p| resolve_path(p, &cwd));
            let config = EnvConfig::load(config_path.as_deref())?;
            run_init(&args, &state_dir, &config)
        }
        Commands::Deploy(args) => run_deploy(&args, &state_dir),
        Commands::Release(args) => run_release(&args, &state_dir),
        Commands::Refund(args) => run_refund(&args, &state_dir),
        Commands::Status(args) => run_status(&args, &state_dir),
        Commands::List => run_list(&state_dir),
        Commands::Balance(args) => run_balance(&args, &state_dir),
    }
}
