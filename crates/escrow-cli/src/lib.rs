//! # escrow-cli: Arbiter Escrow Command-Line Interface
//!
//! Provides the `escrow` binary: a local, file-backed environment in which
//! escrows can be deployed and settled the way a chain deployment script
//! and its test accounts would.
//!
//! ## Subcommands
//!
//! - `escrow init`: Seed the account book from the environment config.
//! - `escrow deploy`: Open an escrow, debiting the payer.
//! - `escrow release` / `escrow refund`: Arbiter settlement.
//! - `escrow status` / `escrow list`: Inspect deployed escrows.
//! - `escrow balance`: Show an account balance.
//!
//! ```bash
//! escrow --config env.yaml init
//! escrow deploy --payer 0xf39f... --payee 0x7099... --arbiter 0x3c44... --amount 1.0 --name job
//! escrow release --name job --caller 0x3c44...
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from the handlers; handlers return an
//!   exit code and never call `process::exit`.
//! - Ledger rules live in `escrow-ledger`; handlers only load, apply one
//!   operation, and save.

pub mod account;
pub mod config;
pub mod escrow;
pub mod state;

use std::path::{Path, PathBuf};

/// Default state directory, relative to the current directory.
pub const DEFAULT_STATE_DIR: &str = ".escrow";

/// Resolve a path that may be relative to the current directory.
pub fn resolve_path(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_paths_are_kept() {
        let abs = std::env::temp_dir().join("state");
        assert_eq!(resolve_path(&abs, Path::new("/elsewhere")), abs);
    }

    #[test]
    fn relative_paths_join_cwd() {
        let cwd = std::env::temp_dir();
        assert_eq!(
            resolve_path(Path::new(".escrow"), &cwd),
            cwd.join(".escrow")
        );
    }
}
