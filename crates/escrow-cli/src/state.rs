//! # Local State File
//!
//! The CLI's environment lives in one JSON document, `<state-dir>/state.json`,
//! holding the account book and every deployed ledger by name.
//!
//! ## Concurrency
//!
//! Mutating commands hold a [`StateLock`] (an exclusive advisory lock on
//! `<state-dir>/state.lock`) from load through save, so concurrent
//! invocations serialize their read-modify-write cycles. Saves write a
//! uniquely named temporary file in the state directory and rename it over
//! the state file: readers never see a partial document, and balances and
//! ledger flags always change together.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use escrow_core::{Address, Amount};
use escrow_ledger::{EscrowLedger, InMemoryBalances};

use crate::config::UnitConfig;

/// File name of the state document inside the state directory.
pub const STATE_FILE: &str = "state.json";

/// File name of the advisory lock inside the state directory.
pub const LOCK_FILE: &str = "state.lock";

/// Exclusive hold on a state directory. Released on drop.
#[derive(Debug)]
pub struct StateLock {
    dir: PathBuf,
    file: File,
}

impl StateLock {
    /// Block until the state directory's lock is held exclusively,
    /// creating the directory if needed.
    pub fn acquire(state_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(state_dir).with_context(|| {
            format!("failed to create state directory {}", state_dir.display())
        })?;
        let path = state_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        file.lock_exclusive()
            .with_context(|| format!("failed to lock {}", path.display()))?;
        tracing::trace!(path = %path.display(), "state lock acquired");
        Ok(Self {
            dir: state_dir.to_path_buf(),
            file,
        })
    }

    /// The locked state directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        // Closing the handle releases the lock too; unlock eagerly anyway.
        let _ = FileExt::unlock(&self.file);
    }
}

/// Everything the local environment persists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalState {
    /// Unit recorded at `init`; used by every later command.
    pub unit: UnitConfig,
    /// Account balances.
    pub balances: BTreeMap<Address, Amount>,
    /// Deployed ledgers by name.
    pub ledgers: BTreeMap<String, EscrowLedger>,
}

impl LocalState {
    /// Fresh state with the given unit and balances and no ledgers.
    pub fn new(unit: UnitConfig, balances: BTreeMap<Address, Amount>) -> Self {
        Self {
            unit,
            balances,
            ledgers: BTreeMap::new(),
        }
    }

    /// Path of the state file inside `state_dir`.
    pub fn path(state_dir: &Path) -> PathBuf {
        state_dir.join(STATE_FILE)
    }

    /// Whether a state file exists in `state_dir`.
    pub fn exists(state_dir: &Path) -> bool {
        Self::path(state_dir).is_file()
    }

    /// Load and integrity-check the state in `state_dir`.
    ///
    /// Callers that will [`save`](Self::save) must hold the directory's
    /// [`StateLock`] before loading.
    pub fn load(state_dir: &Path) -> Result<Self> {
        let path = Self::path(state_dir);
        if !path.is_file() {
            bail!(
                "no escrow state at {} (run `escrow init` first)",
                path.display()
            );
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let state: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        for (name, ledger) in &state.ledgers {
            ledger
                .verify_integrity()
                .with_context(|| format!("escrow {name} failed integrity check"))?;
        }
        Ok(state)
    }

    /// Atomically replace the state file in the locked directory.
    pub fn save(&self, lock: &StateLock) -> Result<()> {
        let dir = lock.dir();
        let path = Self::path(dir);
        let json = serde_json::to_string_pretty(self)?;

        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;
        tmp.write_all(json.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .with_context(|| format!("failed to write {}", tmp.path().display()))?;
        tmp.persist(&path)
            .map_err(|e| e.error)
            .with_context(|| format!("failed to replace {}", path.display()))?;

        tracing::debug!(path = %path.display(), ledgers = self.ledgers.len(), "state saved");
        Ok(())
    }

    /// An environment seeded with the persisted balances.
    pub fn environment(&self) -> InMemoryBalances {
        InMemoryBalances::from_snapshot(self.balances.clone())
    }

    /// Copy the environment's balances back into the state.
    pub fn absorb(&mut self, env: &InMemoryBalances) {
        self.balances = env.snapshot();
    }

    /// Look up a ledger by name.
    pub fn ledger(&self, name: &str) -> Result<&EscrowLedger> {
        self.ledgers
            .get(name)
            .with_context(|| format!("escrow not found: {name}"))
    }
}
