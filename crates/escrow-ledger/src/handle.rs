//! # Shared Ledger Handle
//!
//! [`LedgerHandle`] owns one [`EscrowLedger`] together with the environment
//! it settles against, and can be cloned freely across threads.
//!
//! Every settlement runs its authorization check, settled check, credit and
//! commit under a single `parking_lot::Mutex` guard, so of any number of
//! concurrent release/refund calls exactly one can succeed. The environment
//! is never locked by the handle itself; it serializes its own calls.

use std::sync::Arc;

use parking_lot::Mutex;

use escrow_core::Address;

use crate::error::EscrowError;
use crate::ledger::{EscrowId, EscrowLedger, EscrowTerms, LedgerSnapshot};
use crate::receipt::SettlementReceipt;
use crate::transfer::ValueTransfer;

/// Thread-safe, cloneable owner of a single escrow ledger.
#[derive(Debug)]
pub struct LedgerHandle<T: ValueTransfer> {
    id: EscrowId,
    ledger: Arc<Mutex<EscrowLedger>>,
    env: Arc<T>,
}

impl<T: ValueTransfer> Clone for LedgerHandle<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            ledger: Arc::clone(&self.ledger),
            env: Arc::clone(&self.env),
        }
    }
}

impl<T: ValueTransfer> LedgerHandle<T> {
    /// Open a new ledger, debiting the payer through `env`.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`EscrowLedger::open`].
    pub fn construct(terms: EscrowTerms, env: Arc<T>) -> Result<Self, EscrowError> {
        let ledger = EscrowLedger::open(terms, env.as_ref())?;
        Ok(Self::from_ledger(ledger, env))
    }

    /// Wrap an existing ledger, e.g. one loaded from storage.
    pub fn from_ledger(ledger: EscrowLedger, env: Arc<T>) -> Self {
        Self {
            id: ledger.id().clone(),
            ledger: Arc::new(Mutex::new(ledger)),
            env,
        }
    }

    /// Release the funds to the payee. See [`EscrowLedger::release`].
    pub fn release(&self, caller: &Address) -> Result<SettlementReceipt, EscrowError> {
        let mut ledger = self.ledger.lock();
        ledger.release(caller, self.env.as_ref())
    }

    /// Refund the funds to the payer. See [`EscrowLedger::refund`].
    pub fn refund(&self, caller: &Address) -> Result<SettlementReceipt, EscrowError> {
        let mut ledger = self.ledger.lock();
        ledger.refund(caller, self.env.as_ref())
    }

    /// Consistent snapshot of the ledger.
    pub fn inspect(&self) -> LedgerSnapshot {
        self.ledger.lock().inspect()
    }

    /// Clone of the full ledger, for persistence.
    pub fn ledger(&self) -> EscrowLedger {
        self.ledger.lock().clone()
    }

    /// Ledger identifier. Does not take the lock.
    pub fn id(&self) -> &EscrowId {
        &self.id
    }

    /// The environment this handle settles against.
    pub fn environment(&self) -> &Arc<T> {
        &self.env
    }
}
