//! # Value Transfer
//!
//! The ledger never owns account balances. The owning environment moves
//! value through the [`ValueTransfer`] trait: it debits the payer when a
//! ledger is opened and credits the recipient when it settles.
//!
//! [`InMemoryBalances`] is the in-process environment used by the CLI and
//! the test suites. Balances live in a `parking_lot::RwLock`, which never
//! poisons and is never held across a call back into the ledger.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use thiserror::Error;

use escrow_core::{Address, Amount};

/// The environment refused a debit or credit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// The debited account holds less than the requested amount.
    #[error("account {account} holds {available}, cannot debit {requested}")]
    InsufficientFunds {
        /// The debited account.
        account: Address,
        /// The requested debit.
        requested: Amount,
        /// The balance at the time of the request.
        available: Amount,
    },

    /// Crediting the account would overflow its balance.
    #[error("crediting {amount} to {account} overflows its balance")]
    Overflow {
        /// The credited account.
        account: Address,
        /// The requested credit.
        amount: Amount,
    },
}

/// Moves value between accounts on behalf of an escrow ledger.
///
/// Implementations use interior mutability so one environment can be shared
/// by every handle and thread that settles against it. Each call either
/// applies completely or returns an error with balances untouched.
pub trait ValueTransfer: Send + Sync {
    /// Remove `amount` from `from`'s balance.
    fn debit(&self, from: &Address, amount: Amount) -> Result<(), TransferError>;

    /// Add `amount` to `to`'s balance.
    fn credit(&self, to: &Address, amount: Amount) -> Result<(), TransferError>;

    /// Current balance of `account` (zero for unknown accounts).
    fn balance_of(&self, account: &Address) -> Amount;
}

/// Thread-safe in-memory account book.
#[derive(Debug, Default)]
pub struct InMemoryBalances {
    accounts: RwLock<BTreeMap<Address, Amount>>,
}

impl InMemoryBalances {
    /// Create an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a book seeded with the given balances. Later entries for the
    /// same address replace earlier ones.
    pub fn with_accounts(accounts: impl IntoIterator<Item = (Address, Amount)>) -> Self {
        Self {
            accounts: RwLock::new(accounts.into_iter().collect()),
        }
    }

    /// Rebuild a book from a [`snapshot`](Self::snapshot).
    pub fn from_snapshot(snapshot: BTreeMap<Address, Amount>) -> Self {
        Self {
            accounts: RwLock::new(snapshot),
        }
    }

    /// Overwrite an account's balance.
    pub fn set_balance(&self, account: Address, amount: Amount) {
        self.accounts.write().insert(account, amount);
    }

    /// Copy of every balance, sorted by address.
    pub fn snapshot(&self) -> BTreeMap<Address, Amount> {
        self.accounts.read().clone()
    }

    /// Sum of all balances, or `None` if the sum overflows.
    pub fn total(&self) -> Option<Amount> {
        self.accounts
            .read()
            .values()
            .try_fold(Amount::ZERO, |acc, v| acc.checked_add(*v).ok())
    }
}

impl ValueTransfer for InMemoryBalances {
    fn debit(&self, from: &Address, amount: Amount) -> Result<(), TransferError> {
        let mut accounts = self.accounts.write();
        let available = accounts.get(from).copied().unwrap_or_default();
        let remaining =
            available
                .checked_sub(amount)
                .map_err(|_| TransferError::InsufficientFunds {
                    account: from.clone(),
                    requested: amount,
                    available,
                })?;
        accounts.insert(from.clone(), remaining);
        tracing::debug!(account = %from, %amount, balance = %remaining, "debited");
        Ok(())
    }

    fn credit(&self, to: &Address, amount: Amount) -> Result<(), TransferError> {
        let mut accounts = self.accounts.write();
        let current = accounts.get(to).copied().unwrap_or_default();
        let updated = current
            .checked_add(amount)
            .map_err(|_| TransferError::Overflow {
                account: to.clone(),
                amount,
            })?;
        accounts.insert(to.clone(), updated);
        tracing::debug!(account = %to, %amount, balance = %updated, "credited");
        Ok(())
    }

    fn balance_of(&self, account: &Address) -> Amount {
        self.accounts
            .read()
            .get(account)
            .copied()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(tail: char) -> Address {
        Address::new(format!("0x{}", tail.to_string().repeat(40))).unwrap()
    }

    fn units(n: u128) -> Amount {
        Amount::from_units(n)
    }

    #[test]
    fn unknown_account_has_zero_balance() {
        let book = InMemoryBalances::new();
        assert_eq!(book.balance_of(&addr('1')), Amount::ZERO);
        assert!(book.snapshot().is_empty());
    }

    #[test]
    fn debit_reduces_balance() {
        let book = InMemoryBalances::with_accounts([(addr('1'), units(100))]);
        book.debit(&addr('1'), units(40)).unwrap();
        assert_eq!(book.balance_of(&addr('1')), units(60));
    }

    #[test]
    fn debit_beyond_balance_is_rejected_without_effect() {
        let book = InMemoryBalances::with_accounts([(addr('1'), units(10))]);
        let err = book.debit(&addr('1'), units(11)).unwrap_err();
        assert_eq!(
            err,
            TransferError::InsufficientFunds {
                account: addr('1'),
                requested: units(11),
                available: units(10),
            }
        );
        assert_eq!(book.balance_of(&addr('1')), units(10));
    }

    #[test]
    fn credit_creates_account() {
        let book = InMemoryBalances::new();
        book.credit(&addr('2'), units(5)).unwrap();
        assert_eq!(book.balance_of(&addr('2')), units(5));
        assert_eq!(book.snapshot().len(), 1);
    }

    #[test]
    fn credit_overflow_is_rejected_without_effect() {
        let book = InMemoryBalances::with_accounts([(addr('2'), units(u128::MAX))]);
        let err = book.credit(&addr('2'), units(1)).unwrap_err();
        assert!(matches!(err, TransferError::Overflow { .. }));
        assert_eq!(book.balance_of(&addr('2')), units(u128::MAX));
    }

    #[test]
    fn total_sums_all_balances() {
        let book = InMemoryBalances::with_accounts([(addr('1'), units(3)), (addr('2'), units(4))]);
        assert_eq!(book.total(), Some(units(7)));
    }

    #[test]
    fn total_reports_overflow_as_none() {
        let book =
            InMemoryBalances::with_accounts([(addr('1'), units(u128::MAX)), (addr('2'), units(1))]);
        assert_eq!(book.total(), None);
    }

    #[test]
    fn snapshot_roundtrip() {
        let book = InMemoryBalances::with_accounts([(addr('1'), units(3))]);
        book.set_balance(addr('2'), units(9));
        let restored = InMemoryBalances::from_snapshot(book.snapshot());
        assert_eq!(restored.balance_of(&addr('2')), units(9));
        assert_eq!(restored.snapshot(), book.snapshot());
    }

    #[test]
    fn snapshot_serializes_as_string_map() {
        let book = InMemoryBalances::with_accounts([(addr('1'), units(3))]);
        let json = serde_json::to_string(&book.snapshot()).unwrap();
        assert_eq!(json, format!("{{\"0x{}\":\"3\"}}", "1".repeat(40)));
        let back: BTreeMap<Address, Amount> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, book.snapshot());
    }
}
