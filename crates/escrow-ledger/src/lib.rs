//! # escrow-ledger: Arbiter Escrow State Machine
//!
//! A payer deposits funds when the escrow is constructed; a designated
//! arbiter later decides, exactly once, whether the funds are released to
//! the payee or refunded to the payer.
//!
//! - **Ledger** ([`ledger`]): The [`EscrowLedger`] state machine
//!   (`Unsettled → Settled`), its terms, roles and read-only snapshot.
//!
//! - **Transfer** ([`transfer`]): The [`ValueTransfer`] seam through which
//!   the owning environment moves value, and the [`InMemoryBalances`] book.
//!
//! - **Handle** ([`handle`]): [`LedgerHandle`], the shared owner of one
//!   ledger that serializes concurrent settlement attempts.
//!
//! - **Receipt** ([`receipt`]): Digest-stamped [`SettlementReceipt`]s.
//!
//! ## Crate Policy
//!
//! - Depends only on `escrow-core` internally.
//! - Every failed operation leaves ledger state and balances unchanged.
//! - Authorization is checked before settlement state.

pub mod error;
pub mod handle;
pub mod ledger;
pub mod receipt;
pub mod transfer;

// Re-export primary types.
pub use error::EscrowError;
pub use handle::LedgerHandle;
pub use ledger::{
    EscrowId, EscrowLedger, EscrowStatus, EscrowTerms, LedgerSnapshot, Operation, Role,
    SettlementOutcome,
};
pub use receipt::SettlementReceipt;
pub use transfer::{InMemoryBalances, TransferError, ValueTransfer};
