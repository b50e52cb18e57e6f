//! # Escrow Error Types
//!
//! Structured error hierarchy for ledger operations. Every variant carries
//! the context an operator needs: the roles that collided, the amounts that
//! disagreed, the caller that was refused, or the ledger that was already
//! settled.
//!
//! Display strings for the settlement guards keep the wording callers of
//! the escrow already match on: `Only arbiter can release`,
//! `Only arbiter can refund` and `Funds already released`.

use thiserror::Error;

use escrow_core::{Address, Amount, CanonicalizationError};

use crate::ledger::{EscrowId, Operation, Role, SettlementOutcome};
use crate::transfer::TransferError;

/// Errors arising from escrow ledger operations.
#[derive(Error, Debug)]
pub enum EscrowError {
    /// Two roles were bound to the same address at construction.
    #[error("{first_role} and {second_role} must be distinct parties, both are {address}")]
    InvalidParties {
        /// The first colliding role.
        first_role: Role,
        /// The second colliding role.
        second_role: Role,
        /// The shared address.
        address: Address,
    },

    /// The value deposited at construction differs from the stated amount.
    #[error("deposit of {deposited} does not match escrow amount {requested}")]
    AmountMismatch {
        /// The amount the terms declare.
        requested: Amount,
        /// The value actually deposited.
        deposited: Amount,
    },

    /// A caller other than the arbiter attempted settlement.
    #[error("Only arbiter can {operation}")]
    Unauthorized {
        /// The refused operation.
        operation: Operation,
        /// The refused caller.
        caller: Address,
    },

    /// Settlement was attempted on a ledger that is already settled.
    #[error("Funds already released")]
    AlreadySettled {
        /// The settled ledger.
        escrow_id: EscrowId,
        /// How it was settled.
        outcome: SettlementOutcome,
    },

    /// The environment refused to move value.
    #[error("value transfer failed: {0}")]
    Transfer(#[from] TransferError),

    /// A persisted ledger does not satisfy the ledger invariants.
    #[error("integrity violation in {escrow_id}: {reason}")]
    IntegrityViolation {
        /// The offending ledger.
        escrow_id: EscrowId,
        /// The violated invariant.
        reason: String,
    },

    /// Receipt canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

impl EscrowError {
    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidParties { .. } => "INVALID_PARTIES",
            Self::AmountMismatch { .. } => "AMOUNT_MISMATCH",
            Self::Unauthorized { .. } => "UNAUTHORIZED",
            Self::AlreadySettled { .. } => "ALREADY_SETTLED",
            Self::Transfer(_) => "TRANSFER_FAILED",
            Self::IntegrityViolation { .. } => "INTEGRITY_VIOLATION",
            Self::Canonicalization(_) => "CANONICALIZATION",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(tail: char) -> Address {
        Address::new(format!("0x{}", tail.to_string().repeat(40))).unwrap()
    }

    #[test]
    fn unauthorized_release_display_matches_guard_message() {
        let err = EscrowError::Unauthorized {
            operation: Operation::Release,
            caller: addr('1'),
        };
        assert_eq!(format!("{err}"), "Only arbiter can release");
        assert_eq!(err.code(), "UNAUTHORIZED");
    }

    #[test]
    fn unauthorized_refund_display() {
        let err = EscrowError::Unauthorized {
            operation: Operation::Refund,
            caller: addr('1'),
        };
        assert_eq!(format!("{err}"), "Only arbiter can refund");
    }

    #[test]
    fn already_settled_display_matches_guard_message() {
        let err = EscrowError::AlreadySettled {
            escrow_id: EscrowId::new(),
            outcome: SettlementOutcome::Refunded,
        };
        assert_eq!(format!("{err}"), "Funds already released");
        assert_eq!(err.code(), "ALREADY_SETTLED");
    }

    #[test]
    fn invalid_parties_display_names_roles() {
        let err = EscrowError::InvalidParties {
            first_role: Role::Payer,
            second_role: Role::Arbiter,
            address: addr('a'),
        };
        let msg = format!("{err}");
        assert!(msg.contains("payer"));
        assert!(msg.contains("arbiter"));
        assert!(msg.contains(&"a".repeat(40)));
        assert_eq!(err.code(), "INVALID_PARTIES");
    }

    #[test]
    fn amount_mismatch_display_carries_both_amounts() {
        let err = EscrowError::AmountMismatch {
            requested: Amount::from_units(100),
            deposited: Amount::from_units(99),
        };
        let msg = format!("{err}");
        assert!(msg.contains("100"));
        assert!(msg.contains("99"));
        assert_eq!(err.code(), "AMOUNT_MISMATCH");
    }

    #[test]
    fn transfer_error_converts() {
        let err: EscrowError = TransferError::Overflow {
            account: addr('b'),
            amount: Amount::from_units(1),
        }
        .into();
        assert_eq!(err.code(), "TRANSFER_FAILED");
        assert!(format!("{err}").starts_with("value transfer failed"));
    }

    #[test]
    fn integrity_violation_display() {
        let id = EscrowId::new();
        let err = EscrowError::IntegrityViolation {
            escrow_id: id.clone(),
            reason: "custody drift".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains(&id.to_string()));
        assert!(msg.contains("custody drift"));
        assert_eq!(err.code(), "INTEGRITY_VIOLATION");
    }
}
