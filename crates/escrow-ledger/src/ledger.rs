//! # Escrow Ledger
//!
//! One escrow instance: a payer's deposit held in custody until the
//! arbiter either releases it to the payee or refunds it to the payer.
//!
//! ## State Machine
//!
//! `Unsettled → Settled` via exactly one of `release` or `refund`.
//! `Settled` is terminal. The only way into `Unsettled` is a successful
//! construction with a deposit equal to the stated amount.
//!
//! ## Security Invariant
//!
//! Settlement guards run in a fixed order: the caller must be the arbiter,
//! then the ledger must be unsettled. The recipient is credited before any
//! field changes, and the flag flip, custody zeroing and receipt are then
//! committed together, so a failed operation never leaves partial effects.
//! Parties and amount have no setters.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use escrow_core::{Address, Amount, Timestamp};

use crate::error::EscrowError;
use crate::receipt::SettlementReceipt;
use crate::transfer::ValueTransfer;

// ── Identifiers ────────────────────────────────────────────────────────

/// A unique identifier for an escrow ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EscrowId(Uuid);

impl EscrowId {
    /// Create a new random escrow identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EscrowId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EscrowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "escrow:{}", self.0)
    }
}

// ── Roles and Operations ───────────────────────────────────────────────

/// The three parties bound to a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Funds the escrow at construction.
    Payer,
    /// Receives the funds on release.
    Payee,
    /// Decides between release and refund.
    Arbiter,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Payer => "payer",
            Self::Payee => "payee",
            Self::Arbiter => "arbiter",
        };
        f.write_str(s)
    }
}

/// The two settlement operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// Pay the custodied funds to the payee.
    Release,
    /// Return the custodied funds to the payer.
    Refund,
}

impl Operation {
    /// The outcome a successful operation produces.
    pub fn outcome(&self) -> SettlementOutcome {
        match self {
            Self::Release => SettlementOutcome::Released,
            Self::Refund => SettlementOutcome::Refunded,
        }
    }

    /// Lowercase operation name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Release => "release",
            Self::Refund => "refund",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Status ─────────────────────────────────────────────────────────────

/// The status of an escrow ledger.
///
/// Status machine: `Unsettled → Settled`. Terminal state: `Settled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EscrowStatus {
    /// Funds are held in custody awaiting the arbiter.
    Unsettled,
    /// Funds have left custody. Terminal state.
    Settled,
}

impl EscrowStatus {
    /// Whether this status is terminal (no further operations allowed).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Settled)
    }

    /// The canonical string name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unsettled => "UNSETTLED",
            Self::Settled => "SETTLED",
        }
    }
}

impl std::fmt::Display for EscrowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a settled ledger was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettlementOutcome {
    /// Funds went to the payee.
    Released,
    /// Funds went back to the payer.
    Refunded,
}

impl SettlementOutcome {
    /// The canonical string name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Released => "RELEASED",
            Self::Refunded => "REFUNDED",
        }
    }
}

impl std::fmt::Display for SettlementOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Terms ──────────────────────────────────────────────────────────────

/// The parties and amount an escrow is constructed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowTerms {
    /// Funding party.
    pub payer: Address,
    /// Intended recipient.
    pub payee: Address,
    /// Party authorized to settle.
    pub arbiter: Address,
    /// Amount to hold in custody.
    pub amount: Amount,
}

impl EscrowTerms {
    /// Bundle the construction parameters.
    pub fn new(payer: Address, payee: Address, arbiter: Address, amount: Amount) -> Self {
        Self {
            payer,
            payee,
            arbiter,
            amount,
        }
    }

    /// Check that payer, payee and arbiter are pairwise distinct.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::InvalidParties`] naming the first colliding
    /// pair, checked in the order payer/payee, payer/arbiter, payee/arbiter.
    pub fn validate_parties(&self) -> Result<(), EscrowError> {
        let pairs = [
            (Role::Payer, &self.payer, Role::Payee, &self.payee),
            (Role::Payer, &self.payer, Role::Arbiter, &self.arbiter),
            (Role::Payee, &self.payee, Role::Arbiter, &self.arbiter),
        ];
        for (first_role, first, second_role, second) in pairs {
            if first == second {
                return Err(EscrowError::InvalidParties {
                    first_role,
                    second_role,
                    address: first.clone(),
                });
            }
        }
        Ok(())
    }
}

// ── Snapshot ───────────────────────────────────────────────────────────

/// Read-only view of a ledger at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Ledger identifier.
    pub id: EscrowId,
    /// Funding party.
    pub payer: Address,
    /// Intended recipient.
    pub payee: Address,
    /// Party authorized to settle.
    pub arbiter: Address,
    /// Amount deposited at construction.
    pub amount: Amount,
    /// Amount currently held (equal to `amount` until settled, then zero).
    pub custody: Amount,
    /// Whether the ledger has been settled.
    pub settled: bool,
    /// How it was settled, if it was.
    pub outcome: Option<SettlementOutcome>,
    /// When the ledger was constructed.
    pub created_at: Timestamp,
}

// ── Escrow Ledger ──────────────────────────────────────────────────────

/// A single three-party escrow.
///
/// Created via [`EscrowLedger::open`] (debiting the payer through the
/// environment) or [`EscrowLedger::construct`] (when the environment has
/// already taken the deposit). Settled at most once via
/// [`release`](EscrowLedger::release) or [`refund`](EscrowLedger::refund).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowLedger {
    id: EscrowId,
    payer: Address,
    payee: Address,
    arbiter: Address,
    amount: Amount,
    custody: Amount,
    outcome: Option<SettlementOutcome>,
    created_at: Timestamp,
    receipt: Option<SettlementReceipt>,
}

impl EscrowLedger {
    /// Construct a ledger around a deposit the environment has already moved
    /// into custody.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::InvalidParties`] if two roles share an
    /// address, or [`EscrowError::AmountMismatch`] if `deposited` differs
    /// from `terms.amount`.
    pub fn construct(terms: EscrowTerms, deposited: Amount) -> Result<Self, EscrowError> {
        terms.validate_parties()?;
        if deposited != terms.amount {
            return Err(EscrowError::AmountMismatch {
                requested: terms.amount,
                deposited,
            });
        }
        Ok(Self::initialize(terms))
    }

    /// Open a ledger by debiting exactly `terms.amount` from the payer.
    ///
    /// Parties are validated before any value moves. If the debit fails no
    /// ledger exists and no balance has changed.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::InvalidParties`] for colliding roles, or
    /// [`EscrowError::Transfer`] if the environment refuses the debit.
    pub fn open(terms: EscrowTerms, env: &impl ValueTransfer) -> Result<Self, EscrowError> {
        terms.validate_parties()?;
        env.debit(&terms.payer, terms.amount)?;
        Ok(Self::initialize(terms))
    }

    fn initialize(terms: EscrowTerms) -> Self {
        let ledger = Self {
            id: EscrowId::new(),
            payer: terms.payer,
            payee: terms.payee,
            arbiter: terms.arbiter,
            amount: terms.amount,
            custody: terms.amount,
            outcome: None,
            created_at: Timestamp::now(),
            receipt: None,
        };
        tracing::info!(
            escrow_id = %ledger.id,
            payer = %ledger.payer,
            payee = %ledger.payee,
            arbiter = %ledger.arbiter,
            amount = %ledger.amount,
            "escrow constructed"
        );
        ledger
    }

    /// Release the custodied funds to the payee.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::Unauthorized`] if `caller` is not the arbiter
    /// (checked first), [`EscrowError::AlreadySettled`] if the ledger is
    /// settled, or [`EscrowError::Transfer`] if the environment refuses the
    /// credit. On error nothing changes.
    pub fn release(
        &mut self,
        caller: &Address,
        env: &impl ValueTransfer,
    ) -> Result<SettlementReceipt, EscrowError> {
        self.settle(caller, Operation::Release, env)
    }

    /// Refund the custodied funds to the payer.
    ///
    /// # Errors
    ///
    /// Same contract as [`release`](Self::release).
    pub fn refund(
        &mut self,
        caller: &Address,
        env: &impl ValueTransfer,
    ) -> Result<SettlementReceipt, EscrowError> {
        self.settle(caller, Operation::Refund, env)
    }

    /// Run the guards for `operation` without moving value.
    ///
    /// # Errors
    ///
    /// The same authorization and settled-state errors `release`/`refund`
    /// would return.
    pub fn authorize(&self, caller: &Address, operation: Operation) -> Result<(), EscrowError> {
        if caller != &self.arbiter {
            return Err(EscrowError::Unauthorized {
                operation,
                caller: caller.clone(),
            });
        }
        if let Some(outcome) = self.outcome {
            return Err(EscrowError::AlreadySettled {
                escrow_id: self.id.clone(),
                outcome,
            });
        }
        Ok(())
    }

    fn settle(
        &mut self,
        caller: &Address,
        operation: Operation,
        env: &impl ValueTransfer,
    ) -> Result<SettlementReceipt, EscrowError> {
        if let Err(e) = self.authorize(caller, operation) {
            tracing::warn!(
                escrow_id = %self.id,
                %caller,
                %operation,
                code = e.code(),
                "settlement rejected"
            );
            return Err(e);
        }

        let recipient = self.recipient_for(operation).clone();
        let receipt = SettlementReceipt::issue(
            self.id.clone(),
            operation.outcome(),
            recipient.clone(),
            self.custody,
            Timestamp::now(),
        )?;
        env.credit(&recipient, self.custody)?;

        self.custody = Amount::ZERO;
        self.outcome = Some(receipt.outcome);
        self.receipt = Some(receipt.clone());

        tracing::info!(
            escrow_id = %self.id,
            outcome = %receipt.outcome,
            %recipient,
            amount = %receipt.amount,
            digest = %receipt.digest,
            "escrow settled"
        );
        Ok(receipt)
    }

    /// The account `operation` pays out to.
    pub fn recipient_for(&self, operation: Operation) -> &Address {
        match operation {
            Operation::Release => &self.payee,
            Operation::Refund => &self.payer,
        }
    }

    /// Read-only snapshot of the current state.
    pub fn inspect(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            id: self.id.clone(),
            payer: self.payer.clone(),
            payee: self.payee.clone(),
            arbiter: self.arbiter.clone(),
            amount: self.amount,
            custody: self.custody,
            settled: self.is_settled(),
            outcome: self.outcome,
            created_at: self.created_at,
        }
    }

    /// Check every ledger invariant.
    ///
    /// Used when a ledger is loaded from storage, since deserialization
    /// bypasses the constructors.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::IntegrityViolation`] describing the first
    /// broken invariant, or [`EscrowError::InvalidParties`] for colliding roles.
    pub fn verify_integrity(&self) -> Result<(), EscrowError> {
        EscrowTerms::new(
            self.payer.clone(),
            self.payee.clone(),
            self.arbiter.clone(),
            self.amount,
        )
        .validate_parties()?;

        let violation = |reason: &str| EscrowError::IntegrityViolation {
            escrow_id: self.id.clone(),
            reason: reason.to_string(),
        };

        match (self.outcome, &self.receipt) {
            (None, None) => {
                if self.custody != self.amount {
                    return Err(violation("unsettled custody differs from amount"));
                }
            }
            (Some(outcome), Some(receipt)) => {
                if !self.custody.is_zero() {
                    return Err(violation("settled ledger still holds custody"));
                }
                if receipt.outcome != outcome
                    || receipt.escrow_id != self.id
                    || receipt.amount != self.amount
                {
                    return Err(violation("receipt does not match ledger"));
                }
                let expected = match outcome {
                    SettlementOutcome::Released => &self.payee,
                    SettlementOutcome::Refunded => &self.payer,
                };
                if &receipt.recipient != expected {
                    return Err(violation("receipt recipient does not match outcome"));
                }
                if !receipt.verify() {
                    return Err(violation("receipt digest mismatch"));
                }
            }
            _ => return Err(violation("outcome and receipt disagree")),
        }
        Ok(())
    }

    /// Ledger identifier.
    pub fn id(&self) -> &EscrowId {
        &self.id
    }

    /// Funding party.
    pub fn payer(&self) -> &Address {
        &self.payer
    }

    /// Intended recipient.
    pub fn payee(&self) -> &Address {
        &self.payee
    }

    /// Party authorized to settle.
    pub fn arbiter(&self) -> &Address {
        &self.arbiter
    }

    /// Amount deposited at construction.
    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// Amount currently held.
    pub fn custody(&self) -> Amount {
        self.custody
    }

    /// Current status.
    pub fn status(&self) -> EscrowStatus {
        if self.outcome.is_some() {
            EscrowStatus::Settled
        } else {
            EscrowStatus::Unsettled
        }
    }

    /// Whether the ledger has been settled.
    pub fn is_settled(&self) -> bool {
        self.status().is_terminal()
    }

    /// How the ledger was settled, if it was.
    pub fn outcome(&self) -> Option<SettlementOutcome> {
        self.outcome
    }

    /// The settlement receipt, if settled.
    pub fn receipt(&self) -> Option<&SettlementReceipt> {
        self.receipt.as_ref()
    }

    /// When the ledger was constructed.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }
}
