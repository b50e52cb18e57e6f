//! # Settlement Receipts
//!
//! A [`SettlementReceipt`] is issued by every successful release or refund.
//! Its digest is the SHA-256 of the canonical JSON of every other field, so
//! a stored receipt can be re-verified after it has been persisted.

use serde::{Deserialize, Serialize};

use escrow_core::{
    sha256_digest, Address, Amount, CanonicalBytes, CanonicalizationError, ContentDigest,
    Timestamp,
};

use crate::ledger::{EscrowId, SettlementOutcome};

/// Record of the single settlement of an escrow ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReceipt {
    /// The settled ledger.
    pub escrow_id: EscrowId,
    /// Whether funds went to the payee or back to the payer.
    pub outcome: SettlementOutcome,
    /// The account that received the funds.
    pub recipient: Address,
    /// The amount transferred.
    pub amount: Amount,
    /// When settlement was committed.
    pub settled_at: Timestamp,
    /// SHA-256 over the canonical form of the fields above.
    pub digest: ContentDigest,
}

#[derive(Serialize)]
struct ReceiptBody<'a> {
    escrow_id: &'a EscrowId,
    outcome: SettlementOutcome,
    recipient: &'a Address,
    amount: Amount,
    settled_at: &'a Timestamp,
}

impl SettlementReceipt {
    /// Build a receipt and stamp it with its digest.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalizationError`] if the body cannot be canonicalized.
    pub fn issue(
        escrow_id: EscrowId,
        outcome: SettlementOutcome,
        recipient: Address,
        amount: Amount,
        settled_at: Timestamp,
    ) -> Result<Self, CanonicalizationError> {
        let digest = body_digest(&ReceiptBody {
            escrow_id: &escrow_id,
            outcome,
            recipient: &recipient,
            amount,
            settled_at: &settled_at,
        })?;
        Ok(Self {
            escrow_id,
            outcome,
            recipient,
            amount,
            settled_at,
            digest,
        })
    }

    /// Recompute the digest and compare it with the stored one.
    pub fn verify(&self) -> bool {
        body_digest(&ReceiptBody {
            escrow_id: &self.escrow_id,
            outcome: self.outcome,
            recipient: &self.recipient,
            amount: self.amount,
            settled_at: &self.settled_at,
        })
        .map(|d| d == self.digest)
        .unwrap_or(false)
    }
}

fn body_digest(body: &ReceiptBody<'_>) -> Result<ContentDigest, CanonicalizationError> {
    let canonical = CanonicalBytes::new(body)?;
    Ok(sha256_digest(&canonical))
}
