//! # Error Types
//!
//! Validation and canonicalization errors for the domain primitives. All
//! errors use `thiserror` for derive-based `Display` and `Error`
//! implementations and carry the offending input for diagnostics.

use thiserror::Error;

/// Domain primitive validation failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The string is not a `0x`-prefixed, 40-hex-digit account address.
    #[error("invalid account address: \"{0}\"")]
    InvalidAddress(String),

    /// The string is not a valid decimal amount for the configured precision.
    #[error("invalid amount \"{input}\": {reason}")]
    InvalidAmount {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Adding two amounts overflowed the 128-bit unit counter.
    #[error("amount overflow: {left} + {right}")]
    AmountOverflow {
        /// Left operand in smallest units.
        left: u128,
        /// Right operand in smallest units.
        right: u128,
    },

    /// Subtracting would produce a negative amount.
    #[error("insufficient amount: {available} < {requested}")]
    InsufficientAmount {
        /// Amount available in smallest units.
        available: u128,
        /// Amount requested in smallest units.
        requested: u128,
    },
}

/// Errors during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    /// Amounts must be strings or integers.
    #[error("float values are not permitted in canonical representations; use string or integer for amounts: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed during canonicalization.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
