//! # escrow-core: Foundational Types for the Arbiter Escrow Stack
//!
//! Domain primitives shared by every other crate in the workspace. It
//! depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identities.** Parties are [`Address`] values
//!    with a validated constructor. No bare strings for account identities.
//!
//! 2. **Integer amounts.** [`Amount`] counts smallest units in a `u128`.
//!    Decimal strings such as `"1.0"` are a presentation concern handled by
//!    [`Amount::parse_decimal`] and [`Amount::format_decimal`].
//!
//! 3. **`CanonicalBytes` newtype.** Receipt digests flow through
//!    `CanonicalBytes::new()` and never through raw `serde_json::to_vec()`.
//!
//! 4. **UTC-only timestamps.** [`Timestamp`] serializes with a `Z` suffix.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `escrow-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

#![deny(missing_docs)]

pub mod amount;
pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use amount::{Amount, MAX_DECIMALS};
pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, ContentDigest, DigestAlgorithm};
pub use error::{CanonicalizationError, ValidationError};
pub use identity::Address;
pub use temporal::Timestamp;
