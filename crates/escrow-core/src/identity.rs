//! # Account Identities
//!
//! The [`Address`] newtype identifies every party to an escrow: payer,
//! payee and arbiter. Addresses are validated at construction and stored
//! in lowercase, so two spellings of the same account always compare equal.
//!
//! ## Security Invariant
//!
//! Role checks compare `Address` values, never raw strings. A mixed-case
//! spelling of the arbiter's address is the arbiter; a malformed string
//! never becomes an `Address` at all.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Number of hex digits following the `0x` prefix.
const ADDRESS_HEX_LEN: usize = 40;

/// A validated, normalized account address (`0x` + 40 hex digits).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Create an address from a string, validating format.
    ///
    /// Leading and trailing whitespace is ignored. The stored form is
    /// lowercase.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAddress`] if the string is not
    /// `0x` followed by exactly 40 hex digits.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();
        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| ValidationError::InvalidAddress(raw.clone()))?;
        if hex.len() != ADDRESS_HEX_LEN || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidAddress(raw));
        }
        Ok(Self(format!("0x{}", hex.to_ascii_lowercase())))
    }

    /// Access the normalized address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Address {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Address {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}
