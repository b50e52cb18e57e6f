//! # Amounts
//!
//! [`Amount`] is a non-negative count of smallest currency units held in a
//! `u128`. Arithmetic is checked: overflow and underflow are errors, never
//! wrap-around.
//!
//! Decimal strings are a presentation format. `Amount::parse_decimal("1.0", 18)`
//! yields `10^18` units; `format_decimal(18)` renders it back as `"1.0"`.
//! Serialized form is the unit count as a decimal integer string, so JSON
//! documents never carry floats.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Largest supported number of fractional digits (`10^38` still fits in `u128`).
pub const MAX_DECIMALS: u8 = 38;

/// A non-negative quantity of smallest currency units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Amount(u128);

impl Amount {
    /// The zero amount.
    pub const ZERO: Amount = Amount(0);

    /// Create an amount from a count of smallest units.
    pub const fn from_units(units: u128) -> Self {
        Self(units)
    }

    /// The count of smallest units.
    pub const fn units(&self) -> u128 {
        self.0
    }

    /// Whether the amount is zero.
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Add two amounts.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::AmountOverflow`] if the sum exceeds `u128::MAX`.
    pub fn checked_add(self, other: Amount) -> Result<Amount, ValidationError> {
        self.0
            .checked_add(other.0)
            .map(Amount)
            .ok_or(ValidationError::AmountOverflow {
                left: self.0,
                right: other.0,
            })
    }

    /// Subtract `other` from this amount.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InsufficientAmount`] if `other` is larger.
    pub fn checked_sub(self, other: Amount) -> Result<Amount, ValidationError> {
        self.0
            .checked_sub(other.0)
            .map(Amount)
            .ok_or(ValidationError::InsufficientAmount {
                available: self.0,
                requested: other.0,
            })
    }

    /// Parse a decimal string (e.g. `"1.5"`) with `decimals` fractional
    /// digits of precision into smallest units.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAmount`] for empty or signed input,
    /// non-digit characters, more fractional digits than `decimals`, a
    /// `decimals` above [`MAX_DECIMALS`], or a value that overflows `u128`.
    pub fn parse_decimal(input: &str, decimals: u8) -> Result<Amount, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidAmount {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let scale = scale_for(decimals).ok_or_else(|| invalid("unsupported precision"))?;
        let s = input.trim();
        if s.is_empty() {
            return Err(invalid("empty"));
        }

        let (whole, fraction) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() {
            return Err(invalid("missing integer part"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("only digits and a single decimal point are allowed"));
        }
        if fraction.len() > usize::from(decimals) {
            return Err(invalid("too many fractional digits"));
        }

        let whole_units = whole
            .parse::<u128>()
            .ok()
            .and_then(|w| w.checked_mul(scale))
            .ok_or_else(|| invalid("value out of range"))?;

        let fraction_units = if fraction.is_empty() {
            0
        } else {
            // fraction.len() <= decimals <= MAX_DECIMALS, so the padding scale exists.
            let pad = scale_for(decimals - fraction.len() as u8)
                .ok_or_else(|| invalid("unsupported precision"))?;
            fraction
                .parse::<u128>()
                .ok()
                .and_then(|f| f.checked_mul(pad))
                .ok_or_else(|| invalid("value out of range"))?
        };

        whole_units
            .checked_add(fraction_units)
            .map(Amount)
            .ok_or_else(|| invalid("value out of range"))
    }

    /// Render the amount as a decimal string with `decimals` fractional
    /// digits of precision.
    ///
    /// Trailing fractional zeros are trimmed but at least one fractional
    /// digit is kept (`"1.0"`, `"0.25"`). With `decimals == 0` the plain
    /// integer is returned. Precision above [`MAX_DECIMALS`] is clamped.
    pub fn format_decimal(&self, decimals: u8) -> String {
        let decimals = decimals.min(MAX_DECIMALS);
        if decimals == 0 {
            return self.0.to_string();
        }
        let scale = scale_for(decimals).unwrap_or(1);
        let whole = self.0 / scale;
        let fraction = self.0 % scale;
        let padded = format!("{fraction:0width$}", width = usize::from(decimals));
        let trimmed = padded.trim_end_matches('0');
        if trimmed.is_empty() {
            format!("{whole}.0")
        } else {
            format!("{whole}.{trimmed}")
        }
    }
}

/// `10^decimals`, or `None` above [`MAX_DECIMALS`].
fn scale_for(decimals: u8) -> Option<u128> {
    if decimals > MAX_DECIMALS {
        return None;
    }
    10u128.checked_pow(u32::from(decimals))
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u128> for Amount {
    fn from(units: u128) -> Self {
        Self(units)
    }
}

impl TryFrom<String> for Amount {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Amount::parse_decimal(&value, 0)
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        amount.0.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ETH: u8 = 18;
    const ONE_ETH: u128 = 1_000_000_000_000_000_000;

    #[test]
    fn parse_one_ether() {
        assert_eq!(Amount::parse_decimal("1.0", ETH).unwrap().units(), ONE_ETH);
        assert_eq!(Amount::parse_decimal("1", ETH).unwrap().units(), ONE_ETH);
    }

    #[test]
    fn parse_fractional() {
        let a = Amount::parse_decimal("0.25", ETH).unwrap();
        assert_eq!(a.units(), ONE_ETH / 4);
        let smallest = Amount::parse_decimal("0.000000000000000001", ETH).unwrap();
        assert_eq!(smallest.units(), 1);
    }

    #[test]
    fn parse_trailing_point_is_whole() {
        assert_eq!(Amount::parse_decimal("3.", 2).unwrap().units(), 300);
    }

    #[test]
    fn parse_rejects_malformed_input() {
        for bad in ["", "  ", "-1", "+1", "1.2.3", "abc", ".5", "1e18", "1,0"] {
            assert!(Amount::parse_decimal(bad, ETH).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn parse_rejects_excess_precision() {
        let err = Amount::parse_decimal("0.001", 2).unwrap_err();
        match err {
            ValidationError::InvalidAmount { reason, .. } => {
                assert!(reason.contains("fractional"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn parse_rejects_unsupported_precision() {
        assert!(Amount::parse_decimal("1", MAX_DECIMALS + 1).is_err());
    }

    #[test]
    fn parse_rejects_overflow() {
        assert!(Amount::parse_decimal("340282366920938463463374607431768211456", 0).is_err());
        assert!(Amount::parse_decimal("1000000000000000000", ETH).is_ok());
        assert!(Amount::parse_decimal("1000000000000000000000000", 18).is_err());
    }

    #[test]
    fn format_trims_trailing_zeros() {
        assert_eq!(Amount::from_units(ONE_ETH).format_decimal(ETH), "1.0");
        assert_eq!(Amount::from_units(ONE_ETH / 4).format_decimal(ETH), "0.25");
        assert_eq!(Amount::ZERO.format_decimal(ETH), "0.0");
        assert_eq!(Amount::from_units(1).format_decimal(ETH), "0.000000000000000001");
    }

    #[test]
    fn format_without_decimals_is_integer() {
        assert_eq!(Amount::from_units(1234).format_decimal(0), "1234");
    }

    #[test]
    fn checked_add_and_sub() {
        let a = Amount::from_units(10);
        let b = Amount::from_units(4);
        assert_eq!(a.checked_add(b).unwrap().units(), 14);
        assert_eq!(a.checked_sub(b).unwrap().units(), 6);
        assert!(b.checked_sub(a).is_err());
        assert!(Amount::from_units(u128::MAX).checked_add(b).is_err());
    }

    #[test]
    fn serde_uses_integer_string() {
        let a = Amount::from_units(ONE_ETH);
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, "\"1000000000000000000\"");
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }

    #[test]
    fn serde_rejects_decimal_strings() {
        let result: Result<Amount, _> = serde_json::from_str("\"1.5\"");
        assert!(result.is_err());
    }
}
