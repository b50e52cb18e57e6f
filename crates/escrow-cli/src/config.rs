//! # Environment Configuration
//!
//! YAML description of the local environment the CLI simulates: the value
//! unit used for display and parsing, and the accounts seeded by
//! `escrow init`.
//!
//! ```yaml
//! unit:
//!   symbol: ETH
//!   decimals: 18
//! accounts:
//!   - address: "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
//!     balance: "10000.0"
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use escrow_core::{Address, Amount, MAX_DECIMALS};

/// Display and parsing unit for amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitConfig {
    /// Symbol printed after formatted amounts.
    pub symbol: String,
    /// Number of fractional digits one whole unit is divided into.
    pub decimals: u8,
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self {
            symbol: "ETH".to_string(),
            decimals: 18,
        }
    }
}

impl UnitConfig {
    /// Parse a decimal string in this unit.
    pub fn parse(&self, input: &str) -> Result<Amount> {
        Amount::parse_decimal(input, self.decimals)
            .with_context(|| format!("invalid {} amount {input:?}", self.symbol))
    }

    /// Format an amount as `<decimal> <symbol>`.
    pub fn format(&self, amount: Amount) -> String {
        format!("{} {}", amount.format_decimal(self.decimals), self.symbol)
    }
}

/// One account seeded at `init`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountConfig {
    /// Account address.
    pub address: Address,
    /// Starting balance as a decimal string in the configured unit.
    pub balance: String,
}

/// The full environment configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvConfig {
    /// Amount unit.
    pub unit: UnitConfig,
    /// Accounts to seed.
    pub accounts: Vec<AccountConfig>,
}

impl EnvConfig {
    /// Load the configuration from `path`, or the defaults when no path is
    /// given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.validate()?;
        tracing::debug!(
            path = %path.display(),
            accounts = config.accounts.len(),
            "loaded environment config"
        );
        Ok(config)
    }

    /// Reject unit precisions beyond the `u128` range and duplicate accounts.
    pub fn validate(&self) -> Result<()> {
        if self.unit.decimals > MAX_DECIMALS {
            bail!(
                "unit decimals {} exceed the supported maximum of {MAX_DECIMALS}",
                self.unit.decimals
            );
        }
        if self.unit.symbol.trim().is_empty() {
            bail!("unit symbol must not be empty");
        }
        let mut seen = BTreeSet::new();
        for account in &self.accounts {
            if !seen.insert(&account.address) {
                bail!("duplicate account {}", account.address);
            }
        }
        Ok(())
    }

    /// Parsed starting balances, keyed by address.
    pub fn balances(&self) -> Result<BTreeMap<Address, Amount>> {
        self.accounts
            .iter()
            .map(|a| {
                let amount = self
                    .unit
                    .parse(&a.balance)
                    .with_context(|| format!("balance of account {}", a.address))?;
                Ok((a.address.clone(), amount))
            })
            .collect()
    }
}
