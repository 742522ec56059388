//! Money amounts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount of a specific currency.
///
/// The API transmits amounts as strings (`"39.59000000"`); they decode to
/// [`Decimal`] so no precision is lost and arithmetic is exact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// The amount, arbitrary precision
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    /// ISO-style currency code (e.g. `BTC`, `USD`)
    pub currency: String,
}

impl Money {
    /// Create a money amount.
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}
