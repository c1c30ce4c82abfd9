//! Fixed-point monetary amounts
//!
//! Uses rust_decimal for deterministic arithmetic (no floating-point
//! errors). A `Money` value is always non-negative; signed quantities
//! such as unrealized gains are plain `Decimal`s computed from pairs of
//! `Money` values.

use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

/// Error returned when a string cannot be parsed as a money amount.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid money amount: {0}")]
pub struct MoneyParseError(pub String);

/// A non-negative monetary amount in the tenant's reporting currency.
///
/// Every construction path enforces the sign invariant, including
/// deserialization: a negative amount in an API payload is a decode
/// error, never a `Money`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        Money::try_new(value)
            .ok_or_else(|| de::Error::custom(format!("negative money amount: {}", value)))
    }
}

impl Money {
    /// Zero amount.
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Create a Money value, returning None if negative.
    pub fn try_new(value: Decimal) -> Option<Self> {
        if value >= Decimal::ZERO {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Create from a whole number of currency units.
    pub fn from_u64(value: u64) -> Self {
        Self(Decimal::from(value))
    }

    /// Parse from a decimal string (e.g. "14500", "850.25").
    pub fn from_str(s: &str) -> Result<Self, MoneyParseError> {
        let value: Decimal = s
            .parse()
            .map_err(|_| MoneyParseError(s.to_string()))?;
        Self::try_new(value).ok_or_else(|| MoneyParseError(s.to_string()))
    }

    /// Get the inner decimal value.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// True if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == Decimal::ZERO
    }

    /// Signed difference `self - other` (may be negative).
    pub fn signed_diff(&self, other: Money) -> Decimal {
        self.0 - other.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
