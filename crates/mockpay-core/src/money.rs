//! # Money
//!
//! Fixed-point monetary amounts in integer cents. Keeping amounts in the
//! smallest currency unit makes summation exact and order-independent;
//! rounding happens once, at the decimal boundary.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A monetary amount in cents.
///
/// On the wire (and in persisted records) a `Money` is a plain JSON number
/// with two decimal places, e.g. `9.99`. Negative amounts deserialize fine
/// so that cart validation can reject them with a domain error instead of
/// a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Construct from a cent count
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Construct from a decimal amount, rounding half away from zero to cents
    pub fn from_decimal(amount: f64) -> Self {
        Money((amount * 100.0).round() as i64)
    }

    /// Amount in cents
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Decimal representation (exact: cents / 100)
    pub fn as_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiply by a quantity; `None` if the product leaves the cent range
    pub fn checked_times(&self, qty: i64) -> Option<Money> {
        self.0.checked_mul(qty).map(Money)
    }

    /// Add two amounts; `None` on overflow
    pub fn checked_add(&self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Apply a rate in basis points, rounding half up.
    ///
    /// This is the single rounding step in a totals computation; the
    /// inputs are already exact cents. `None` if the scaled result does
    /// not fit back into cents.
    pub fn apply_bps(&self, bps: u32) -> Option<Money> {
        let scaled = self.0 as i128 * bps as i128;
        i64::try_from((scaled + 5_000) / 10_000).ok().map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.as_decimal())
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_decimal())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        Ok(Money::from_decimal(amount))
    }
}
