//! # Checkout Policy
//!
//! Pricing and lifecycle constants, lifted out of the handlers so policy
//! changes are testable in isolation. Loaded from `config/gateway.toml`
//! when present, otherwise the defaults apply.

use crate::money::{Currency, Money};
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Payment method recorded when the completion request does not name one
pub const DEFAULT_PAYMENT_METHOD: &str = "mock_card";

/// Pricing and session-lifecycle policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct CheckoutPolicy {
    /// Orders at or above this subtotal ship free
    pub free_shipping_threshold: Money,
    /// Flat shipping rate below the threshold
    pub flat_shipping_rate: Money,
    /// Tax rate in basis points (800 = 8%)
    pub tax_rate_bps: u32,
    /// Session TTL; a session expires exactly this long after creation
    pub session_ttl_minutes: i64,
    /// Currency for all sessions and orders
    pub currency: Currency,
}

impl Default for CheckoutPolicy {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Money::from_cents(10_000),
            flat_shipping_rate: Money::from_cents(999),
            tax_rate_bps: 800,
            session_ttl_minutes: 30,
            currency: Currency::Usd,
        }
    }
}

impl CheckoutPolicy {
    /// Session TTL as a chrono duration
    pub fn session_ttl(&self) -> Duration {
        Duration::minutes(self.session_ttl_minutes)
    }

    /// Load policy from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}
