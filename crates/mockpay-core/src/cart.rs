//! # Cart Types & Totals Calculator
//!
//! Line items, customer identity, and the pure totals computation.
//! A session stores an immutable snapshot of these; later cart edits by
//! the client never reach an open session.

use crate::config::CheckoutPolicy;
use crate::error::{PaymentError, PaymentResult};
use crate::money::Money;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Product identifier as it arrived on the wire.
///
/// The storefront sends numeric ids, older clients send strings; the
/// snapshot must round-trip verbatim either way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Num(i64),
    Text(String),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Num(n) => write!(f, "{}", n),
            ItemId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A line item in a cart snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product ID
    pub id: ItemId,

    /// Product name (denormalized for display)
    pub name: String,

    /// Unit price
    pub price: Money,

    /// Quantity; kept signed so non-positive values reach validation
    pub qty: i64,
}

impl CartItem {
    /// Line total (unit price times quantity), exact in cents.
    /// `None` when the product leaves the representable range.
    pub fn line_total(&self) -> Option<Money> {
        self.price.checked_times(self.qty)
    }
}

/// Customer identity attached to a session and its order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Identity key for order lookup; required, non-empty
    pub email: String,

    /// Display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Customer {
    /// Validate a customer payload into a well-formed `Customer`
    pub fn validate(email: Option<String>, name: Option<String>) -> PaymentResult<Self> {
        match email {
            Some(email) if !email.trim().is_empty() => Ok(Self { email, name }),
            _ => Err(PaymentError::InvalidCustomer {
                detail: "Customer email is required".to_string(),
            }),
        }
    }
}

/// Monetary breakdown of a cart, computed once at session creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub total: Money,
}

/// Compute `{subtotal, shipping, tax, total}` for a cart.
///
/// Pure and deterministic; summation is exact integer cents, and the only
/// rounding step is the tax rate application.
pub fn calculate_totals(cart: &[CartItem], policy: &CheckoutPolicy) -> PaymentResult<Totals> {
    if cart.is_empty() {
        return Err(PaymentError::InvalidCart {
            detail: "Cart must be a non-empty array".to_string(),
        });
    }

    for item in cart {
        if item.price.is_negative() {
            return Err(PaymentError::InvalidCart {
                detail: format!("Item {} has a negative price", item.id),
            });
        }
        if item.qty < 1 {
            return Err(PaymentError::InvalidCart {
                detail: format!("Item {} has a non-positive quantity", item.id),
            });
        }
    }

    let overflow = |id: &ItemId| PaymentError::InvalidCart {
        detail: format!("Item {} total exceeds the supported amount", id),
    };

    let mut subtotal = Money::ZERO;
    for item in cart {
        let line = item.line_total().ok_or_else(|| overflow(&item.id))?;
        subtotal = subtotal
            .checked_add(line)
            .ok_or_else(|| overflow(&item.id))?;
    }

    let shipping = if subtotal >= policy.free_shipping_threshold {
        Money::ZERO
    } else {
        policy.flat_shipping_rate
    };
    let cart_overflow = || PaymentError::InvalidCart {
        detail: "Cart total exceeds the supported amount".to_string(),
    };
    let tax = subtotal
        .apply_bps(policy.tax_rate_bps)
        .ok_or_else(cart_overflow)?;
    let total = subtotal
        .checked_add(shipping)
        .and_then(|t| t.checked_add(tax))
        .ok_or_else(cart_overflow)?;

    Ok(Totals {
        subtotal,
        shipping,
        tax,
        total,
    })
}
