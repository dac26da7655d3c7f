//! # Order Types
//!
//! The durable record of a completed purchase. An order is created exactly
//! once, as the side effect of a session's `pending -> completed`
//! transition, and is an immutable snapshot of that session's customer,
//! cart, and totals.

use crate::cart::{CartItem, Customer, Totals};
use crate::session::PaymentSession;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order lifecycle tag, independent of payment status.
///
/// Starts at `confirmed`; later transitions come from an order-management
/// workflow outside this core and are plain field updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(OrderStatus::Confirmed),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("Unknown order status: {}", other)),
        }
    }
}

/// A completed purchase
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Opaque unique id, independent of the session id
    pub order_id: String,

    /// Back-reference to the originating session (lookup only)
    pub session_id: String,

    /// Opaque transaction id generated at completion
    pub transaction_id: String,

    /// Copied verbatim from the session at completion time
    pub customer: Customer,
    pub cart: Vec<CartItem>,
    pub totals: Totals,

    /// Payment method tag from the completion request
    pub payment_method: String,

    /// Order-management state, starts `confirmed`
    pub status: OrderStatus,

    pub created_at: DateTime<Utc>,

    /// Stamped on each status update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Opaque shipping details from the completion request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Order {
    /// Build an order from a session's snapshots plus completion details
    pub fn from_session(
        session: &PaymentSession,
        order_id: String,
        transaction_id: String,
        payment_method: String,
        shipping_address: Option<serde_json::Value>,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            order_id,
            session_id: session.session_id.clone(),
            transaction_id,
            customer: session.customer.clone(),
            cart: session.cart.clone(),
            totals: session.totals,
            payment_method,
            status: OrderStatus::Confirmed,
            created_at: now,
            updated_at: None,
            shipping_address,
            notes,
        }
    }
}
