//! # Payment Session
//!
//! The time-boxed record of one checkout attempt. Status is monotonic:
//! `pending` is the only non-terminal state, and the only transitions out
//! of it are `completed` (exactly once) and `expired` (observed lazily).

use crate::cart::{CartItem, Customer, Totals};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lifecycle state of a payment session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Awaiting completion
    #[default]
    Pending,
    /// Completed successfully; terminal
    Completed,
    /// TTL elapsed before completion; terminal
    Expired,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Completed => "completed",
            SessionStatus::Expired => "expired",
        };
        write!(f, "{}", s)
    }
}

/// One checkout attempt: committed cart snapshot, computed totals, and
/// lifecycle timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSession {
    /// Opaque unique id, immutable after creation
    pub session_id: String,

    /// Customer identity (email keyed)
    pub customer: Customer,

    /// Immutable cart snapshot taken at creation; later cart edits by the
    /// client never affect an open session
    pub cart: Vec<CartItem>,

    /// Derived monetary breakdown, computed once at creation
    pub totals: Totals,

    /// Lifecycle state
    pub status: SessionStatus,

    pub created_at: DateTime<Utc>,

    /// Always exactly `created_at + TTL`
    pub expires_at: DateTime<Utc>,

    /// Populated only on successful completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
}

impl PaymentSession {
    /// Create a fresh pending session with a generated id
    pub fn new(
        cart: Vec<CartItem>,
        customer: Customer,
        totals: Totals,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            customer,
            cart,
            totals,
            status: SessionStatus::Pending,
            created_at: now,
            expires_at: now + ttl,
            completed_at: None,
            order_id: None,
            transaction_id: None,
            payment_method: None,
        }
    }

    /// True once the TTL has elapsed, regardless of stored status.
    ///
    /// Callers re-derive expiry from the timestamps instead of trusting a
    /// possibly-stale stored status.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
