//! # mockpay-core
//!
//! Core types and session lifecycle for the mockpay-rs payment gateway.
//!
//! This crate provides:
//! - `Money` and `Totals` for fixed-point monetary computation
//! - `CartItem` and `Customer` cart snapshot types
//! - `PaymentSession` and `Order` lifecycle records
//! - `SessionStore` / `OrderStore` traits for pluggable persistence
//! - `PaymentSessions`, the pending/completed/expired state machine
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use mockpay_core::{CheckoutPolicy, Customer, PaymentSessions, SystemClock};
//!
//! let gateway = PaymentSessions::new(sessions, orders, CheckoutPolicy::default(), clock);
//!
//! // Snapshot the cart into a pending session
//! let session = gateway.create_session(cart, customer).await?;
//!
//! // Later: complete it exactly once, issuing the order
//! let order = gateway
//!     .complete_session(&session.session_id, Some("mock_card".into()), None, None)
//!     .await?;
//! ```

pub mod cart;
pub mod checkout;
pub mod clock;
pub mod config;
pub mod error;
pub mod money;
pub mod order;
pub mod session;
pub mod store;

// Re-exports for convenience
pub use cart::{calculate_totals, CartItem, Customer, ItemId, Totals};
pub use checkout::PaymentSessions;
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use config::{CheckoutPolicy, DEFAULT_PAYMENT_METHOD};
pub use error::{PaymentError, PaymentResult};
pub use money::{Currency, Money};
pub use order::{Order, OrderStatus};
pub use session::{PaymentSession, SessionStatus};
pub use store::{
    MemoryOrderStore, MemorySessionStore, Mutator, OrderStore, SessionStore, SharedOrderStore,
    SharedSessionStore,
};
