//! # Store Traits
//!
//! Keyed persistence seams for sessions and orders. The gateway core only
//! sees these traits; `mockpay-store` provides the durable JSON-file
//! implementation, and the in-memory stores here back unit tests and
//! ephemeral deployments.
//!
//! `update` applies its mutator atomically under the store's write lock,
//! so read-modify-write sequences on one record cannot interleave.

use crate::error::{PaymentError, PaymentResult};
use crate::order::Order;
use crate::session::PaymentSession;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Fallible record mutation, applied under the store lock.
///
/// Mutators run their guards before touching any field; returning an
/// error aborts the update without persisting anything.
pub type Mutator<T> = Box<dyn FnOnce(&mut T) -> PaymentResult<()> + Send>;

/// Durable mapping of sessionId to [`PaymentSession`]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Append a new session; a duplicate id is a storage error
    async fn insert(&self, session: PaymentSession) -> PaymentResult<()>;

    /// Fetch a session by id
    async fn get(&self, session_id: &str) -> PaymentResult<Option<PaymentSession>>;

    /// Atomically mutate a session in place, returning the updated record.
    /// Fails with `SessionNotFound` for an unknown id.
    async fn update(
        &self,
        session_id: &str,
        mutate: Mutator<PaymentSession>,
    ) -> PaymentResult<PaymentSession>;

    /// Snapshot of all sessions (admin views)
    async fn list(&self) -> PaymentResult<Vec<PaymentSession>>;
}

/// Durable mapping of orderId to [`Order`]
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Append a new order; a duplicate id is a storage error
    async fn insert(&self, order: Order) -> PaymentResult<()>;

    /// Fetch an order by id
    async fn get(&self, order_id: &str) -> PaymentResult<Option<Order>>;

    /// Atomically mutate an order in place, returning the updated record.
    /// Fails with `OrderNotFound` for an unknown id.
    async fn update(&self, order_id: &str, mutate: Mutator<Order>) -> PaymentResult<Order>;

    /// Snapshot of all orders (admin views)
    async fn list(&self) -> PaymentResult<Vec<Order>>;

    /// Orders whose customer email matches exactly
    async fn find_by_email(&self, email: &str) -> PaymentResult<Vec<Order>>;

    /// Delete an order. Not part of the normal flow; exists solely as the
    /// compensation path when a completion fails after the order write.
    async fn remove(&self, order_id: &str) -> PaymentResult<()>;
}

/// Type alias for a shared session store (dynamic dispatch)
pub type SharedSessionStore = Arc<dyn SessionStore>;

/// Type alias for a shared order store (dynamic dispatch)
pub type SharedOrderStore = Arc<dyn OrderStore>;

/// In-memory session store
#[derive(Default)]
pub struct MemorySessionStore {
    records: RwLock<HashMap<String, PaymentSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, session: PaymentSession) -> PaymentResult<()> {
        let mut records = self.records.write().await;
        if records.contains_key(&session.session_id) {
            return Err(PaymentError::Storage(format!(
                "duplicate session id: {}",
                session.session_id
            )));
        }
        records.insert(session.session_id.clone(), session);
        Ok(())
    }

    async fn get(&self, session_id: &str) -> PaymentResult<Option<PaymentSession>> {
        Ok(self.records.read().await.get(session_id).cloned())
    }

    async fn update(
        &self,
        session_id: &str,
        mutate: Mutator<PaymentSession>,
    ) -> PaymentResult<PaymentSession> {
        let mut records = self.records.write().await;
        let session = records
            .get_mut(session_id)
            .ok_or_else(|| PaymentError::SessionNotFound {
                session_id: session_id.to_string(),
            })?;
        let mut candidate = session.clone();
        mutate(&mut candidate)?;
        *session = candidate.clone();
        Ok(candidate)
    }

    async fn list(&self) -> PaymentResult<Vec<PaymentSession>> {
        Ok(self.records.read().await.values().cloned().collect())
    }
}

/// In-memory order store
#[derive(Default)]
pub struct MemoryOrderStore {
    records: RwLock<HashMap<String, Order>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert(&self, order: Order) -> PaymentResult<()> {
        let mut records = self.records.write().await;
        if records.contains_key(&order.order_id) {
            return Err(PaymentError::Storage(format!(
                "duplicate order id: {}",
                order.order_id
            )));
        }
        records.insert(order.order_id.clone(), order);
        Ok(())
    }

    async fn get(&self, order_id: &str) -> PaymentResult<Option<Order>> {
        Ok(self.records.read().await.get(order_id).cloned())
    }

    async fn update(&self, order_id: &str, mutate: Mutator<Order>) -> PaymentResult<Order> {
        let mut records = self.records.write().await;
        let order = records
            .get_mut(order_id)
            .ok_or_else(|| PaymentError::OrderNotFound {
                order_id: order_id.to_string(),
            })?;
        let mut candidate = order.clone();
        mutate(&mut candidate)?;
        *order = candidate.clone();
        Ok(candidate)
    }

    async fn list(&self) -> PaymentResult<Vec<Order>> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn find_by_email(&self, email: &str) -> PaymentResult<Vec<Order>> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|o| o.customer.email == email)
            .cloned()
            .collect())
    }

    async fn remove(&self, order_id: &str) -> PaymentResult<()> {
        self.records.write().await.remove(order_id);
        Ok(())
    }
}
