//! # Payment Session Manager
//!
//! The state machine at the heart of the gateway:
//!
//! ```text
//!              CompleteSession success
//!   pending ──────────────────────────► completed   (terminal)
//!      │
//!      │  expiry observed on read
//!      └──────────────────────────────► expired     (terminal)
//! ```
//!
//! Expiry is lazy: there is no background sweeper, a pending session past
//! its TTL is flipped to `expired` as a side effect of the read that
//! observes it. Completion is exactly-once; a duplicate attempt is
//! rejected rather than replayed.

use crate::cart::{calculate_totals, CartItem, Customer};
use crate::clock::SharedClock;
use crate::config::{CheckoutPolicy, DEFAULT_PAYMENT_METHOD};
use crate::error::{PaymentError, PaymentResult};
use crate::order::{Order, OrderStatus};
use crate::session::{PaymentSession, SessionStatus};
use crate::store::{SharedOrderStore, SharedSessionStore};
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Orchestrates session creation, lazy expiry, and exactly-once completion
pub struct PaymentSessions {
    sessions: SharedSessionStore,
    orders: SharedOrderStore,
    policy: CheckoutPolicy,
    clock: SharedClock,
    /// Per-session locks serializing the completion read-then-write
    completion_locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl PaymentSessions {
    pub fn new(
        sessions: SharedSessionStore,
        orders: SharedOrderStore,
        policy: CheckoutPolicy,
        clock: SharedClock,
    ) -> Self {
        Self {
            sessions,
            orders,
            policy,
            clock,
            completion_locks: StdMutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> &CheckoutPolicy {
        &self.policy
    }

    /// Create a pending session from a cart snapshot and validated customer.
    ///
    /// Totals are computed once here and stored; the snapshot is immutable
    /// from this point on.
    pub async fn create_session(
        &self,
        cart: Vec<CartItem>,
        customer: Customer,
    ) -> PaymentResult<PaymentSession> {
        let totals = calculate_totals(&cart, &self.policy)?;
        let now = self.clock.now();
        let session = PaymentSession::new(cart, customer, totals, now, self.policy.session_ttl());

        self.sessions.insert(session.clone()).await?;

        info!(
            session_id = %session.session_id,
            amount = %session.totals.total,
            "created payment session"
        );
        Ok(session)
    }

    /// Look up a session, applying lazy expiry.
    ///
    /// If the TTL has elapsed and the stored status is still `pending`,
    /// the flip is persisted before the record is returned.
    pub async fn session_status(&self, session_id: &str) -> PaymentResult<PaymentSession> {
        let session = self.fetch(session_id).await?;

        if session.status == SessionStatus::Pending && session.is_expired(self.clock.now()) {
            let updated = self
                .sessions
                .update(
                    session_id,
                    Box::new(|s| {
                        // re-check under the store lock; a concurrent
                        // completion must not be overwritten
                        if s.status == SessionStatus::Pending {
                            s.status = SessionStatus::Expired;
                        }
                        Ok(())
                    }),
                )
                .await?;
            info!(session_id = %session_id, "session expired (lazy)");
            return Ok(updated);
        }

        Ok(session)
    }

    /// Complete a pending session, issuing its order exactly once.
    ///
    /// The order write and the session update form one logical
    /// transaction: the order is persisted first, so a storage failure
    /// leaves the session pending with no partial state; if the session
    /// update then fails, the order is removed as compensating rollback.
    pub async fn complete_session(
        &self,
        session_id: &str,
        payment_method: Option<String>,
        shipping_address: Option<serde_json::Value>,
        notes: Option<String>,
    ) -> PaymentResult<Order> {
        let lock = self.session_lock(session_id);
        let result = {
            let _guard = lock.lock().await;
            self.complete_locked(session_id, payment_method, shipping_address, notes)
                .await
        };
        self.release_session_lock(session_id, &lock);
        result
    }

    async fn complete_locked(
        &self,
        session_id: &str,
        payment_method: Option<String>,
        shipping_address: Option<serde_json::Value>,
        notes: Option<String>,
    ) -> PaymentResult<Order> {
        let session = self.fetch(session_id).await?;

        // expiry is re-derived from the timestamps, not read from the
        // stored status, closing the race where a session was read as
        // pending just before its TTL elapsed
        let now = self.clock.now();
        if session.is_expired(now) || session.status == SessionStatus::Expired {
            if session.status == SessionStatus::Pending {
                // lazy expiry applies to any read that observes it; the
                // rejection stands even if the flip fails to persist
                let flip = self
                    .sessions
                    .update(
                        session_id,
                        Box::new(|s| {
                            if s.status == SessionStatus::Pending {
                                s.status = SessionStatus::Expired;
                            }
                            Ok(())
                        }),
                    )
                    .await;
                if let Err(e) = flip {
                    warn!(session_id = %session_id, "failed to persist expiry: {}", e);
                }
            }
            return Err(PaymentError::SessionExpired {
                session_id: session_id.to_string(),
            });
        }
        if session.status == SessionStatus::Completed {
            return Err(PaymentError::AlreadyCompleted {
                session_id: session_id.to_string(),
            });
        }

        let order_id = uuid::Uuid::new_v4().to_string();
        let transaction_id = uuid::Uuid::new_v4().to_string();
        let method = payment_method.unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string());

        let order = Order::from_session(
            &session,
            order_id.clone(),
            transaction_id.clone(),
            method.clone(),
            shipping_address,
            notes,
            now,
        );

        // order first: if this write fails the session is untouched
        self.orders.insert(order.clone()).await?;

        let completed_order_id = order_id.clone();
        let completed_transaction_id = transaction_id.clone();
        let updated = self
            .sessions
            .update(
                session_id,
                Box::new(move |s| match s.status {
                    SessionStatus::Pending => {
                        s.status = SessionStatus::Completed;
                        s.completed_at = Some(now);
                        s.order_id = Some(completed_order_id);
                        s.transaction_id = Some(completed_transaction_id);
                        s.payment_method = Some(method);
                        Ok(())
                    }
                    // a concurrent read may have flipped the stored status
                    // after our fetch; report what is actually there
                    SessionStatus::Expired => Err(PaymentError::SessionExpired {
                        session_id: s.session_id.clone(),
                    }),
                    SessionStatus::Completed => Err(PaymentError::AlreadyCompleted {
                        session_id: s.session_id.clone(),
                    }),
                }),
            )
            .await;

        if let Err(err) = updated {
            warn!(
                session_id = %session_id,
                order_id = %order_id,
                "session update failed after order write, rolling back order: {}",
                err
            );
            if let Err(cleanup) = self.orders.remove(&order_id).await {
                error!(order_id = %order_id, "order rollback failed: {}", cleanup);
            }
            return Err(err);
        }

        info!(
            session_id = %session_id,
            order_id = %order_id,
            transaction_id = %transaction_id,
            amount = %order.totals.total,
            "payment completed"
        );
        Ok(order)
    }

    /// Fetch an order by id
    pub async fn order(&self, order_id: &str) -> PaymentResult<Order> {
        self.orders
            .get(order_id)
            .await?
            .ok_or_else(|| PaymentError::OrderNotFound {
                order_id: order_id.to_string(),
            })
    }

    /// Orders belonging to a customer email
    pub async fn orders_for(&self, email: &str) -> PaymentResult<Vec<Order>> {
        self.orders.find_by_email(email).await
    }

    /// All orders (admin view)
    pub async fn all_orders(&self) -> PaymentResult<Vec<Order>> {
        self.orders.list().await
    }

    /// Admin update of the order-management status, stamping `updatedAt`
    pub async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> PaymentResult<Order> {
        let now = self.clock.now();
        let updated = self
            .orders
            .update(
                order_id,
                Box::new(move |o| {
                    o.status = status;
                    o.updated_at = Some(now);
                    Ok(())
                }),
            )
            .await?;

        info!(order_id = %order_id, status = %status, "order status updated");
        Ok(updated)
    }

    async fn fetch(&self, session_id: &str) -> PaymentResult<PaymentSession> {
        self.sessions
            .get(session_id)
            .await?
            .ok_or_else(|| PaymentError::SessionNotFound {
                session_id: session_id.to_string(),
            })
    }

    fn session_lock(&self, session_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self
            .completion_locks
            .lock()
            .expect("completion lock registry poisoned");
        locks.entry(session_id.to_string()).or_default().clone()
    }

    /// Drop the registry entry once no other caller holds the lock,
    /// so the map does not grow by one mutex per checkout forever.
    fn release_session_lock(&self, session_id: &str, handle: &Arc<Mutex<()>>) {
        let mut locks = self
            .completion_locks
            .lock()
            .expect("completion lock registry poisoned");
        // two strong refs mean the registry entry plus our handle; more
        // means another completion is waiting on it
        if Arc::strong_count(handle) <= 2 {
            locks.remove(session_id);
        }
    }

    #[cfg(test)]
    fn completion_lock_count(&self) -> usize {
        self.completion_locks
            .lock()
            .expect("completion lock registry poisoned")
            .len()
    }
}
