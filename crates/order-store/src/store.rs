use async_trait::async_trait;
use common::OrderId;
use domain::{Order, OrderStatus, PaymentUpdate};

use crate::Result;

/// Core trait for order store implementations.
///
/// All implementations must be thread-safe (Send + Sync). The store owns
/// `created_at`/`updated_at`: insert stamps both, every update bumps
/// `updated_at`. Conflicting writes to the same order are serialized at the
/// storage layer with last-write-wins semantics; there is no optimistic
/// locking.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new order and returns it as stored.
    ///
    /// Rejects with [`crate::StoreError::InvalidOrder`] when a schema-level
    /// invariant is violated.
    async fn insert(&self, order: Order) -> Result<Order>;

    /// Looks up a single order by id.
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>>;

    /// Returns the orders placed under the given contact email, most recent
    /// first. Empty when none match.
    async fn find_by_email(&self, email: &str) -> Result<Vec<Order>>;

    /// Returns all orders, most recent first. Recency ties are broken by
    /// insertion sequence so the ordering is total.
    async fn find_all(&self) -> Result<Vec<Order>>;

    /// Sets the fulfillment status of an order.
    ///
    /// Fetch-or-fail: [`crate::StoreError::OrderNotFound`] when the id does
    /// not resolve. Applying the current status again succeeds.
    async fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<Order>;

    /// Applies a payment update: the payment status always, the payment
    /// details only when supplied (a supplied value replaces the previous
    /// details as a whole).
    async fn update_payment(&self, id: OrderId, update: PaymentUpdate) -> Result<Order>;

    /// Removes an order. Fetch-or-fail.
    async fn delete(&self, id: OrderId) -> Result<()>;

    /// Total number of stored orders.
    async fn count(&self) -> Result<u64>;
}
