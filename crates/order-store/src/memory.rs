use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::OrderId;
use domain::{Order, OrderStatus, PaymentUpdate};
use tokio::sync::RwLock;

use crate::store::OrderStore;
use crate::{Result, StoreError};

/// A stored order together with its insertion sequence number.
///
/// The sequence breaks creation-time ties so "most recent first" is a total
/// order even when inserts land on the same timestamp.
#[derive(Debug, Clone)]
struct StoredOrder {
    order: Order,
    seq: u64,
}

#[derive(Default)]
struct Inner {
    orders: HashMap<OrderId, StoredOrder>,
    next_seq: u64,
}

/// In-memory order store.
///
/// Used by the test suites and as the default runtime store when no
/// database is configured. Provides the same interface and semantics as the
/// PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all orders.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.orders.clear();
    }

    fn sorted_desc(mut entries: Vec<StoredOrder>) -> Vec<Order> {
        entries.sort_by(|a, b| {
            b.order
                .created_at
                .cmp(&a.order.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        entries.into_iter().map(|e| e.order).collect()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, mut order: Order) -> Result<Order> {
        order.validate().map_err(StoreError::InvalidOrder)?;

        let now = Utc::now();
        order.created_at = now;
        order.updated_at = now;

        let mut inner = self.inner.write().await;
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.orders.insert(
            order.id,
            StoredOrder {
                order: order.clone(),
                seq,
            },
        );

        metrics::counter!("orders_inserted").increment(1);
        Ok(order)
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>> {
        let inner = self.inner.read().await;
        Ok(inner.orders.get(&id).map(|e| e.order.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Vec<Order>> {
        let inner = self.inner.read().await;
        let entries: Vec<StoredOrder> = inner
            .orders
            .values()
            .filter(|e| e.order.email == email)
            .cloned()
            .collect();
        Ok(Self::sorted_desc(entries))
    }

    async fn find_all(&self) -> Result<Vec<Order>> {
        let inner = self.inner.read().await;
        let entries: Vec<StoredOrder> = inner.orders.values().cloned().collect();
        Ok(Self::sorted_desc(entries))
    }

    async fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<Order> {
        let mut inner = self.inner.write().await;
        let entry = inner
            .orders
            .get_mut(&id)
            .ok_or(StoreError::OrderNotFound(id))?;
        entry.order.status = status;
        entry.order.updated_at = Utc::now();
        Ok(entry.order.clone())
    }

    async fn update_payment(&self, id: OrderId, update: PaymentUpdate) -> Result<Order> {
        let mut inner = self.inner.write().await;
        let entry = inner
            .orders
            .get_mut(&id)
            .ok_or(StoreError::OrderNotFound(id))?;
        entry.order.payment_status = update.payment_status;
        if let Some(details) = update.payment_details {
            entry.order.payment_details = Some(details);
        }
        entry.order.updated_at = Utc::now();
        Ok(entry.order.clone())
    }

    async fn delete(&self, id: OrderId) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner
            .orders
            .remove(&id)
            .ok_or(StoreError::OrderNotFound(id))?;
        metrics::counter!("orders_deleted").increment(1);
        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        let inner = self.inner.read().await;
        Ok(inner.orders.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{BookId, Money, UserId};
    use domain::{Address, OrderLine, PaymentDetails, PaymentMethod, PaymentStatus};

    fn make_order(email: &str, total_cents: i64) -> Order {
        Order {
            id: OrderId::new(),
            user: UserId::new(),
            name: "Alice".to_string(),
            email: email.to_string(),
            phone: "0123456789".to_string(),
            address: Address {
                full_address: "1 Main St".to_string(),
            },
            products: vec![OrderLine {
                book: BookId::new(),
                quantity: 1,
                price: Money::from_cents(total_cents),
            }],
            total_price: Money::from_cents(total_cents),
            payment_method: PaymentMethod::CashOnDelivery,
            payment_status: PaymentStatus::Pending,
            payment_details: None,
            status: domain::OrderStatus::Pending,
            created_at: chrono::DateTime::UNIX_EPOCH,
            updated_at: chrono::DateTime::UNIX_EPOCH,
        }
    }

    #[tokio::test]
    async fn insert_stamps_timestamps_and_preserves_id() {
        let store = InMemoryOrderStore::new();
        let order = make_order("a@example.com", 1000);
        let id = order.id;

        let stored = store.insert(order).await.unwrap();

        assert_eq!(stored.id, id);
        assert!(stored.created_at > chrono::DateTime::UNIX_EPOCH);
        assert_eq!(stored.created_at, stored.updated_at);
    }

    #[tokio::test]
    async fn insert_rejects_invalid_order() {
        let store = InMemoryOrderStore::new();
        let mut order = make_order("a@example.com", 1000);
        order.products[0].quantity = 0;

        let result = store.insert(order).await;
        assert!(matches!(result, Err(StoreError::InvalidOrder(_))));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn find_by_id_returns_none_for_unknown() {
        let store = InMemoryOrderStore::new();
        assert!(store.find_by_id(OrderId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_by_email_filters_and_sorts_most_recent_first() {
        let store = InMemoryOrderStore::new();
        let first = store
            .insert(make_order("a@example.com", 100))
            .await
            .unwrap();
        let second = store
            .insert(make_order("a@example.com", 200))
            .await
            .unwrap();
        store.insert(make_order("b@example.com", 300)).await.unwrap();

        let orders = store.find_by_email("a@example.com").await.unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id, second.id);
        assert_eq!(orders[1].id, first.id);

        assert!(store.find_by_email("c@example.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_all_sorts_most_recent_first() {
        let store = InMemoryOrderStore::new();
        let mut ids = Vec::new();
        for i in 0..5 {
            let stored = store
                .insert(make_order("a@example.com", 100 * (i + 1)))
                .await
                .unwrap();
            ids.push(stored.id);
        }

        let all = store.find_all().await.unwrap();
        assert_eq!(all.len(), 5);
        let got: Vec<OrderId> = all.into_iter().map(|o| o.id).collect();
        ids.reverse();
        assert_eq!(got, ids);
    }

    #[tokio::test]
    async fn update_status_is_idempotent() {
        let store = InMemoryOrderStore::new();
        let stored = store.insert(make_order("a@example.com", 100)).await.unwrap();

        let once = store
            .update_status(stored.id, domain::OrderStatus::Shipped)
            .await
            .unwrap();
        assert_eq!(once.status, domain::OrderStatus::Shipped);

        let twice = store
            .update_status(stored.id, domain::OrderStatus::Shipped)
            .await
            .unwrap();
        assert_eq!(twice.status, domain::OrderStatus::Shipped);
    }

    #[tokio::test]
    async fn update_status_of_unknown_id_is_not_found() {
        let store = InMemoryOrderStore::new();
        let result = store
            .update_status(OrderId::new(), domain::OrderStatus::Delivered)
            .await;
        assert!(matches!(result, Err(StoreError::OrderNotFound(_))));
    }

    #[tokio::test]
    async fn update_payment_without_details_keeps_existing_details() {
        let store = InMemoryOrderStore::new();
        let mut order = make_order("a@example.com", 100);
        order.payment_details = Some(PaymentDetails {
            transaction_id: Some("TX-1".to_string()),
            ..Default::default()
        });
        let stored = store.insert(order).await.unwrap();

        let updated = store
            .update_payment(
                stored.id,
                PaymentUpdate {
                    payment_status: PaymentStatus::Paid,
                    payment_details: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.payment_status, PaymentStatus::Paid);
        let details = updated.payment_details.unwrap();
        assert_eq!(details.transaction_id.as_deref(), Some("TX-1"));
    }

    #[tokio::test]
    async fn update_payment_with_details_replaces_them_whole() {
        let store = InMemoryOrderStore::new();
        let mut order = make_order("a@example.com", 100);
        order.payment_details = Some(PaymentDetails {
            transaction_id: Some("TX-1".to_string()),
            payment_proof: Some("proof.png".to_string()),
            ..Default::default()
        });
        let stored = store.insert(order).await.unwrap();

        let updated = store
            .update_payment(
                stored.id,
                PaymentUpdate {
                    payment_status: PaymentStatus::Refunded,
                    payment_details: Some(PaymentDetails {
                        transaction_id: Some("TX-2".to_string()),
                        ..Default::default()
                    }),
                },
            )
            .await
            .unwrap();

        let details = updated.payment_details.unwrap();
        assert_eq!(details.transaction_id.as_deref(), Some("TX-2"));
        assert!(details.payment_proof.is_none());
    }

    #[tokio::test]
    async fn delete_twice_yields_not_found_second_time() {
        let store = InMemoryOrderStore::new();
        let stored = store.insert(make_order("a@example.com", 100)).await.unwrap();

        store.delete(stored.id).await.unwrap();
        let again = store.delete(stored.id).await;
        assert!(matches!(again, Err(StoreError::OrderNotFound(_))));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn count_and_clear() {
        let store = InMemoryOrderStore::new();
        store.insert(make_order("a@example.com", 100)).await.unwrap();
        store.insert(make_order("b@example.com", 200)).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 2);

        store.clear().await;
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
