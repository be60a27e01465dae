//! The order entity.

use chrono::{DateTime, Utc};
use common::{BookId, Money, OrderId, UserId};
use serde::{Deserialize, Serialize};

use super::{OrderError, OrderStatus, PaymentMethod, PaymentStatus};

/// Delivery address snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub full_address: String,
}

/// A line item: a catalog reference with quantity and a price snapshot.
///
/// `price` is the price at order time, never a live catalog lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub book: BookId,
    pub quantity: u32,
    pub price: Money,
}

/// Gateway payment details, replaced as a whole when updated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaymentDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_proof: Option<String>,
}

/// A customer's purchase record.
///
/// Created once by the lifecycle engine from a validated draft; afterwards
/// mutated only through explicit status/payment updates, and destroyed only
/// by an explicit delete. `created_at`/`updated_at` are owned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// The placing principal.
    pub user: UserId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Address,
    pub products: Vec<OrderLine>,
    pub total_price: Money,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_details: Option<PaymentDetails>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// The referenced catalog ids, derived from the line items.
    ///
    /// Legacy clients expect a flat id array next to `products`; deriving it
    /// keeps the two from ever diverging.
    pub fn product_ids(&self) -> Vec<BookId> {
        self.products.iter().map(|line| line.book).collect()
    }

    /// Checks the schema-level invariants.
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.name.trim().is_empty() {
            return Err(OrderError::MissingField("name"));
        }
        if self.email.trim().is_empty() {
            return Err(OrderError::MissingField("email"));
        }
        if self.phone.trim().is_empty() {
            return Err(OrderError::MissingField("phone"));
        }
        if self.address.full_address.trim().is_empty() {
            return Err(OrderError::MissingField("address.full_address"));
        }
        for line in &self.products {
            if line.quantity < 1 {
                return Err(OrderError::InvalidQuantity {
                    quantity: line.quantity,
                });
            }
            if line.price.is_negative() {
                return Err(OrderError::InvalidPrice {
                    cents: line.price.cents(),
                });
            }
        }
        if self.total_price.is_negative() {
            return Err(OrderError::InvalidTotalPrice {
                cents: self.total_price.cents(),
            });
        }
        Ok(())
    }
}
