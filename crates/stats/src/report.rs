//! The statistics report and its bucket types.
//!
//! Everything here is plain serializable data: cents as integers, counts as
//! unsigned integers, month buckets as `"YYYY-MM"` strings. The report is
//! recomputed per request and never persisted.

use chrono::{DateTime, Utc};
use common::{BookId, OrderId};
use domain::{OrderStatus, PaymentMethod, PaymentStatus};
use serde::Serialize;

/// Orders grouped by payment method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentMethodBucket {
    pub payment_method: PaymentMethod,
    pub count: u64,
    pub total_amount_cents: i64,
}

/// Orders grouped by fulfillment status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBucket {
    pub status: OrderStatus,
    pub count: u64,
}

/// Orders grouped by payment status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentStatusBucket {
    pub payment_status: PaymentStatus,
    pub count: u64,
    pub total_amount_cents: i64,
}

/// Sales for one `"YYYY-MM"` creation-month bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyBucket {
    pub month: String,
    pub total_sales_cents: i64,
    pub total_orders: u64,
}

/// A line of a recent order with catalog display fields resolved.
///
/// `title` and `catalog_price_cents` are absent when the referenced book no
/// longer exists; the line's own `price_cents` snapshot is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentOrderLine {
    pub book: BookId,
    pub quantity: u32,
    pub price_cents: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_price_cents: Option<i64>,
}

/// One of the ten most recently created orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentOrder {
    pub id: OrderId,
    pub name: String,
    pub email: String,
    pub status: OrderStatus,
    /// The display-rounded total, in whole currency units.
    pub total_price: i64,
    pub created_at: DateTime<Utc>,
    pub products: Vec<RecentOrderLine>,
}

/// The merged report: nine independently computed views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsReport {
    pub total_orders: u64,
    pub total_sales_cents: i64,
    pub orders_by_payment_method: Vec<PaymentMethodBucket>,
    pub orders_by_status: Vec<StatusBucket>,
    pub orders_by_payment_status: Vec<PaymentStatusBucket>,
    pub trending_books: u64,
    pub total_books: u64,
    pub monthly_sales: Vec<MonthlyBucket>,
    pub recent_orders: Vec<RecentOrder>,
}
