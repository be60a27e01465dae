//! The statistics aggregator.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use catalog::CatalogReader;
use domain::{Order, OrderStatus, PaymentMethod, PaymentStatus};
use order_store::OrderStore;

use crate::report::{
    MonthlyBucket, PaymentMethodBucket, PaymentStatusBucket, RecentOrder, RecentOrderLine,
    StatisticsReport, StatusBucket,
};
use crate::Result;

/// How many orders the recent-orders view returns.
const RECENT_ORDERS_LIMIT: usize = 10;

/// Builds statistics reports over the order store and the catalog.
///
/// Each of the nine views performs its own read; the views share no
/// intermediate state, so a report may mix pre- and post-update state across
/// views when writes race the aggregation. Acceptable for a dashboard, not
/// for reconciliation.
pub struct StatsAggregator<S> {
    store: S,
    catalog: Arc<dyn CatalogReader>,
}

impl<S: OrderStore> StatsAggregator<S> {
    /// Creates an aggregator over the given store and catalog.
    pub fn new(store: S, catalog: Arc<dyn CatalogReader>) -> Self {
        Self { store, catalog }
    }

    /// Computes a full report. Any failing view aborts the whole report.
    #[tracing::instrument(skip(self))]
    pub async fn report(&self) -> Result<StatisticsReport> {
        let total_orders = self.store.count().await?;
        let total_sales_cents = total_sales(&self.store.find_all().await?);
        let orders_by_payment_method = by_payment_method(&self.store.find_all().await?);
        let orders_by_status = by_status(&self.store.find_all().await?);
        let orders_by_payment_status = by_payment_status(&self.store.find_all().await?);
        let trending_books = self.catalog.trending_count().await?;
        let total_books = self.catalog.count().await?;
        let monthly_sales = monthly(&self.store.find_all().await?);
        let recent_orders = self.recent().await?;

        metrics::counter!("stats_reports_generated").increment(1);

        Ok(StatisticsReport {
            total_orders,
            total_sales_cents,
            orders_by_payment_method,
            orders_by_status,
            orders_by_payment_status,
            trending_books,
            total_books,
            monthly_sales,
            recent_orders,
        })
    }

    async fn recent(&self) -> Result<Vec<RecentOrder>> {
        let orders = self.store.find_all().await?;
        let recent: Vec<&Order> = orders.iter().take(RECENT_ORDERS_LIMIT).collect();

        let book_ids: Vec<_> = recent
            .iter()
            .flat_map(|o| o.products.iter().map(|line| line.book))
            .collect();
        let books = self.catalog.get_many(&book_ids).await?;

        Ok(recent
            .into_iter()
            .map(|order| resolve_recent(order, &books))
            .collect())
    }
}

/// Sums raw stored totals, in cents. The display-rounding read applies to
/// individual orders, not to aggregation.
pub fn total_sales(orders: &[Order]) -> i64 {
    orders.iter().map(|o| o.total_price.cents()).sum()
}

/// Groups by payment method: count and summed cents, count descending.
pub fn by_payment_method(orders: &[Order]) -> Vec<PaymentMethodBucket> {
    let mut groups: HashMap<PaymentMethod, (u64, i64)> = HashMap::new();
    for order in orders {
        let entry = groups.entry(order.payment_method).or_default();
        entry.0 += 1;
        entry.1 += order.total_price.cents();
    }

    let mut buckets: Vec<_> = groups
        .into_iter()
        .map(|(payment_method, (count, total_amount_cents))| PaymentMethodBucket {
            payment_method,
            count,
            total_amount_cents,
        })
        .collect();
    buckets.sort_by(|a, b| b.count.cmp(&a.count));
    buckets
}

/// Groups by fulfillment status: count, descending. Order among equal
/// counts is unspecified beyond the sort key.
pub fn by_status(orders: &[Order]) -> Vec<StatusBucket> {
    let mut groups: HashMap<OrderStatus, u64> = HashMap::new();
    for order in orders {
        *groups.entry(order.status).or_default() += 1;
    }

    let mut buckets: Vec<_> = groups
        .into_iter()
        .map(|(status, count)| StatusBucket { status, count })
        .collect();
    buckets.sort_by(|a, b| b.count.cmp(&a.count));
    buckets
}

/// Groups by payment status: count and summed cents, count descending.
pub fn by_payment_status(orders: &[Order]) -> Vec<PaymentStatusBucket> {
    let mut groups: HashMap<PaymentStatus, (u64, i64)> = HashMap::new();
    for order in orders {
        let entry = groups.entry(order.payment_status).or_default();
        entry.0 += 1;
        entry.1 += order.total_price.cents();
    }

    let mut buckets: Vec<_> = groups
        .into_iter()
        .map(|(payment_status, (count, total_amount_cents))| PaymentStatusBucket {
            payment_status,
            count,
            total_amount_cents,
        })
        .collect();
    buckets.sort_by(|a, b| b.count.cmp(&a.count));
    buckets
}

/// Buckets sales by creation `"YYYY-MM"`, ascending. Months without orders
/// have no bucket.
pub fn monthly(orders: &[Order]) -> Vec<MonthlyBucket> {
    let mut groups: BTreeMap<String, (i64, u64)> = BTreeMap::new();
    for order in orders {
        let month = order.created_at.format("%Y-%m").to_string();
        let entry = groups.entry(month).or_default();
        entry.0 += order.total_price.cents();
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|(month, (total_sales_cents, total_orders))| MonthlyBucket {
            month,
            total_sales_cents,
            total_orders,
        })
        .collect()
}

/// Projects one order into the recent view, resolving catalog display
/// fields from the batch lookup. Missing books keep the line with its
/// snapshot price and no title.
pub fn resolve_recent(
    order: &Order,
    books: &HashMap<common::BookId, catalog::Book>,
) -> RecentOrder {
    let products = order
        .products
        .iter()
        .map(|line| {
            let book = books.get(&line.book);
            RecentOrderLine {
                book: line.book,
                quantity: line.quantity,
                price_cents: line.price.cents(),
                title: book.map(|b| b.title.clone()),
                catalog_price_cents: book.map(|b| b.price.cents()),
            }
        })
        .collect();

    RecentOrder {
        id: order.id,
        name: order.name.clone(),
        email: order.email.clone(),
        status: order.status,
        total_price: order.total_price.rounded_units(),
        created_at: order.created_at,
        products,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{Book, InMemoryCatalog};
    use chrono::TimeZone;
    use chrono::Utc;
    use common::{BookId, Money, OrderId, UserId};
    use domain::{Address, OrderLine};
    use order_store::InMemoryOrderStore;

    fn make_order(total_units: i64, status: OrderStatus) -> Order {
        Order {
            id: OrderId::new(),
            user: UserId::new(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            phone: "0123456789".to_string(),
            address: Address {
                full_address: "1 Main St".to_string(),
            },
            products: vec![],
            total_price: Money::from_units(total_units),
            payment_method: PaymentMethod::CashOnDelivery,
            payment_status: PaymentStatus::Pending,
            payment_details: None,
            status,
            created_at: Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap(),
        }
    }

    fn empty_catalog() -> Arc<dyn CatalogReader> {
        Arc::new(InMemoryCatalog::new())
    }

    #[test]
    fn total_sales_sums_raw_cents() {
        let orders = vec![
            make_order(100, OrderStatus::Pending),
            make_order(200, OrderStatus::Pending),
            make_order(300, OrderStatus::Delivered),
        ];
        assert_eq!(total_sales(&orders), 60000);
        assert_eq!(total_sales(&[]), 0);
    }

    #[test]
    fn by_status_counts_sorted_descending() {
        let orders = vec![
            make_order(100, OrderStatus::Pending),
            make_order(200, OrderStatus::Pending),
            make_order(300, OrderStatus::Delivered),
        ];

        let buckets = by_status(&orders);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].status, OrderStatus::Pending);
        assert_eq!(buckets[0].count, 2);
        assert_eq!(buckets[1].status, OrderStatus::Delivered);
        assert_eq!(buckets[1].count, 1);
    }

    #[test]
    fn by_payment_method_counts_and_sums() {
        let mut gateway = make_order(50, OrderStatus::Pending);
        gateway.payment_method = PaymentMethod::OnlineGateway;

        let orders = vec![
            make_order(100, OrderStatus::Pending),
            make_order(200, OrderStatus::Pending),
            gateway,
        ];

        let buckets = by_payment_method(&orders);
        assert_eq!(buckets[0].payment_method, PaymentMethod::CashOnDelivery);
        assert_eq!(buckets[0].count, 2);
        assert_eq!(buckets[0].total_amount_cents, 30000);
        assert_eq!(buckets[1].payment_method, PaymentMethod::OnlineGateway);
        assert_eq!(buckets[1].count, 1);
        assert_eq!(buckets[1].total_amount_cents, 5000);
    }

    #[test]
    fn by_payment_status_counts_and_sums() {
        let mut paid = make_order(70, OrderStatus::Pending);
        paid.payment_status = PaymentStatus::Paid;

        let orders = vec![
            make_order(100, OrderStatus::Pending),
            make_order(200, OrderStatus::Pending),
            paid,
        ];

        let buckets = by_payment_status(&orders);
        assert_eq!(buckets[0].payment_status, PaymentStatus::Pending);
        assert_eq!(buckets[0].count, 2);
        assert_eq!(buckets[1].payment_status, PaymentStatus::Paid);
        assert_eq!(buckets[1].total_amount_cents, 7000);
    }

    #[test]
    fn monthly_buckets_ascending() {
        let mut january = make_order(100, OrderStatus::Pending);
        january.created_at = Utc.with_ymd_and_hms(2024, 1, 20, 0, 0, 0).unwrap();
        let mut march = make_order(200, OrderStatus::Pending);
        march.created_at = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
        let mut december_prior = make_order(300, OrderStatus::Pending);
        december_prior.created_at = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
        let mut january_again = make_order(50, OrderStatus::Pending);
        january_again.created_at = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();

        let buckets = monthly(&[january, march, december_prior, january_again]);

        assert_eq!(
            buckets,
            vec![
                MonthlyBucket {
                    month: "2023-12".to_string(),
                    total_sales_cents: 30000,
                    total_orders: 1,
                },
                MonthlyBucket {
                    month: "2024-01".to_string(),
                    total_sales_cents: 15000,
                    total_orders: 2,
                },
                MonthlyBucket {
                    month: "2024-03".to_string(),
                    total_sales_cents: 20000,
                    total_orders: 1,
                },
            ]
        );
    }

    #[test]
    fn resolve_recent_tolerates_missing_books() {
        let known = Book {
            id: BookId::new(),
            title: "Known Book".to_string(),
            price: Money::from_cents(1500),
            trending: false,
        };
        let missing = BookId::new();

        let mut order = make_order(20, OrderStatus::Pending);
        order.total_price = Money::from_cents(1960);
        order.products = vec![
            OrderLine {
                book: known.id,
                quantity: 1,
                price: Money::from_cents(1460),
            },
            OrderLine {
                book: missing,
                quantity: 1,
                price: Money::from_cents(500),
            },
        ];

        let books = HashMap::from([(known.id, known.clone())]);
        let recent = resolve_recent(&order, &books);

        assert_eq!(recent.total_price, 20);
        assert_eq!(recent.products.len(), 2);
        assert_eq!(recent.products[0].title.as_deref(), Some("Known Book"));
        assert_eq!(recent.products[0].catalog_price_cents, Some(1500));
        assert!(recent.products[1].title.is_none());
        assert_eq!(recent.products[1].price_cents, 500);
    }

    #[tokio::test]
    async fn empty_store_yields_zeroed_report() {
        let aggregator = StatsAggregator::new(InMemoryOrderStore::new(), empty_catalog());
        let report = aggregator.report().await.unwrap();

        assert_eq!(report.total_orders, 0);
        assert_eq!(report.total_sales_cents, 0);
        assert!(report.orders_by_payment_method.is_empty());
        assert!(report.orders_by_status.is_empty());
        assert!(report.orders_by_payment_status.is_empty());
        assert!(report.monthly_sales.is_empty());
        assert!(report.recent_orders.is_empty());
        assert_eq!(report.trending_books, 0);
        assert_eq!(report.total_books, 0);
    }

    #[tokio::test]
    async fn three_order_scenario() {
        let store = InMemoryOrderStore::new();
        store.insert(make_order(100, OrderStatus::Pending)).await.unwrap();
        store.insert(make_order(200, OrderStatus::Pending)).await.unwrap();
        store
            .insert(make_order(300, OrderStatus::Delivered))
            .await
            .unwrap();

        let aggregator = StatsAggregator::new(store, empty_catalog());
        let report = aggregator.report().await.unwrap();

        assert_eq!(report.total_orders, 3);
        assert_eq!(report.total_sales_cents, 60000);
        assert_eq!(report.orders_by_status[0].status, OrderStatus::Pending);
        assert_eq!(report.orders_by_status[0].count, 2);
        assert_eq!(report.orders_by_status[1].status, OrderStatus::Delivered);
        assert_eq!(report.orders_by_status[1].count, 1);
        // All three landed in the same calendar month.
        assert_eq!(report.monthly_sales.len(), 1);
        assert_eq!(report.monthly_sales[0].total_orders, 3);
        assert_eq!(report.monthly_sales[0].total_sales_cents, 60000);
    }

    #[tokio::test]
    async fn recent_orders_caps_at_ten_most_recent_first() {
        let store = InMemoryOrderStore::new();
        let mut inserted = Vec::new();
        for i in 0..11 {
            let stored = store
                .insert(make_order(i + 1, OrderStatus::Pending))
                .await
                .unwrap();
            inserted.push(stored.id);
        }

        let aggregator = StatsAggregator::new(store, empty_catalog());
        let report = aggregator.report().await.unwrap();

        assert_eq!(report.recent_orders.len(), 10);
        // Most recent first; the very first insert fell off the end.
        inserted.reverse();
        let got: Vec<OrderId> = report.recent_orders.iter().map(|o| o.id).collect();
        assert_eq!(&got[..], &inserted[..10]);
    }

    #[tokio::test]
    async fn catalog_counts_flow_into_report() {
        let catalog = InMemoryCatalog::with_books([
            Book {
                id: BookId::new(),
                title: "A".to_string(),
                price: Money::from_cents(1000),
                trending: true,
            },
            Book {
                id: BookId::new(),
                title: "B".to_string(),
                price: Money::from_cents(2000),
                trending: false,
            },
        ]);

        let aggregator =
            StatsAggregator::new(InMemoryOrderStore::new(), Arc::new(catalog));
        let report = aggregator.report().await.unwrap();

        assert_eq!(report.total_books, 2);
        assert_eq!(report.trending_books, 1);
    }

    #[test]
    fn report_serializes_snake_case_with_integer_cents() {
        let report = StatisticsReport {
            total_orders: 1,
            total_sales_cents: 1960,
            orders_by_payment_method: vec![],
            orders_by_status: vec![StatusBucket {
                status: OrderStatus::Pending,
                count: 1,
            }],
            orders_by_payment_status: vec![],
            trending_books: 0,
            total_books: 0,
            monthly_sales: vec![],
            recent_orders: vec![],
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total_sales_cents"], 1960);
        assert_eq!(json["orders_by_status"][0]["status"], "pending");
        assert_eq!(json["orders_by_status"][0]["count"], 1);
    }
}
