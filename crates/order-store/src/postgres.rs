use async_trait::async_trait;
use chrono::Utc;
use common::{Money, OrderId, UserId};
use domain::{Address, Order, OrderLine, OrderStatus, PaymentDetails, PaymentUpdate};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::store::OrderStore;
use crate::{Result, StoreError};

/// PostgreSQL-backed order store.
///
/// Orders live in a single `orders` table; line items and payment details
/// are JSONB columns. A `seq` column breaks creation-time ties for the
/// recency ordering.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let products_json: serde_json::Value = row.try_get("products")?;
        let products: Vec<OrderLine> = serde_json::from_value(products_json)?;

        let details_json: Option<serde_json::Value> = row.try_get("payment_details")?;
        let payment_details: Option<PaymentDetails> =
            details_json.map(serde_json::from_value).transpose()?;

        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            user: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            address: Address {
                full_address: row.try_get("full_address")?,
            },
            products,
            total_price: Money::from_cents(row.try_get("total_price_cents")?),
            payment_method: parse_enum(row.try_get::<String, _>("payment_method")?)?,
            payment_status: parse_enum(row.try_get::<String, _>("payment_status")?)?,
            payment_details,
            status: parse_enum(row.try_get::<String, _>("status")?)?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Parses a TEXT column holding one of the serde-serialized enum names.
fn parse_enum<T: serde::de::DeserializeOwned>(value: String) -> Result<T> {
    Ok(serde_json::from_value(serde_json::Value::String(value))?)
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    #[tracing::instrument(skip(self, order), fields(order_id = %order.id))]
    async fn insert(&self, mut order: Order) -> Result<Order> {
        order.validate().map_err(StoreError::InvalidOrder)?;

        let now = Utc::now();
        order.created_at = now;
        order.updated_at = now;

        let products = serde_json::to_value(&order.products)?;
        let payment_details = order
            .payment_details
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, user_id, name, email, phone, full_address,
                products, total_price_cents, payment_method, payment_status,
                payment_details, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.user.as_uuid())
        .bind(&order.name)
        .bind(&order.email)
        .bind(&order.phone)
        .bind(&order.address.full_address)
        .bind(products)
        .bind(order.total_price.cents())
        .bind(order.payment_method.as_str())
        .bind(order.payment_status.as_str())
        .bind(payment_details)
        .bind(order.status.as_str())
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;

        metrics::counter!("orders_inserted").increment(1);
        Ok(order)
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query("SELECT * FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            "SELECT * FROM orders WHERE email = $1 ORDER BY created_at DESC, seq DESC",
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn find_all(&self) -> Result<Vec<Order>> {
        let rows = sqlx::query("SELECT * FROM orders ORDER BY created_at DESC, seq DESC")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    #[tracing::instrument(skip(self))]
    async fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<Order> {
        let row = sqlx::query(
            "UPDATE orders SET status = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id.as_uuid())
        .bind(status.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or(StoreError::OrderNotFound(id))?;
        Self::row_to_order(row)
    }

    #[tracing::instrument(skip(self, update))]
    async fn update_payment(&self, id: OrderId, update: PaymentUpdate) -> Result<Order> {
        let details = update
            .payment_details
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;

        // COALESCE keeps the existing details when none are supplied.
        let row = sqlx::query(
            r#"
            UPDATE orders
            SET payment_status = $2,
                payment_details = COALESCE($3, payment_details),
                updated_at = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id.as_uuid())
        .bind(update.payment_status.as_str())
        .bind(details)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or(StoreError::OrderNotFound(id))?;
        Self::row_to_order(row)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: OrderId) -> Result<()> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::OrderNotFound(id));
        }
        metrics::counter!("orders_deleted").increment(1);
        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}
