//! Order endpoints.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use catalog::{Book, CatalogReader};
use chrono::{DateTime, Utc};
use common::{BookId, OrderId, UserId};
use domain::{
    Operation, Order, OrderDraft, OrderStatus, PaymentDetails, PaymentMethod, PaymentStatus,
    PaymentUpdate, PrincipalGate, order::lifecycle,
};
use order_store::OrderStore;
use serde::{Deserialize, Serialize};
use stats::StatsAggregator;
use uuid::Uuid;

use crate::auth::{JwtGate, authorize, bearer_token};
use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S> {
    pub store: S,
    pub catalog: Arc<dyn CatalogReader>,
    pub gate: JwtGate,
    pub stats: StatsAggregator<S>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderLineResponse {
    pub book: BookId,
    pub quantity: u32,
    pub price_cents: i64,
    /// Resolved from the catalog; absent when the book no longer exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_price_cents: Option<i64>,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: OrderId,
    pub user: UserId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub full_address: String,
    pub products: Vec<OrderLineResponse>,
    /// Derived from `products`; kept for legacy clients.
    pub product_ids: Vec<BookId>,
    /// Exact stored total.
    pub total_price_cents: i64,
    /// The display-rounded total, in whole currency units.
    pub total_price: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_details: Option<PaymentDetails>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct DeletedResponse {
    pub message: &'static str,
    pub id: OrderId,
}

fn to_response(order: Order, books: &HashMap<BookId, Book>) -> OrderResponse {
    let product_ids = order.product_ids();
    let products = order
        .products
        .iter()
        .map(|line| {
            let book = books.get(&line.book);
            OrderLineResponse {
                book: line.book,
                quantity: line.quantity,
                price_cents: line.price.cents(),
                title: book.map(|b| b.title.clone()),
                catalog_price_cents: book.map(|b| b.price.cents()),
            }
        })
        .collect();

    OrderResponse {
        id: order.id,
        user: order.user,
        name: order.name,
        email: order.email,
        phone: order.phone,
        full_address: order.address.full_address,
        products,
        product_ids,
        total_price_cents: order.total_price.cents(),
        total_price: order.total_price.rounded_units(),
        payment_method: order.payment_method,
        payment_status: order.payment_status,
        payment_details: order.payment_details,
        status: order.status,
        created_at: order.created_at,
        updated_at: order.updated_at,
    }
}

/// Resolves catalog display fields for a batch of orders in one lookup.
/// Dangling references are tolerated, never an error.
async fn resolve_books<S>(
    state: &AppState<S>,
    orders: &[Order],
) -> Result<HashMap<BookId, Book>, ApiError> {
    let ids: Vec<BookId> = orders
        .iter()
        .flat_map(|o| o.products.iter().map(|line| line.book))
        .collect();
    Ok(state.catalog.get_many(&ids).await?)
}

// -- Handlers --

/// POST /orders — place a new order. Any authenticated principal.
#[tracing::instrument(skip(state, headers, draft))]
pub async fn create<S: OrderStore>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Json(draft): Json<OrderDraft>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let principal = state.gate.resolve(bearer_token(&headers))?;
    authorize(Operation::CreateOrder, &principal)?;

    let order = lifecycle::assemble(draft, &principal)?;
    let stored = state.store.insert(order).await?;
    metrics::counter!("orders_created").increment(1);

    let books = resolve_books(&state, std::slice::from_ref(&stored)).await?;
    Ok((StatusCode::CREATED, Json(to_response(stored, &books))))
}

/// GET /orders — list all orders, most recent first. Admin only.
#[tracing::instrument(skip(state, headers))]
pub async fn list<S: OrderStore>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let principal = state.gate.resolve(bearer_token(&headers))?;
    authorize(Operation::ListAllOrders, &principal)?;

    let orders = state.store.find_all().await?;
    let books = resolve_books(&state, &orders).await?;
    Ok(Json(
        orders.into_iter().map(|o| to_response(o, &books)).collect(),
    ))
}

/// GET /orders/email/{email} — orders placed under a contact email, most
/// recent first. Requires authentication only; there is no ownership check
/// (see DESIGN.md).
#[tracing::instrument(skip(state, headers))]
pub async fn by_email<S: OrderStore>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Path(email): Path<String>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let principal = state.gate.resolve(bearer_token(&headers))?;
    authorize(Operation::ReadOrdersByEmail, &principal)?;

    let orders = state.store.find_by_email(&email).await?;
    let books = resolve_books(&state, &orders).await?;
    Ok(Json(
        orders.into_iter().map(|o| to_response(o, &books)).collect(),
    ))
}

/// GET /orders/{id} — a single order. Requires authentication only.
#[tracing::instrument(skip(state, headers))]
pub async fn get<S: OrderStore>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderResponse>, ApiError> {
    let principal = state.gate.resolve(bearer_token(&headers))?;
    authorize(Operation::ReadOrder, &principal)?;

    let id = OrderId::from_uuid(id);
    let order = state
        .store
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Order {id} not found")))?;

    let books = resolve_books(&state, std::slice::from_ref(&order)).await?;
    Ok(Json(to_response(order, &books)))
}

/// PUT /orders/{id}/status — set the fulfillment status. Admin only.
#[tracing::instrument(skip(state, headers, req))]
pub async fn update_status<S: OrderStore>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let principal = state.gate.resolve(bearer_token(&headers))?;
    authorize(Operation::UpdateOrderStatus, &principal)?;

    let updated = state
        .store
        .update_status(OrderId::from_uuid(id), req.status)
        .await?;

    let books = resolve_books(&state, std::slice::from_ref(&updated)).await?;
    Ok(Json(to_response(updated, &books)))
}

/// PUT /orders/{id}/payment — set the payment status and, when supplied,
/// replace the payment details. Admin only.
#[tracing::instrument(skip(state, headers, update))]
pub async fn update_payment<S: OrderStore>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(update): Json<PaymentUpdate>,
) -> Result<Json<OrderResponse>, ApiError> {
    let principal = state.gate.resolve(bearer_token(&headers))?;
    authorize(Operation::UpdatePaymentStatus, &principal)?;

    let updated = state
        .store
        .update_payment(OrderId::from_uuid(id), update)
        .await?;

    let books = resolve_books(&state, std::slice::from_ref(&updated)).await?;
    Ok(Json(to_response(updated, &books)))
}

/// DELETE /orders/{id} — remove an order. Admin only.
#[tracing::instrument(skip(state, headers))]
pub async fn remove<S: OrderStore>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let principal = state.gate.resolve(bearer_token(&headers))?;
    authorize(Operation::DeleteOrder, &principal)?;

    let id = OrderId::from_uuid(id);
    state.store.delete(id).await?;
    Ok(Json(DeletedResponse {
        message: "Order deleted",
        id,
    }))
}
