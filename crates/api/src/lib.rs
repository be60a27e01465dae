//! HTTP API server with observability for the order backend.
//!
//! Provides REST endpoints for order management and admin statistics, with
//! structured logging (tracing) and Prometheus metrics. The JWT principal
//! gate adapter lives here too; the rest of the system only sees resolved
//! principals.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post, put};
use catalog::CatalogReader;
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::OrderStore;
use stats::StatsAggregator;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use auth::JwtGate;
use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: OrderStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::create::<S>))
        .route("/orders", get(routes::orders::list::<S>))
        .route("/orders/email/{email}", get(routes::orders::by_email::<S>))
        .route("/orders/{id}", get(routes::orders::get::<S>))
        .route("/orders/{id}", delete(routes::orders::remove::<S>))
        .route("/orders/{id}/status", put(routes::orders::update_status::<S>))
        .route(
            "/orders/{id}/payment",
            put(routes::orders::update_payment::<S>),
        )
        .route("/stats", get(routes::stats::get::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Assembles the shared application state.
pub fn build_state<S: OrderStore + Clone>(
    store: S,
    catalog: Arc<dyn CatalogReader>,
    jwt_secret: &str,
) -> Arc<AppState<S>> {
    let stats = StatsAggregator::new(store.clone(), catalog.clone());
    Arc::new(AppState {
        store,
        catalog,
        gate: JwtGate::new(jwt_secret),
        stats,
    })
}
