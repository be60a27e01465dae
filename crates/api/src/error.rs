//! API error types with HTTP response mapping.
//!
//! Internal failures (store, catalog, aggregation) are logged with detail
//! server-side and returned with a generic message; storage error text never
//! reaches the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{AuthError, OrderError};
use order_store::StoreError;
use stats::StatsError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// The payload failed a schema-level invariant.
    Validation(OrderError),
    /// The credential was missing, malformed, or did not resolve.
    Auth(AuthError),
    /// A valid principal without the required role.
    Forbidden(&'static str),
    /// Resource not found.
    NotFound(String),
    /// Malformed request data outside the order payload (e.g. a bad id).
    BadRequest(String),
    /// Order store failure.
    Store(StoreError),
    /// Catalog collaborator failure.
    Catalog(catalog::CatalogError),
    /// Statistics aggregation failure.
    Stats(StatsError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            ApiError::Auth(err) => (StatusCode::UNAUTHORIZED, err.to_string()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Store(err) => store_error_to_response(err),
            ApiError::Catalog(err) => {
                tracing::error!(error = %err, "catalog failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Stats(err) => {
                tracing::error!(error = %err, "statistics aggregation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to fetch admin stats".to_string(),
                )
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn store_error_to_response(err: StoreError) -> (StatusCode, String) {
    match &err {
        StoreError::OrderNotFound(id) => {
            (StatusCode::NOT_FOUND, format!("Order {id} not found"))
        }
        StoreError::InvalidOrder(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        StoreError::Database(_) | StoreError::Migration(_) | StoreError::Serialization(_) => {
            tracing::error!(error = %err, "order store failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl From<catalog::CatalogError> for ApiError {
    fn from(err: catalog::CatalogError) -> Self {
        ApiError::Catalog(err)
    }
}

impl From<StatsError> for ApiError {
    fn from(err: StatsError) -> Self {
        ApiError::Stats(err)
    }
}
