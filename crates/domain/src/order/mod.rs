//! Order entity and lifecycle rules.

mod draft;
mod entity;
pub mod lifecycle;
mod status;

pub use draft::{OrderDraft, OrderDraftLine, PaymentUpdate};
pub use entity::{Address, Order, OrderLine, PaymentDetails};
pub use status::{OrderStatus, PaymentMethod, PaymentStatus};

use thiserror::Error;

/// Validation errors raised when assembling or persisting an order.
#[derive(Debug, Error)]
pub enum OrderError {
    /// A required field is absent or empty.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A line item quantity below the minimum of 1.
    #[error("Invalid quantity: {quantity} (must be at least 1)")]
    InvalidQuantity { quantity: u32 },

    /// A negative line item price.
    #[error("Invalid price: {cents} cents (must not be negative)")]
    InvalidPrice { cents: i64 },

    /// A negative order total.
    #[error("Invalid total price: {cents} cents (must not be negative)")]
    InvalidTotalPrice { cents: i64 },
}
