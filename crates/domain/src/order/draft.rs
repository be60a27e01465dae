//! Caller-supplied order payloads.

use common::{BookId, Money};
use serde::Deserialize;

use super::{PaymentDetails, PaymentMethod, PaymentStatus};

fn default_quantity() -> u32 {
    1
}

/// A line item as supplied by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderDraftLine {
    pub book: BookId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub price: Money,
}

/// The order creation payload.
///
/// Required fields are optional here so that an absent field surfaces as a
/// validation failure rather than a body-parse failure; the lifecycle
/// engine performs the checks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub full_address: Option<String>,
    #[serde(default)]
    pub products: Vec<OrderDraftLine>,
    #[serde(default)]
    pub total_price: Option<Money>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub payment_details: Option<PaymentDetails>,
}

/// A partial payment update: `payment_details` is replaced only when
/// supplied.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentUpdate {
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_details: Option<PaymentDetails>,
}
