//! Order creation: the lifecycle engine's derivation and validation step.

use chrono::{DateTime, Utc};
use common::OrderId;

use super::{Order, OrderDraft, OrderError, OrderLine, OrderStatus, PaymentMethod, PaymentStatus};
use crate::principal::Principal;

/// Derives the initial payment status at creation time.
///
/// Cash-on-delivery orders always start pending. Gateway orders are marked
/// paid when the payload already carries a transaction id, pending
/// otherwise. The transaction id is trusted at face value; no gateway
/// verification happens here. Hardening this means consuming a verified
/// payment-event callback instead, not tightening this check.
pub fn derive_payment_status(method: PaymentMethod, draft: &OrderDraft) -> PaymentStatus {
    match method {
        PaymentMethod::CashOnDelivery => PaymentStatus::Pending,
        PaymentMethod::OnlineGateway => {
            let has_transaction = draft
                .payment_details
                .as_ref()
                .and_then(|d| d.transaction_id.as_deref())
                .is_some_and(|id| !id.is_empty());
            if has_transaction {
                PaymentStatus::Paid
            } else {
                PaymentStatus::Pending
            }
        }
    }
}

/// Assembles a new order from a draft and the resolved principal.
///
/// Attaches the principal as owner, defaults the payment method to
/// cash-on-delivery, derives the payment status, and validates the
/// invariants. The returned order carries a freshly assigned id; the store
/// stamps `created_at`/`updated_at` on insert.
pub fn assemble(draft: OrderDraft, principal: &Principal) -> Result<Order, OrderError> {
    let payment_method = draft.payment_method.unwrap_or_default();
    let payment_status = derive_payment_status(payment_method, &draft);
    tracing::debug!(%payment_method, %payment_status, "derived payment status");

    let products: Vec<OrderLine> = draft
        .products
        .iter()
        .map(|line| OrderLine {
            book: line.book,
            quantity: line.quantity,
            price: line.price,
        })
        .collect();

    let epoch = DateTime::<Utc>::UNIX_EPOCH;
    let order = Order {
        id: OrderId::new(),
        user: principal.id,
        name: draft.name.ok_or(OrderError::MissingField("name"))?,
        email: draft.email.ok_or(OrderError::MissingField("email"))?,
        phone: draft.phone.ok_or(OrderError::MissingField("phone"))?,
        address: super::Address {
            full_address: draft
                .full_address
                .ok_or(OrderError::MissingField("address.full_address"))?,
        },
        products,
        total_price: draft
            .total_price
            .ok_or(OrderError::MissingField("total_price"))?,
        payment_method,
        payment_status,
        payment_details: draft.payment_details,
        status: OrderStatus::Pending,
        created_at: epoch,
        updated_at: epoch,
    };

    order.validate()?;
    Ok(order)
}
