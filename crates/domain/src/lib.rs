//! Domain layer for the order backend.
//!
//! This crate provides:
//! - The order entity with its line items and payment details
//! - The three lifecycle enums (order status, payment status, payment method)
//! - The lifecycle engine: creation-time derivation and invariant validation
//! - The principal contract consumed from the authentication collaborator
//! - The flat role-based authorization policy

pub mod order;
pub mod policy;
pub mod principal;

pub use order::{
    Address, Order, OrderDraft, OrderDraftLine, OrderError, OrderLine, OrderStatus, PaymentDetails,
    PaymentMethod, PaymentStatus, PaymentUpdate,
};
pub use policy::{Operation, is_allowed};
pub use principal::{AuthError, Principal, PrincipalGate, Role};
