//! Order persistence.
//!
//! The [`OrderStore`] trait is the storage seam of the system; two
//! implementations are provided: [`InMemoryOrderStore`] for tests and
//! single-process deployments, and [`PostgresOrderStore`] for durable
//! storage.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryOrderStore;
pub use postgres::PostgresOrderStore;
pub use store::OrderStore;
