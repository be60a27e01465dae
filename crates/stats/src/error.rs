//! Statistics error types.

use thiserror::Error;

/// Errors that can occur while aggregating statistics.
///
/// A failure in any sub-view is fatal for the whole report; there is no
/// partial-report degradation.
#[derive(Debug, Error)]
pub enum StatsError {
    /// An error occurred reading the order store.
    #[error("Order store error: {0}")]
    Store(#[from] order_store::StoreError),

    /// An error occurred reading the catalog.
    #[error("Catalog error: {0}")]
    Catalog(#[from] catalog::CatalogError),
}

/// Result type for statistics operations.
pub type Result<T> = std::result::Result<T, StatsError>;
