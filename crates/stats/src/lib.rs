//! Aggregate business statistics.
//!
//! The aggregator builds a [`StatisticsReport`] on demand from the order
//! store and the catalog: nine independently computed views, merged into
//! one ephemeral report that is never persisted.

pub mod aggregator;
pub mod error;
pub mod report;

pub use aggregator::StatsAggregator;
pub use error::{Result, StatsError};
pub use report::{
    MonthlyBucket, PaymentMethodBucket, PaymentStatusBucket, RecentOrder, RecentOrderLine,
    StatisticsReport, StatusBucket,
};
