//! Market-data collaborators for the valuation engine: the completed-sales
//! comparable lookup, the shopping-search price probe, the per-category
//! price index, and the HTTP listing search behind the existence check.

pub mod completed_sales;
pub mod estimator;
pub mod jitter;
pub mod search;
pub mod shopping;

pub use completed_sales::CompletedSalesSource;
pub use estimator::CategoryEstimatorSource;
pub use jitter::Jitter;
pub use search::{DisabledListingSearch, HttpListingSearch};
pub use shopping::ShoppingSearchSource;
