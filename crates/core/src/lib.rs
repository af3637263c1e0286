pub mod config;
pub mod domain;
pub mod errors;
pub mod valuation;

pub use domain::agreement::{Agreement, AgreementId, AgreementStatus};
pub use domain::asset::{AssetDescriptor, Category, Condition};
pub use domain::quote::{Quote, QuoteId};
pub use errors::ValuationError;
pub use valuation::engine::ValuationEngine;
pub use valuation::listing::{ListingHit, ListingSearch, SearchUnavailable};
pub use valuation::research::{
    MarketDataSource, MarketResearch, SourceQuote, SourceUnavailable,
};
