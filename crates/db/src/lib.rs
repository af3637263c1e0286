pub mod connection;
pub mod migrations;
pub mod repositories;

pub use connection::{connect_with_settings, DbPool};
pub use repositories::agreements::{
    AgreementStore, InMemoryAgreementRepository, SqlAgreementRepository,
};
pub use repositories::quotes::{
    InMemoryQuoteRepository, QuoteStore, SqlQuoteRepository, StoredQuote,
};
pub use repositories::RepositoryError;
