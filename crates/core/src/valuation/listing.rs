use async_trait::async_trait;
use thiserror::Error;

use crate::errors::ValuationError;

/// One result from an online listing search.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListingHit {
    pub title: String,
    pub snippet: String,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("listing search unavailable: {0}")]
pub struct SearchUnavailable(pub String);

/// Port for the online listing lookup used to cross-check that a submitted
/// brand and model actually exist as a sellable product.
#[async_trait]
pub trait ListingSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<ListingHit>, SearchUnavailable>;
}

pub fn listing_query(brand: &str, model: &str) -> String {
    format!("{} {} price buy", brand.trim(), model.trim())
}

/// Decides whether a successful search confirms the item. A transport failure
/// never reaches this point; the caller treats it as confirmation so that a
/// flaky search provider cannot block quoting.
pub(crate) fn evaluate_hits(
    brand: &str,
    model: &str,
    hits: &[ListingHit],
) -> Result<(), ValuationError> {
    if hits.is_empty() {
        return Err(ValuationError::Validation(
            "No results found for this item. Please verify the brand and model are correct."
                .to_string(),
        ));
    }

    let brand_lc = brand.trim().to_lowercase();
    let model_lc = model.trim().to_lowercase();
    let confirmed = hits.iter().any(|hit| {
        let text = format!("{} {}", hit.title, hit.snippet).to_lowercase();
        text.contains(&brand_lc) || text.contains(&model_lc)
    });

    if confirmed {
        Ok(())
    } else {
        Err(ValuationError::Validation(
            "Product information does not match online listings. Please verify the details."
                .to_string(),
        ))
    }
}
