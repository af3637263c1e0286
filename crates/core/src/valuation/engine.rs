use std::sync::Arc;

use chrono::Utc;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::asset::AssetDescriptor;
use crate::domain::quote::Quote;
use crate::errors::ValuationError;
use crate::valuation::listing::ListingSearch;
use crate::valuation::research::MarketDataSource;
use crate::valuation::{brands, checklist, listing, research, screening};

/// Runs the full valuation pipeline: input screening, brand catalog check,
/// online listing confirmation, detail checklist, then concurrent market
/// research and the price derivation chain.
pub struct ValuationEngine {
    listing: Arc<dyn ListingSearch>,
    sources: Vec<Arc<dyn MarketDataSource>>,
}

impl ValuationEngine {
    pub fn new(listing: Arc<dyn ListingSearch>, sources: Vec<Arc<dyn MarketDataSource>>) -> Self {
        Self { listing, sources }
    }

    pub async fn generate_quote(
        &self,
        session_id: &str,
        asset: &AssetDescriptor,
    ) -> Result<Quote, ValuationError> {
        screening::screen(&asset.brand, &asset.model)?;
        brands::verify(asset)?;
        self.confirm_listings(asset).await?;
        checklist::verify(asset)?;

        let research = research::run_research(&self.sources, asset).await;

        let researched_market_value = Decimal::from_f64(research.market_value)
            .unwrap_or(Decimal::ZERO)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let condition_factor = asset.condition_factor();
        let final_market_value = (researched_market_value * condition_factor)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        // Purchase offer is 40% of the adjusted market value; buyback lets the
        // seller reclaim the item at a 10% premium over the offer.
        let quote_amount = (final_market_value * Decimal::new(40, 2))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        let buyback_amount = (quote_amount * Decimal::new(110, 2))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

        let created_at = Utc::now();
        Ok(Quote {
            session_id: session_id.to_string(),
            asset: asset.clone(),
            researched_market_value,
            final_market_value,
            quote_amount,
            buyback_amount,
            confidence_score: research.confidence,
            valuation_sources: research.sources,
            research_notes: research.notes,
            condition_factor,
            created_at,
            expires_at: Quote::expiry_from(created_at),
        })
    }

    async fn confirm_listings(&self, asset: &AssetDescriptor) -> Result<(), ValuationError> {
        let query = listing::listing_query(&asset.brand, &asset.model);
        match self.listing.search(&query).await {
            Ok(hits) => listing::evaluate_hits(&asset.brand, &asset.model, &hits),
            // An unreachable provider must not block quoting.
            Err(_) => Ok(()),
        }
    }
}
