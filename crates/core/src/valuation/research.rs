use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use thiserror::Error;

use crate::domain::asset::{AssetDescriptor, Category};

/// Source label stamped on quotes produced without live market data.
pub const FALLBACK_SOURCE: &str = "Market Analysis";

const FALLBACK_CONFIDENCE: u8 = 60;
const BASE_CONFIDENCE: u8 = 60;
const CONFIDENCE_PER_SOURCE: u8 = 15;
const MAX_CONFIDENCE: u8 = 95;

/// One source's contribution to a valuation.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceQuote {
    pub price: f64,
    pub sources: Vec<String>,
    pub count: u32,
    pub reliability: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MarketResearch {
    pub market_value: f64,
    pub sources: Vec<String>,
    pub confidence: u8,
    pub notes: String,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("market source unavailable: {0}")]
pub struct SourceUnavailable(pub String);

/// Port for one market data provider. Returning `Ok(None)` means the source
/// is healthy but has nothing to say about this asset.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn lookup(
        &self,
        asset: &AssetDescriptor,
    ) -> Result<Option<SourceQuote>, SourceUnavailable>;
}

/// Mean weighted by each source's reliability and sample count. `None` when
/// no quote carries any weight.
pub fn weighted_average(quotes: &[SourceQuote]) -> Option<f64> {
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;

    for quote in quotes {
        let weight = quote.reliability * f64::from(quote.count);
        weighted_sum += quote.price * weight;
        total_weight += weight;
    }

    (total_weight > 0.0).then(|| weighted_sum / total_weight)
}

/// Queries every configured source concurrently and reduces the answers.
/// This step cannot fail: sources that error or return nothing are dropped,
/// and when none remain the category fallback estimate is used.
pub async fn run_research(
    sources: &[Arc<dyn MarketDataSource>],
    asset: &AssetDescriptor,
) -> MarketResearch {
    let lookups = sources.iter().map(|source| source.lookup(asset));
    let results = join_all(lookups).await;

    let quotes: Vec<SourceQuote> = results
        .into_iter()
        .filter_map(|result| result.ok().flatten())
        .filter(|quote| quote.price > 0.0)
        .collect();

    match weighted_average(&quotes) {
        Some(market_value) if market_value > 0.0 => {
            let names =
                quotes.iter().flat_map(|quote| quote.sources.iter().cloned()).collect();
            MarketResearch {
                market_value,
                sources: names,
                confidence: confidence_for(quotes.len()),
                notes: format!(
                    "Weighted average of {} market data source{}",
                    quotes.len(),
                    if quotes.len() == 1 { "" } else { "s" }
                ),
            }
        }
        _ => fallback_research(asset),
    }
}

fn confidence_for(source_count: usize) -> u8 {
    let source_count = u8::try_from(source_count).unwrap_or(u8::MAX);
    source_count
        .saturating_mul(CONFIDENCE_PER_SOURCE)
        .saturating_add(BASE_CONFIDENCE)
        .min(MAX_CONFIDENCE)
}

fn fallback_research(asset: &AssetDescriptor) -> MarketResearch {
    MarketResearch {
        market_value: fallback_base(asset.category_kind()),
        sources: vec![FALLBACK_SOURCE.to_string()],
        confidence: FALLBACK_CONFIDENCE,
        notes: "No live market data available; estimate based on category averages".to_string(),
    }
}

fn fallback_base(category: Option<Category>) -> f64 {
    match category {
        Some(Category::Watches) => 5000.0,
        Some(Category::Jewelry) => 2500.0,
        Some(Category::Handbags) => 2000.0,
        Some(Category::Electronics) => 800.0,
        Some(Category::Instruments) => 1500.0,
        Some(Category::Cameras) => 1200.0,
        Some(Category::Other) | None => 1500.0,
    }
}
