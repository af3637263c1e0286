use std::sync::Arc;

use async_trait::async_trait;
use vaulted_core::domain::asset::AssetDescriptor;
use vaulted_core::{MarketDataSource, SourceQuote, SourceUnavailable};

use crate::jitter::Jitter;

const SOURCE_NAME: &str = "Recent Completed Sales";
const RELIABILITY: f64 = 0.85;
const PRICE_SPREAD: f64 = 0.30;

/// Comparable entry: every keyword must appear in the lowercased
/// `"{brand} {model}"` text. More specific entries come first so a model
/// match wins over its brand baseline.
struct Comparable {
    keywords: &'static [&'static str],
    median_price: f64,
    sale_count: u32,
}

const COMPARABLES: &[Comparable] = &[
    Comparable { keywords: &["rolex", "submariner"], median_price: 9500.0, sale_count: 14 },
    Comparable { keywords: &["rolex", "datejust"], median_price: 7200.0, sale_count: 11 },
    Comparable { keywords: &["rolex"], median_price: 8000.0, sale_count: 9 },
    Comparable { keywords: &["patek", "nautilus"], median_price: 58000.0, sale_count: 3 },
    Comparable { keywords: &["patek"], median_price: 28000.0, sale_count: 4 },
    Comparable { keywords: &["omega", "speedmaster"], median_price: 3800.0, sale_count: 12 },
    Comparable { keywords: &["omega"], median_price: 2600.0, sale_count: 8 },
    Comparable { keywords: &["cartier"], median_price: 4200.0, sale_count: 7 },
    Comparable { keywords: &["tiffany"], median_price: 1800.0, sale_count: 10 },
    Comparable { keywords: &["hermes", "birkin"], median_price: 12000.0, sale_count: 5 },
    Comparable { keywords: &["hermes"], median_price: 6500.0, sale_count: 6 },
    Comparable { keywords: &["chanel", "classic"], median_price: 6200.0, sale_count: 9 },
    Comparable { keywords: &["chanel"], median_price: 4300.0, sale_count: 8 },
    Comparable { keywords: &["louis vuitton"], median_price: 1900.0, sale_count: 12 },
    Comparable { keywords: &["gucci"], median_price: 1100.0, sale_count: 10 },
    Comparable { keywords: &["apple", "iphone 15"], median_price: 650.0, sale_count: 30 },
    Comparable { keywords: &["apple", "iphone"], median_price: 480.0, sale_count: 28 },
    Comparable { keywords: &["apple", "macbook"], median_price: 1100.0, sale_count: 18 },
    Comparable { keywords: &["apple"], median_price: 520.0, sale_count: 20 },
    Comparable { keywords: &["canon"], median_price: 1400.0, sale_count: 9 },
    Comparable { keywords: &["nikon"], median_price: 1300.0, sale_count: 8 },
    Comparable { keywords: &["sony"], median_price: 900.0, sale_count: 11 },
    Comparable { keywords: &["gibson", "les paul"], median_price: 2300.0, sale_count: 7 },
    Comparable { keywords: &["gibson"], median_price: 1900.0, sale_count: 6 },
    Comparable { keywords: &["fender", "stratocaster"], median_price: 1500.0, sale_count: 9 },
    Comparable { keywords: &["fender"], median_price: 1200.0, sale_count: 8 },
    Comparable { keywords: &["steinway"], median_price: 32000.0, sale_count: 2 },
];

/// Marketplace comparable lookup. Prices come from a fixed table of recent
/// sale medians with jitter standing in for listing-to-listing variation.
pub struct CompletedSalesSource {
    jitter: Arc<Jitter>,
}

impl CompletedSalesSource {
    pub fn new(jitter: Arc<Jitter>) -> Self {
        Self { jitter }
    }

    fn find_comparable(brand: &str, model: &str) -> Option<&'static Comparable> {
        let text = format!("{} {}", brand.trim(), model.trim()).to_lowercase();
        COMPARABLES
            .iter()
            .find(|comparable| comparable.keywords.iter().all(|keyword| text.contains(keyword)))
    }
}

#[async_trait]
impl MarketDataSource for CompletedSalesSource {
    async fn lookup(
        &self,
        asset: &AssetDescriptor,
    ) -> Result<Option<SourceQuote>, SourceUnavailable> {
        let Some(comparable) = Self::find_comparable(&asset.brand, &asset.model) else {
            return Ok(None);
        };

        let price = comparable.median_price * self.jitter.factor(PRICE_SPREAD);
        Ok(Some(SourceQuote {
            price,
            sources: vec![SOURCE_NAME.to_string()],
            count: comparable.sale_count,
            reliability: RELIABILITY,
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use vaulted_core::domain::asset::AssetDescriptor;
    use vaulted_core::MarketDataSource;

    use super::{CompletedSalesSource, PRICE_SPREAD, RELIABILITY};
    use crate::jitter::Jitter;

    fn asset(brand: &str, model: &str) -> AssetDescriptor {
        AssetDescriptor {
            category: "Luxury Watches".to_string(),
            brand: brand.to_string(),
            model: model.to_string(),
            condition: "good".to_string(),
            description: None,
            user_estimated_value: None,
        }
    }

    #[tokio::test]
    async fn model_specific_comparable_wins_over_brand_baseline() {
        let source = CompletedSalesSource::new(Arc::new(Jitter::seeded(3)));
        let quote = source
            .lookup(&asset("Rolex", "Submariner Date"))
            .await
            .expect("lookup")
            .expect("comparable exists");

        assert!((9500.0 * (1.0 - PRICE_SPREAD)..=9500.0 * (1.0 + PRICE_SPREAD))
            .contains(&quote.price));
        assert_eq!(quote.count, 14);
        assert_eq!(quote.reliability, RELIABILITY);
        assert_eq!(quote.sources, vec!["Recent Completed Sales".to_string()]);
    }

    #[tokio::test]
    async fn brand_baseline_applies_to_unlisted_models() {
        let source = CompletedSalesSource::new(Arc::new(Jitter::seeded(3)));
        let quote = source
            .lookup(&asset("Rolex", "Air-King"))
            .await
            .expect("lookup")
            .expect("brand baseline exists");

        assert_eq!(quote.count, 9);
    }

    #[tokio::test]
    async fn unknown_brands_contribute_nothing() {
        let source = CompletedSalesSource::new(Arc::new(Jitter::seeded(3)));
        let quote = source.lookup(&asset("Olivetti", "Lettera 32")).await.expect("lookup");
        assert!(quote.is_none());
    }

    #[tokio::test]
    async fn matching_is_case_insensitive() {
        let source = CompletedSalesSource::new(Arc::new(Jitter::seeded(3)));
        let quote = source.lookup(&asset("LOUIS VUITTON", "Neverfull MM")).await.expect("lookup");
        assert!(quote.is_some());
    }
}
