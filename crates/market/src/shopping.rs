use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;
use vaulted_core::domain::asset::AssetDescriptor;
use vaulted_core::{MarketDataSource, SourceQuote, SourceUnavailable};

const SOURCE_NAME: &str = "Shopping Search Results";
const RELIABILITY: f64 = 0.70;
const USER_AGENT: &str = concat!("vaulted-market/", env!("CARGO_PKG_VERSION"));

/// Shopping-search price probe. Requires an API key; without one the source
/// stays silent so the weighted average is unaffected.
pub struct ShoppingSearchSource {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ShoppingResponse {
    #[serde(default)]
    shopping_results: Vec<ShoppingResult>,
}

#[derive(Debug, Deserialize)]
struct ShoppingResult {
    #[serde(default)]
    price: String,
}

impl ShoppingSearchSource {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, SourceUnavailable> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|error| SourceUnavailable(format!("http client build failed: {error}")))?;

        Ok(Self { client, base_url: base_url.into(), api_key })
    }

    fn parse_price(raw: &str) -> Option<f64> {
        static PRICE: OnceLock<Regex> = OnceLock::new();
        let pattern = PRICE
            .get_or_init(|| Regex::new(r"\$\s*([0-9][0-9,]*(?:\.[0-9]{1,2})?)").expect("valid regex"));
        let captures = pattern.captures(raw)?;
        captures[1].replace(',', "").parse::<f64>().ok()
    }
}

#[async_trait]
impl MarketDataSource for ShoppingSearchSource {
    async fn lookup(
        &self,
        asset: &AssetDescriptor,
    ) -> Result<Option<SourceQuote>, SourceUnavailable> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(None);
        };

        let query = format!("{} {}", asset.brand.trim(), asset.model.trim());
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", query.as_str()), ("api_key", api_key)])
            .send()
            .await
            .map_err(|error| SourceUnavailable(format!("shopping search request: {error}")))?;

        if !response.status().is_success() {
            return Err(SourceUnavailable(format!(
                "shopping search returned status {}",
                response.status()
            )));
        }

        let payload: ShoppingResponse = response
            .json()
            .await
            .map_err(|error| SourceUnavailable(format!("shopping search decode: {error}")))?;

        let prices: Vec<f64> = payload
            .shopping_results
            .iter()
            .filter_map(|result| Self::parse_price(&result.price))
            .filter(|price| *price > 0.0)
            .collect();

        if prices.is_empty() {
            debug!(
                event_name = "market.shopping.no_prices",
                query = %query,
                results = payload.shopping_results.len(),
                "shopping search returned no parseable prices"
            );
            return Ok(None);
        }

        let count = u32::try_from(prices.len()).unwrap_or(u32::MAX);
        let average = prices.iter().sum::<f64>() / prices.len() as f64;
        Ok(Some(SourceQuote {
            price: average,
            sources: vec![SOURCE_NAME.to_string()],
            count,
            reliability: RELIABILITY,
        }))
    }
}
