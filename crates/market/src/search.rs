use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use vaulted_core::{ListingHit, ListingSearch, SearchUnavailable};

const USER_AGENT: &str = concat!("vaulted-market/", env!("CARGO_PKG_VERSION"));

/// Web-search client behind the existence check. The engine treats any
/// `SearchUnavailable` as a pass, so this client only has to be honest about
/// failure, not resilient to it.
pub struct HttpListingSearch {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic_results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
}

impl HttpListingSearch {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, SearchUnavailable> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|error| SearchUnavailable(format!("http client build failed: {error}")))?;

        Ok(Self { client, base_url: base_url.into(), api_key: api_key.into() })
    }
}

#[async_trait]
impl ListingSearch for HttpListingSearch {
    async fn search(&self, query: &str) -> Result<Vec<ListingHit>, SearchUnavailable> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", query), ("api_key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|error| SearchUnavailable(format!("listing search request: {error}")))?;

        if !response.status().is_success() {
            return Err(SearchUnavailable(format!(
                "listing search returned status {}",
                response.status()
            )));
        }

        let payload: SearchResponse = response
            .json()
            .await
            .map_err(|error| SearchUnavailable(format!("listing search decode: {error}")))?;

        debug!(
            event_name = "market.listing_search.completed",
            query = %query,
            hits = payload.organic_results.len(),
            "listing search completed"
        );

        Ok(payload
            .organic_results
            .into_iter()
            .map(|result| ListingHit { title: result.title, snippet: result.snippet })
            .collect())
    }
}

/// Stands in when no search API key is configured. Always reports the
/// provider as unavailable, which the engine absorbs as a pass.
pub struct DisabledListingSearch;

#[async_trait]
impl ListingSearch for DisabledListingSearch {
    async fn search(&self, _query: &str) -> Result<Vec<ListingHit>, SearchUnavailable> {
        Err(SearchUnavailable("listing search is not configured".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use vaulted_core::ListingSearch;

    use super::DisabledListingSearch;

    #[tokio::test]
    async fn disabled_search_reports_unavailable() {
        let error = DisabledListingSearch.search("Rolex Submariner price buy").await.unwrap_err();
        assert!(error.0.contains("not configured"));
    }
}
