//! Intake quote endpoints.
//!
//! - `POST /api/quotes`: run the valuation pipeline, persist, return the quote
//! - `GET /api/quotes/{session_id}`: latest persisted quote for an intake session

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use vaulted_core::domain::asset::AssetDescriptor;
use vaulted_core::ValuationEngine;
use vaulted_db::{AgreementStore, QuoteStore, RepositoryError, StoredQuote};
use vaulted_signing::SigningService;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ValuationEngine>,
    pub quotes: Arc<dyn QuoteStore>,
    pub agreements: Arc<dyn AgreementStore>,
    pub signing: Arc<dyn SigningService>,
    pub webhook_secret: Option<String>,
    pub return_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequestBody {
    pub session_id: String,
    pub asset_category: String,
    pub asset_brand: String,
    pub asset_model: String,
    pub asset_condition: String,
    #[serde(default)]
    pub asset_description: Option<String>,
    #[serde(default)]
    pub estimated_value: Option<Decimal>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetData {
    pub category: String,
    pub brand: String,
    pub model: String,
    pub condition: String,
    pub description: Option<String>,
    pub user_estimated_value: Option<Decimal>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub quote_id: String,
    pub session_id: String,
    pub asset_data: AssetData,
    pub researched_market_value: Decimal,
    pub final_market_value: Decimal,
    pub quote_amount: Decimal,
    pub buyback_amount: Decimal,
    pub confidence_score: u8,
    pub valuation_sources: Vec<String>,
    pub research_notes: String,
    pub condition_adjustment_factor: Decimal,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

pub type ApiResult<T> = Result<(StatusCode, Json<T>), (StatusCode, Json<ApiError>)>;

impl QuoteRequestBody {
    fn into_descriptor(self) -> (String, AssetDescriptor) {
        let descriptor = AssetDescriptor {
            category: self.asset_category,
            brand: self.asset_brand,
            model: self.asset_model,
            condition: self.asset_condition,
            description: self.asset_description,
            user_estimated_value: self.estimated_value,
        };
        (self.session_id, descriptor)
    }
}

impl QuoteResponse {
    fn from_stored(stored: StoredQuote) -> Self {
        let quote = stored.quote;
        Self {
            quote_id: stored.id.0,
            session_id: quote.session_id,
            asset_data: AssetData {
                category: quote.asset.category,
                brand: quote.asset.brand,
                model: quote.asset.model,
                condition: quote.asset.condition,
                description: quote.asset.description,
                user_estimated_value: quote.asset.user_estimated_value,
            },
            researched_market_value: quote.researched_market_value,
            final_market_value: quote.final_market_value,
            quote_amount: quote.quote_amount,
            buyback_amount: quote.buyback_amount,
            confidence_score: quote.confidence_score,
            valuation_sources: quote.valuation_sources,
            research_notes: quote.research_notes,
            condition_adjustment_factor: quote.condition_factor,
            created_at: quote.created_at,
            expires_at: quote.expires_at,
        }
    }
}

pub fn bad_request(message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (StatusCode::BAD_REQUEST, Json(ApiError { error: message.into() }))
}

pub fn internal_error(message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ApiError { error: message.into() }))
}

pub async fn create_quote(
    State(state): State<AppState>,
    Json(body): Json<QuoteRequestBody>,
) -> ApiResult<QuoteResponse> {
    let (session_id, descriptor) = body.into_descriptor();

    // Both terminal error kinds are the caller's problem: the wire contract
    // maps them to 400 with the engine's actionable message.
    let quote = state.engine.generate_quote(&session_id, &descriptor).await.map_err(|error| {
        info!(
            event_name = "intake.quote.rejected",
            session_id = %session_id,
            reason = %error,
            "valuation request rejected"
        );
        bad_request(error.message())
    })?;

    let stored = state.quotes.insert(&quote).await.map_err(|db_error| {
        error!(
            event_name = "intake.quote.persist_failed",
            session_id = %session_id,
            error = %db_error,
            "quote could not be persisted"
        );
        internal_error("Failed to save quote")
    })?;

    info!(
        event_name = "intake.quote.created",
        session_id = %session_id,
        quote_id = %stored.id.0,
        quote_amount = %stored.quote.quote_amount,
        confidence = stored.quote.confidence_score,
        "quote created"
    );

    Ok((StatusCode::CREATED, Json(QuoteResponse::from_stored(stored))))
}

pub async fn get_quote(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<QuoteResponse> {
    match state.quotes.latest_for_session(&session_id).await {
        Ok(stored) => Ok((StatusCode::OK, Json(QuoteResponse::from_stored(stored)))),
        Err(RepositoryError::NotFound) => Err((
            StatusCode::NOT_FOUND,
            Json(ApiError { error: "No quote found for this session".to_string() }),
        )),
        Err(db_error) => {
            error!(
                event_name = "intake.quote.fetch_failed",
                session_id = %session_id,
                error = %db_error,
                "quote lookup failed"
            );
            Err(internal_error("Failed to load quote"))
        }
    }
}


#[cfg(test)]
mod tests {
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::Json;
    use rust_decimal::Decimal;

    use super::test_support::test_state;
    use super::{create_quote, get_quote, QuoteRequestBody};

    fn watch_request(session_id: &str) -> QuoteRequestBody {
        QuoteRequestBody {
            session_id: session_id.to_string(),
            asset_category: "Luxury Watches".to_string(),
            asset_brand: "Rolex".to_string(),
            asset_model: "Submariner".to_string(),
            asset_condition: "good".to_string(),
            asset_description: Some("2019, ref 116610, full box and papers".to_string()),
            estimated_value: Some(Decimal::new(900000, 2)),
        }
    }

    #[tokio::test]
    async fn create_quote_returns_created_with_the_amount_chain() {
        let state = test_state(10000.0);

        let (status, Json(payload)) =
            create_quote(State(state), Json(watch_request("sess-api-1")))
                .await
                .expect("quote should issue");

        assert_eq!(status, StatusCode::CREATED);
        assert!(payload.quote_id.starts_with("vq-"));
        assert_eq!(payload.session_id, "sess-api-1");
        // 10000 * 0.70 = 7000; 7000 * 0.40 = 2800; 2800 * 1.10 = 3080.
        assert_eq!(payload.final_market_value, Decimal::new(7000, 0));
        assert_eq!(payload.quote_amount, Decimal::new(2800, 0));
        assert_eq!(payload.buyback_amount, Decimal::new(3080, 0));
        assert_eq!(payload.condition_adjustment_factor, Decimal::new(70, 2));
        assert_eq!(payload.asset_data.brand, "Rolex");
    }

    #[tokio::test]
    async fn invalid_input_maps_to_bad_request_with_the_engine_message() {
        let state = test_state(10000.0);
        let mut request = watch_request("sess-api-2");
        request.asset_brand = "aaaa".to_string();

        let (status, Json(payload)) =
            create_quote(State(state), Json(request)).await.unwrap_err();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload.error, "Invalid product information detected");
    }

    #[tokio::test]
    async fn thin_description_maps_to_bad_request_with_the_checklist() {
        let state = test_state(10000.0);
        let mut request = watch_request("sess-api-3");
        request.asset_description = Some("nice watch".to_string());

        let (status, Json(payload)) =
            create_quote(State(state), Json(request)).await.unwrap_err();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(payload.error.contains("please add"));
    }

    #[tokio::test]
    async fn store_failure_maps_to_internal_server_error() {
        let mut state = test_state(10000.0);
        state.quotes = std::sync::Arc::new(super::test_support::FailingQuoteStore);

        let (status, Json(payload)) =
            create_quote(State(state), Json(watch_request("sess-api-6"))).await.unwrap_err();

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(payload.error, "Failed to save quote");
    }

    #[tokio::test]
    async fn get_quote_returns_the_latest_persisted_quote() {
        let state = test_state(10000.0);

        create_quote(State(state.clone()), Json(watch_request("sess-api-4")))
            .await
            .expect("quote should issue");

        let (status, Json(payload)) =
            get_quote(State(state), Path("sess-api-4".to_string()))
                .await
                .expect("quote should be found");

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.session_id, "sess-api-4");
        assert_eq!(payload.quote_amount, Decimal::new(2800, 0));
    }

    #[tokio::test]
    async fn get_quote_for_unknown_session_is_not_found() {
        let state = test_state(10000.0);

        let (status, Json(payload)) =
            get_quote(State(state), Path("sess-none".to_string())).await.unwrap_err();

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(payload.error.contains("No quote found"));
    }
}
