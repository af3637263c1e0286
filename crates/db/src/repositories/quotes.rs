use std::str::FromStr;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;
use vaulted_core::domain::asset::AssetDescriptor;
use vaulted_core::domain::quote::{Quote, QuoteId};

use crate::repositories::RepositoryError;
use crate::DbPool;

/// A quote as the record store returned it: the engine output plus the id
/// generated at insert time.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredQuote {
    pub id: QuoteId,
    pub quote: Quote,
}

#[async_trait]
pub trait QuoteStore: Send + Sync {
    async fn insert(&self, quote: &Quote) -> Result<StoredQuote, RepositoryError>;
    async fn find(&self, id: &QuoteId) -> Result<StoredQuote, RepositoryError>;
    async fn latest_for_session(&self, session_id: &str) -> Result<StoredQuote, RepositoryError>;
}

/// SQLite-backed quote store. Decimals are persisted as their canonical
/// string form and read back through TEXT casts; the source list is a JSON
/// array so ordering and duplicates survive the round trip.
pub struct SqlQuoteRepository {
    pool: DbPool,
}

impl SqlQuoteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn quote_from_row(row: &SqliteRow) -> Result<StoredQuote, RepositoryError> {
        let id: String = row.try_get("id")?;
        let session_id: String = row.try_get("session_id")?;
        let category: String = row.try_get("asset_category")?;
        let brand: String = row.try_get("asset_brand")?;
        let model: String = row.try_get("asset_model")?;
        let condition: String = row.try_get("asset_condition")?;
        let description: Option<String> = row.try_get("asset_description")?;
        let user_estimated_value_text: Option<String> =
            row.try_get("user_estimated_value_text")?;
        let researched_text: String = row.try_get("researched_market_value_text")?;
        let final_text: String = row.try_get("final_market_value_text")?;
        let quote_amount_text: String = row.try_get("quote_amount_text")?;
        let buyback_amount_text: String = row.try_get("buyback_amount_text")?;
        let confidence_raw: i64 = row.try_get("confidence_score")?;
        let sources_json: String = row.try_get("valuation_sources_json")?;
        let research_notes: String = row.try_get("research_notes")?;
        let condition_factor_text: String = row.try_get("condition_factor_text")?;
        let created_at_text: String = row.try_get("created_at")?;
        let expires_at_text: String = row.try_get("expires_at")?;

        let confidence_score = u8::try_from(confidence_raw).map_err(|_| {
            RepositoryError::Decode(format!(
                "confidence_score `{confidence_raw}` is outside 0..=255"
            ))
        })?;
        let valuation_sources: Vec<String> =
            serde_json::from_str(&sources_json).map_err(|error| {
                RepositoryError::Decode(format!("invalid valuation_sources_json: {error}"))
            })?;
        let user_estimated_value = user_estimated_value_text
            .map(|text| Self::parse_decimal("user_estimated_value", &text))
            .transpose()?;

        Ok(StoredQuote {
            id: QuoteId(id),
            quote: Quote {
                session_id,
                asset: AssetDescriptor {
                    category,
                    brand,
                    model,
                    condition,
                    description,
                    user_estimated_value,
                },
                researched_market_value: Self::parse_decimal(
                    "researched_market_value",
                    &researched_text,
                )?,
                final_market_value: Self::parse_decimal("final_market_value", &final_text)?,
                quote_amount: Self::parse_decimal("quote_amount", &quote_amount_text)?,
                buyback_amount: Self::parse_decimal("buyback_amount", &buyback_amount_text)?,
                confidence_score,
                valuation_sources,
                research_notes,
                condition_factor: Self::parse_decimal(
                    "condition_factor",
                    &condition_factor_text,
                )?,
                created_at: Self::parse_timestamp("created_at", &created_at_text)?,
                expires_at: Self::parse_timestamp("expires_at", &expires_at_text)?,
            },
        })
    }

    fn parse_decimal(field: &str, value: &str) -> Result<Decimal, RepositoryError> {
        Decimal::from_str(value).map_err(|error| {
            RepositoryError::Decode(format!("invalid decimal value for {field}: {error}"))
        })
    }

    fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, RepositoryError> {
        DateTime::parse_from_rfc3339(value)
            .map(|timestamp| timestamp.with_timezone(&Utc))
            .map_err(|error| {
                RepositoryError::Decode(format!("invalid timestamp for {field}: {error}"))
            })
    }
}

const SELECT_QUOTE: &str = r#"
    SELECT
        id,
        session_id,
        asset_category,
        asset_brand,
        asset_model,
        asset_condition,
        asset_description,
        CAST(user_estimated_value AS TEXT) AS user_estimated_value_text,
        CAST(researched_market_value AS TEXT) AS researched_market_value_text,
        CAST(final_market_value AS TEXT) AS final_market_value_text,
        CAST(quote_amount AS TEXT) AS quote_amount_text,
        CAST(buyback_amount AS TEXT) AS buyback_amount_text,
        confidence_score,
        valuation_sources_json,
        research_notes,
        CAST(condition_factor AS TEXT) AS condition_factor_text,
        created_at,
        expires_at
    FROM quote_request
"#;

#[async_trait]
impl QuoteStore for SqlQuoteRepository {
    async fn insert(&self, quote: &Quote) -> Result<StoredQuote, RepositoryError> {
        let id = format!("vq-{}", Uuid::new_v4());
        let sources_json = serde_json::to_string(&quote.valuation_sources).map_err(|error| {
            RepositoryError::Decode(format!("could not encode valuation sources: {error}"))
        })?;

        sqlx::query(
            r#"
            INSERT INTO quote_request (
                id,
                session_id,
                asset_category,
                asset_brand,
                asset_model,
                asset_condition,
                asset_description,
                user_estimated_value,
                researched_market_value,
                final_market_value,
                quote_amount,
                buyback_amount,
                confidence_score,
                valuation_sources_json,
                research_notes,
                condition_factor,
                created_at,
                expires_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&quote.session_id)
        .bind(&quote.asset.category)
        .bind(&quote.asset.brand)
        .bind(&quote.asset.model)
        .bind(&quote.asset.condition)
        .bind(&quote.asset.description)
        .bind(quote.asset.user_estimated_value.map(|value| value.to_string()))
        .bind(quote.researched_market_value.to_string())
        .bind(quote.final_market_value.to_string())
        .bind(quote.quote_amount.to_string())
        .bind(quote.buyback_amount.to_string())
        .bind(i64::from(quote.confidence_score))
        .bind(sources_json)
        .bind(&quote.research_notes)
        .bind(quote.condition_factor.to_string())
        .bind(quote.created_at.to_rfc3339())
        .bind(quote.expires_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(StoredQuote { id: QuoteId(id), quote: quote.clone() })
    }

    async fn find(&self, id: &QuoteId) -> Result<StoredQuote, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_QUOTE} WHERE id = ?"))
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        Self::quote_from_row(&row)
    }

    async fn latest_for_session(&self, session_id: &str) -> Result<StoredQuote, RepositoryError> {
        let row = sqlx::query(&format!(
            "{SELECT_QUOTE} WHERE session_id = ? ORDER BY created_at DESC, id DESC LIMIT 1"
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Self::quote_from_row(&row)
    }
}

/// In-memory double for handler tests and development without a database.
#[derive(Default)]
pub struct InMemoryQuoteRepository {
    rows: Mutex<Vec<StoredQuote>>,
}

impl InMemoryQuoteRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuoteStore for InMemoryQuoteRepository {
    async fn insert(&self, quote: &Quote) -> Result<StoredQuote, RepositoryError> {
        let stored =
            StoredQuote { id: QuoteId(format!("vq-{}", Uuid::new_v4())), quote: quote.clone() };
        let mut rows = self.rows.lock().map_err(|_| {
            RepositoryError::Decode("in-memory quote store lock poisoned".to_string())
        })?;
        rows.push(stored.clone());
        Ok(stored)
    }

    async fn find(&self, id: &QuoteId) -> Result<StoredQuote, RepositoryError> {
        let rows = self.rows.lock().map_err(|_| {
            RepositoryError::Decode("in-memory quote store lock poisoned".to_string())
        })?;
        rows.iter().find(|stored| &stored.id == id).cloned().ok_or(RepositoryError::NotFound)
    }

    async fn latest_for_session(&self, session_id: &str) -> Result<StoredQuote, RepositoryError> {
        let rows = self.rows.lock().map_err(|_| {
            RepositoryError::Decode("in-memory quote store lock poisoned".to_string())
        })?;
        rows.iter()
            .rev()
            .find(|stored| stored.quote.session_id == session_id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }
}
