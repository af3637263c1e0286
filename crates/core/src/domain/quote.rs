use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::asset::AssetDescriptor;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteId(pub String);

/// A completed valuation. Quotes are immutable once issued; a seller who
/// disagrees with the number submits a fresh request instead of amending one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub session_id: String,
    pub asset: AssetDescriptor,
    pub researched_market_value: Decimal,
    pub final_market_value: Decimal,
    pub quote_amount: Decimal,
    pub buyback_amount: Decimal,
    pub confidence_score: u8,
    pub valuation_sources: Vec<String>,
    pub research_notes: String,
    pub condition_factor: Decimal,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Quote {
    /// Advisory validity window. Expiry is never enforced server-side; it is
    /// surfaced so clients can prompt for a re-quote.
    pub const VALIDITY_HOURS: i64 = 48;

    pub fn expiry_from(created_at: DateTime<Utc>) -> DateTime<Utc> {
        created_at + Duration::hours(Self::VALIDITY_HOURS)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
