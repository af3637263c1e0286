use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::quote::QuoteId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgreementId(pub String);

/// Lifecycle of an agreement envelope. Records start as `Sent` (the envelope
/// exists at the provider) and end `Signed` or `Declined` via the webhook.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgreementStatus {
    Sent,
    Signed,
    Declined,
}

/// Consignment agreement raised after a seller accepts a quote. The envelope
/// fields tie the record back to the external signing provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Agreement {
    pub id: AgreementId,
    pub session_id: String,
    pub quote_id: QuoteId,
    pub applicant_name: String,
    pub applicant_email: String,
    pub envelope_id: String,
    pub signing_url: String,
    pub status: AgreementStatus,
    pub terms_version: String,
    pub accepted_at: DateTime<Utc>,
    pub signed_at: Option<DateTime<Utc>>,
}

impl AgreementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Signed => "signed",
            Self::Declined => "declined",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "sent" => Some(Self::Sent),
            "signed" => Some(Self::Signed),
            "declined" => Some(Self::Declined),
            _ => None,
        }
    }
}
