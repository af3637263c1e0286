//! Document-signing collaborator: the provider seam the intake funnel calls
//! after a seller accepts a quote, plus verification for the provider's
//! completion webhook.

pub mod http;
pub mod noop;
pub mod webhook;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vaulted_core::domain::quote::QuoteId;

pub use http::HttpSigningService;
pub use noop::NoopSigningService;
pub use webhook::verify_signature;

/// Everything the provider needs to assemble a consignment agreement
/// envelope for embedded signing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EnvelopeRequest {
    pub session_id: String,
    pub quote_id: QuoteId,
    pub applicant_name: String,
    pub applicant_email: String,
    pub quote_amount: Decimal,
    pub buyback_amount: Decimal,
    pub terms_version: String,
    pub return_url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub envelope_id: String,
    pub signing_url: String,
}

#[derive(Debug, Error)]
pub enum SigningError {
    #[error("signing provider transport failed: {0}")]
    Transport(String),
    #[error("signing provider returned status {0}")]
    Status(u16),
    #[error("signing provider response could not be decoded: {0}")]
    Decode(String),
}

/// Port for the e-signature provider. Unlike market data, envelope creation
/// is user-blocking: failures surface to the caller instead of degrading.
#[async_trait]
pub trait SigningService: Send + Sync {
    async fn create_envelope(&self, request: &EnvelopeRequest) -> Result<Envelope, SigningError>;
}
