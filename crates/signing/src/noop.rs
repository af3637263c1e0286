use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::{Envelope, EnvelopeRequest, SigningError, SigningService};

/// Development double: mints an envelope locally and points the signing URL
/// at the configured return path, so the funnel can be walked end to end
/// without a provider account.
#[derive(Default)]
pub struct NoopSigningService;

impl NoopSigningService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SigningService for NoopSigningService {
    async fn create_envelope(&self, request: &EnvelopeRequest) -> Result<Envelope, SigningError> {
        let envelope_id = format!("env-{}", Uuid::new_v4());
        info!(
            event_name = "signing.envelope.noop",
            session_id = %request.session_id,
            quote_id = %request.quote_id.0,
            envelope_id = %envelope_id,
            "noop signing service minted a local envelope"
        );
        Ok(Envelope {
            signing_url: format!(
                "{}?envelope={envelope_id}",
                request.return_url.trim_end_matches('/')
            ),
            envelope_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use vaulted_core::domain::quote::QuoteId;

    use crate::{EnvelopeRequest, SigningService};

    use super::NoopSigningService;

    #[tokio::test]
    async fn noop_service_mints_unique_envelopes_pointing_at_the_return_url() {
        let request = EnvelopeRequest {
            session_id: "sess-noop".to_string(),
            quote_id: QuoteId("vq-noop".to_string()),
            applicant_name: "Dana Seller".to_string(),
            applicant_email: "dana@example.com".to_string(),
            quote_amount: Decimal::new(500, 0),
            buyback_amount: Decimal::new(550, 0),
            terms_version: "2026-01".to_string(),
            return_url: "http://localhost:8080/agreements/complete".to_string(),
        };

        let service = NoopSigningService::new();
        let first = service.create_envelope(&request).await.expect("envelope");
        let second = service.create_envelope(&request).await.expect("envelope");

        assert!(first.envelope_id.starts_with("env-"));
        assert_ne!(first.envelope_id, second.envelope_id);
        assert!(first.signing_url.starts_with("http://localhost:8080/agreements/complete"));
        assert!(first.signing_url.contains(&first.envelope_id));
    }
}
